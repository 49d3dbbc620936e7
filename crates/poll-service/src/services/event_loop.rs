//! Sequential event loop
//!
//! Inbound events are queued on an mpsc channel and handled one at a time,
//! each to completion before the next is received.

use tokio::sync::mpsc;
use tracing::{debug, info};

use poll_core::events::RawEvent;

use super::dispatcher::EventDispatcher;

/// Default queue depth for inbound events
pub const EVENT_BUFFER_SIZE: usize = 256;

/// An event delivered by the messaging client
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// Text message in a joined room
    Message(RawEvent),
    /// Any other timeline event, normally a poll event
    Custom(RawEvent),
    /// Membership invite
    Invite { room_id: String, state_key: String },
    /// Event the client was unable to decrypt
    DecryptionFailure { room_id: String, event_id: String },
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Custom(_) => "custom",
            Self::Invite { .. } => "invite",
            Self::DecryptionFailure { .. } => "decryption_failure",
        }
    }
}

/// Drains the inbound queue into the dispatcher
pub struct EventLoop {
    dispatcher: EventDispatcher,
    rx: mpsc::Receiver<InboundEvent>,
}

impl EventLoop {
    /// Create a loop and the sender that feeds it
    pub fn new(dispatcher: EventDispatcher, capacity: usize) -> (Self, mpsc::Sender<InboundEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::from_receiver(dispatcher, rx), tx)
    }

    /// Drain a queue created elsewhere
    pub fn from_receiver(dispatcher: EventDispatcher, rx: mpsc::Receiver<InboundEvent>) -> Self {
        Self { dispatcher, rx }
    }

    /// Run until every sender is dropped, returning how many events were handled
    pub async fn run(mut self) -> u64 {
        info!("Event loop started");
        let mut processed = 0u64;

        while let Some(event) = self.rx.recv().await {
            debug!(kind = event.kind(), "Dispatching event");
            self.dispatcher.dispatch(event).await;
            processed += 1;
        }

        info!(processed, "Event loop stopped");
        processed
    }
}
