//! Inbound event dispatcher
//!
//! Entry points for everything the messaging client delivers. Errors are
//! logged here and never propagate further.

use poll_core::events::RawEvent;
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::event_loop::InboundEvent;
use super::poll::{HandleOutcome, IgnoreReason, PollService};
use super::recovery::{RecoveryOutcome, RecoveryService};
use super::staleness::StalenessFilter;

/// Reaction put on events the bot could not decrypt
pub const DECRYPTION_FAILURE_REACTION: &str = "❌ 🔐";

/// Routes inbound events to the poll and recovery services
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    ctx: ServiceContext,
    staleness: StalenessFilter,
}

impl EventDispatcher {
    pub fn new(ctx: ServiceContext) -> Self {
        let staleness = StalenessFilter::from_settings(ctx.settings());
        Self { ctx, staleness }
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Route one inbound event to its handler
    pub async fn dispatch(&self, event: InboundEvent) {
        match event {
            InboundEvent::Message(event) => {
                self.on_message(&event).await;
            }
            InboundEvent::Custom(event) => {
                self.on_custom_event(&event, true).await;
            }
            InboundEvent::Invite { room_id, state_key } => {
                self.on_invite(&room_id, &state_key).await;
            }
            InboundEvent::DecryptionFailure { room_id, event_id } => {
                self.on_decryption_failure(&room_id, &event_id).await;
            }
        }
    }

    /// Handle a text message; a reply that opens by mentioning the bot is a
    /// stats request and triggers recovery of the referenced poll
    ///
    /// Returns `None` when the message was not a stats request or handling failed.
    #[instrument(skip(self, event), fields(room_id = %event.room_id, event_id = %event.event_id))]
    pub async fn on_message(&self, event: &RawEvent) -> Option<RecoveryOutcome> {
        if event.sender == self.ctx.user_id() {
            return None;
        }
        if self.staleness.is_stale(event) {
            debug!("Ignoring stale message");
            return None;
        }

        let poll_event_id = self.stats_request_target(event)?;

        match RecoveryService::new(&self.ctx).recover(event, poll_event_id).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!(error = %e, code = e.error_code(), "Recovery failed");
                None
            }
        }
    }

    /// Event id a stats request points at, if `event` is one
    pub fn stats_request_target<'e>(&self, event: &'e RawEvent) -> Option<&'e str> {
        let mention = self.ctx.client().mention_prefix();
        if !event.formatted_body().starts_with(&mention) {
            return None;
        }
        event.in_reply_to_event_id()
    }

    /// Handle a custom (non-message) event, normally a poll event
    ///
    /// `ignore_stale` drops events older than the staleness threshold when
    /// the filter is enabled.
    #[instrument(skip(self, event), fields(room_id = %event.room_id, event_id = %event.event_id))]
    pub async fn on_custom_event(&self, event: &RawEvent, ignore_stale: bool) -> Option<HandleOutcome> {
        if ignore_stale && self.staleness.is_stale(event) {
            debug!("Ignoring stale event");
            return Some(HandleOutcome::Ignored(IgnoreReason::Stale));
        }

        match PollService::new(&self.ctx).handle_custom_event(event).await {
            Ok(outcome) => {
                if outcome.is_ignored() {
                    debug!(?outcome, event_type = %event.event_type, "Event left the store untouched");
                }
                Some(outcome)
            }
            Err(e) => {
                error!(
                    event_type = %event.event_type,
                    error = %e,
                    code = e.error_code(),
                    transient = e.is_transient(),
                    "Failed to handle event"
                );
                None
            }
        }
    }

    /// Handle a room membership invite; only our own invite is acted on
    ///
    /// Returns whether the room was joined.
    #[instrument(skip(self))]
    pub async fn on_invite(&self, room_id: &str, state_key: &str) -> bool {
        if state_key != self.ctx.user_id() {
            return false;
        }

        let attempts = self.ctx.settings().join_attempts.max(1);
        for attempt in 1..=attempts {
            match self.ctx.client().join(room_id).await {
                Ok(()) => {
                    info!(attempt, "Joined room");
                    return true;
                }
                Err(e) => error!(attempt, error = %e, "Error joining room"),
            }
        }

        error!(attempts, "Unable to join room");
        false
    }

    /// Report an event that could not be decrypted and mark it in the room
    #[instrument(skip(self))]
    pub async fn on_decryption_failure(&self, room_id: &str, event_id: &str) {
        error!(
            "Failed to decrypt event! Tip: try using a different device ID and restart. \
             If all else fails, delete the client store directory and let the bot recreate it \
             (tracked polls are kept, but the bot may answer old requests a second time)."
        );

        if let Err(e) = self
            .ctx
            .client()
            .react(room_id, event_id, DECRYPTION_FAILURE_REACTION)
            .await
        {
            warn!(error = %e, "Failed to react to undecryptable event");
        }
    }
}
