//! Messaging client port
//!
//! Transport, sessions, and encryption live in the client library; the bot
//! only sees these operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::events::{EncryptedEvent, HistoryPage, RawEvent, TimelineEvent};
use crate::render::mention_prefix;

/// Messaging client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Room key request failed: {0}")]
    KeyRequest(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Join failed: {0}")]
    Join(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Outbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Markdown body; the client renders the HTML form
    pub body: String,
    /// Send as a notice (does not ping room members)
    pub notice: bool,
    /// Event this message replies to
    pub reply_to: Option<String>,
}

impl OutgoingMessage {
    /// A notice message, the default for bot output
    pub fn notice(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            notice: true,
            reply_to: None,
        }
    }

    /// Make this message a reply to `event_id`
    pub fn in_reply_to(mut self, event_id: impl Into<String>) -> Self {
        self.reply_to = Some(event_id.into());
        self
    }
}

#[async_trait]
pub trait RoomClient: Send + Sync {
    /// Fully qualified user id of the bot
    fn user_id(&self) -> &str;

    /// Position of the most recently loaded sync, used as the starting
    /// point of a backward history walk
    fn sync_token(&self) -> Option<String>;

    /// Prefix a formatted body starts with when it opens by mentioning the bot
    fn mention_prefix(&self) -> String {
        mention_prefix(self.user_id())
    }

    /// Send a message, returning the new event id
    async fn send(&self, room_id: &str, message: OutgoingMessage) -> ClientResult<String>;

    /// Replace the content of a message previously sent by the bot
    async fn edit(&self, room_id: &str, event_id: &str, message: OutgoingMessage) -> ClientResult<()>;

    /// Fetch a single event by id
    async fn fetch_event(&self, room_id: &str, event_id: &str) -> ClientResult<TimelineEvent>;

    /// Fetch one page of history, going backward from `from`
    async fn fetch_history(&self, room_id: &str, from: &str) -> ClientResult<HistoryPage>;

    /// Ask other devices for the key of an encrypted event
    async fn request_room_key(&self, event: &EncryptedEvent) -> ClientResult<()>;

    /// Decrypt an event with the keys currently known
    async fn decrypt(&self, event: &EncryptedEvent) -> ClientResult<RawEvent>;

    /// Join a room
    async fn join(&self, room_id: &str) -> ClientResult<()>;

    /// React to an event with `key`
    async fn react(&self, room_id: &str, event_id: &str, key: &str) -> ClientResult<()>;
}
