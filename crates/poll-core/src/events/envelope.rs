//! Raw event envelopes as handed over by the messaging client

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decrypted (or never encrypted) room event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub event_id: String,
    pub room_id: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub event_type: String,
    /// Milliseconds since the Unix epoch, as stamped by the origin server
    #[serde(default)]
    pub origin_server_ts: i64,
    #[serde(default)]
    pub content: Value,
}

impl RawEvent {
    /// Id of the event this one relates to (`m.relates_to.event_id`), if non-empty
    pub fn relates_to_event_id(&self) -> Option<&str> {
        non_empty(self.content.pointer("/m.relates_to/event_id"))
    }

    /// Id of the event this message replies to (`m.relates_to.m.in_reply_to.event_id`)
    pub fn in_reply_to_event_id(&self) -> Option<&str> {
        self.content
            .get("m.relates_to")
            .and_then(|r| r.get("m.in_reply_to"))
            .and_then(|r| non_empty(r.get("event_id")))
    }

    /// HTML body of a text message, empty when absent
    pub fn formatted_body(&self) -> &str {
        self.content
            .get("formatted_body")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Server timestamp as a `DateTime`
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.origin_server_ts).single()
    }
}

/// An encrypted event the client could not (yet) decrypt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEvent {
    pub event_id: String,
    pub room_id: String,
    pub sender: String,
    pub session_id: String,
    #[serde(default)]
    pub origin_server_ts: i64,
}

/// An event as found in a room timeline
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    Plain(RawEvent),
    Encrypted(EncryptedEvent),
}

impl TimelineEvent {
    pub fn event_id(&self) -> &str {
        match self {
            Self::Plain(ev) => &ev.event_id,
            Self::Encrypted(ev) => &ev.event_id,
        }
    }
}

impl From<RawEvent> for TimelineEvent {
    fn from(ev: RawEvent) -> Self {
        Self::Plain(ev)
    }
}

impl From<EncryptedEvent> for TimelineEvent {
    fn from(ev: EncryptedEvent) -> Self {
        Self::Encrypted(ev)
    }
}

/// One batch of a backward history walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryPage {
    /// Events, newest first
    pub chunk: Vec<TimelineEvent>,
    /// Token this page was fetched from
    pub start: String,
    /// Token to continue from; `None` when the start of the room was reached
    pub end: Option<String>,
}

impl HistoryPage {
    /// Token to fetch the next (older) page from, or `None` when exhausted
    pub fn next_token(&self) -> Option<&str> {
        match self.end.as_deref() {
            Some(end) if end != self.start => Some(end),
            _ => None,
        }
    }
}

pub(crate) fn non_empty(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
