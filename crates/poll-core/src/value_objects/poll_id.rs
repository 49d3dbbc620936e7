//! PollId - composite identity of a poll (room + root event)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a poll: the room it lives in and the id of its start event.
///
/// Answers and responses reference their poll through this key rather than
/// through an owning pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PollId {
    pub room_id: String,
    pub event_id: String,
}

impl PollId {
    /// Create a new PollId
    pub fn new(room_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            event_id: event_id.into(),
        }
    }

    #[inline]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[inline]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.room_id, self.event_id)
    }
}
