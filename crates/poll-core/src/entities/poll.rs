//! Poll entity - a tracked poll and the tally message the bot keeps for it

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::PollId;

/// Poll kind, controlling whether the tally shows who picked what
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollKind {
    /// Each voter is listed under the answer they picked
    Disclosed,
    /// Only participation is shown
    Undisclosed,
}

impl PollKind {
    pub const DISCLOSED: &'static str = "m.poll.disclosed";
    pub const UNDISCLOSED: &'static str = "m.poll.undisclosed";
    pub const LEGACY_DISCLOSED: &'static str = "org.matrix.msc3381.poll.disclosed";

    /// Parse the kind string carried by a poll start event.
    ///
    /// Returns `None` for an empty string. Anything that is not a known
    /// disclosed kind is treated as undisclosed.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "" => None,
            Self::DISCLOSED | Self::LEGACY_DISCLOSED => Some(Self::Disclosed),
            _ => Some(Self::Undisclosed),
        }
    }

    /// Canonical string stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disclosed => Self::DISCLOSED,
            Self::Undisclosed => Self::UNDISCLOSED,
        }
    }

    #[inline]
    pub fn is_disclosed(self) -> bool {
        matches!(self, Self::Disclosed)
    }
}

impl fmt::Display for PollKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Poll entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: PollId,
    pub topic: String,
    pub kind: PollKind,
    /// Event id of the tally message, set once after the first send
    pub reply_event_id: Option<String>,
}

impl Poll {
    /// Create a new Poll with no tally message yet
    pub fn new(id: PollId, topic: String, kind: PollKind) -> Self {
        Self {
            id,
            topic,
            kind,
            reply_event_id: None,
        }
    }

    /// Check if the tally message has been sent and recorded
    #[inline]
    pub fn has_tally_message(&self) -> bool {
        self.reply_event_id.is_some()
    }
}
