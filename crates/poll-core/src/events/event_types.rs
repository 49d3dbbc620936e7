//! Poll event types
//!
//! Every poll event type exists under the legacy MSC3381 namespace and the
//! stable `m.poll` namespace. Both map to the same variant here and nowhere
//! else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Poll lifecycle event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollEventType {
    /// A poll was created
    Start,
    /// A user voted
    Response,
    /// The poll was closed
    End,
}

impl PollEventType {
    /// Stable type string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "m.poll.start",
            Self::Response => "m.poll.response",
            Self::End => "m.poll.end",
        }
    }

    /// Legacy (MSC3381) type string
    #[must_use]
    pub const fn legacy_str(self) -> &'static str {
        match self {
            Self::Start => "org.matrix.msc3381.poll.start",
            Self::Response => "org.matrix.msc3381.poll.response",
            Self::End => "org.matrix.msc3381.poll.end",
        }
    }

    /// Parse an event type string from either namespace
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "m.poll.start" | "org.matrix.msc3381.poll.start" => Some(Self::Start),
            "m.poll.response" | "org.matrix.msc3381.poll.response" => Some(Self::Response),
            "m.poll.end" | "org.matrix.msc3381.poll.end" => Some(Self::End),
            _ => None,
        }
    }
}

impl fmt::Display for PollEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
