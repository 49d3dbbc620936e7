//! Answer entity - one selectable option of a poll

use crate::value_objects::PollId;

/// Answer entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub poll_id: PollId,
    /// Caller-supplied id, unique within the poll
    pub answer_hash: String,
    pub text: String,
    /// 0-based position in the order the poll declared its answers
    pub position: i32,
}

impl Answer {
    /// Create a new Answer
    pub fn new(poll_id: PollId, answer_hash: String, text: String, position: i32) -> Self {
        Self {
            poll_id,
            answer_hash,
            text,
            position,
        }
    }
}
