//! Response entity - a single user's current vote on a poll

use crate::value_objects::PollId;

/// Response entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub poll_id: PollId,
    pub user: String,
    pub answer_hash: String,
}

impl Response {
    /// Create a new Response
    pub fn new(poll_id: PollId, user: String, answer_hash: String) -> Self {
        Self {
            poll_id,
            user,
            answer_hash,
        }
    }

    /// Check if this vote is for the given answer
    #[inline]
    pub fn is_for(&self, answer_hash: &str) -> bool {
        self.answer_hash == answer_hash
    }
}
