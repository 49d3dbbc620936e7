//! Repository traits (ports) - define the interface for poll storage
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{Answer, Poll, Response};
use crate::error::DomainError;
use crate::value_objects::PollId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Poll Repository
// ============================================================================

/// Storage for polls, their answers, and the responses cast on them.
///
/// Every method is a single autocommitted statement (or, for `delete`, a
/// fixed sequence of them); callers must not assume atomicity across calls.
#[async_trait]
pub trait PollRepository: Send + Sync {
    /// Find poll by room and start event id
    async fn find(&self, id: &PollId) -> RepoResult<Option<Poll>>;

    /// Create a new poll
    ///
    /// Fails with `DomainError::PollAlreadyExists` if the id is taken.
    async fn create(&self, poll: &Poll) -> RepoResult<()>;

    /// Attach the tally message id to a poll
    async fn set_reply_event_id(&self, id: &PollId, reply_event_id: &str) -> RepoResult<()>;

    /// Delete a poll together with its answers and responses
    async fn delete(&self, id: &PollId) -> RepoResult<()>;

    /// Add a batch of answers to a poll
    ///
    /// Fails with `DomainError::DuplicateAnswer` if an answer hash repeats.
    async fn add_answers(&self, answers: &[Answer]) -> RepoResult<()>;

    /// Get all answers of a poll, ordered by position
    async fn find_answers(&self, id: &PollId) -> RepoResult<Vec<Answer>>;

    /// Create or replace a user's response
    ///
    /// Fails with `DomainError::UnknownAnswer` when the backend enforces the
    /// answer reference and the hash is not one of the poll's answers.
    async fn upsert_response(&self, response: &Response) -> RepoResult<()>;

    /// Get all responses of a poll, ordered by user
    async fn find_responses(&self, id: &PollId) -> RepoResult<Vec<Response>>;
}
