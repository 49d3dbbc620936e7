//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::traits::ClientError;
use crate::value_objects::PollId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Poll not found: {0}")]
    PollNotFound(PollId),

    #[error("Unknown answer {answer_hash} for poll {poll_id}")]
    UnknownAnswer { poll_id: PollId, answer_hash: String },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Poll already exists: {0}")]
    PollAlreadyExists(PollId),

    #[error("Duplicate answer {answer_hash} for poll {poll_id}")]
    DuplicateAnswer { poll_id: PollId, answer_hash: String },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for log lines
    pub fn code(&self) -> &'static str {
        match self {
            Self::PollNotFound(_) => "UNKNOWN_POLL",
            Self::UnknownAnswer { .. } => "UNKNOWN_ANSWER",
            Self::PollAlreadyExists(_) => "POLL_ALREADY_EXISTS",
            Self::DuplicateAnswer { .. } => "DUPLICATE_ANSWER",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::Client(_) => "CLIENT_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PollNotFound(_) | Self::UnknownAnswer { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::PollAlreadyExists(_) | Self::DuplicateAnswer { .. })
    }
}
