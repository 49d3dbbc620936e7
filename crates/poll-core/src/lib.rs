//! # poll-core
//!
//! Domain layer containing poll entities, event classification, tally
//! rendering, and the storage and messaging ports.
//! This crate has zero dependencies on infrastructure (database, client library, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod render;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Answer, Poll, PollKind, Response};
pub use error::DomainError;
pub use events::{
    classify, is_poll_family_member, AnswerOption, EncryptedEvent, HistoryPage, PollEnd, PollEvent,
    PollEventType, PollResponse, PollStart, RawEvent, TimelineEvent,
};
pub use render::{make_pill, mention_prefix, render_tally};
pub use traits::{
    ClientError, ClientResult, OutgoingMessage, PollRepository, RepoResult, RoomClient,
};
pub use value_objects::PollId;
