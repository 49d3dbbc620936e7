//! Poll events - raw envelopes, type tags, and the classifier

mod classify;
mod envelope;
mod event_types;

pub use classify::{
    classify, is_poll_family_member, AnswerOption, PollEnd, PollEvent, PollResponse, PollStart,
};
pub use envelope::{EncryptedEvent, HistoryPage, RawEvent, TimelineEvent};
pub use event_types::PollEventType;
