//! Domain entities - polls, their answers, and the votes cast on them

mod answer;
mod poll;
mod response;

pub use answer::Answer;
pub use poll::{Poll, PollKind};
pub use response::Response;
