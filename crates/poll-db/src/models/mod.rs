//! Database models - SQLx-compatible structs for the poll tables

mod answer;
mod poll;
mod response;

pub use answer::AnswerModel;
pub use poll::PollModel;
pub use response::ResponseModel;
