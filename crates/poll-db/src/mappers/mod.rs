//! Entity to model mappers
//!
//! This module provides conversions between domain entities (poll-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod answer;
mod poll;
mod response;

pub use answer::AnswerInsert;
pub use poll::PollInsert;
pub use response::ResponseInsert;
