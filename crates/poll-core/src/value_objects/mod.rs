//! Value objects - immutable types that represent domain concepts

mod poll_id;

pub use poll_id::PollId;
