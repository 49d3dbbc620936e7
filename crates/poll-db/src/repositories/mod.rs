//! Repository implementations
//!
//! SQLite and PostgreSQL implementations of `PollRepository` from poll-core.
//! Both speak the same schema; only placeholders and pool types differ.

mod error;
mod postgres;
mod sqlite;

pub use postgres::PgPollRepository;
pub use sqlite::SqlitePollRepository;
