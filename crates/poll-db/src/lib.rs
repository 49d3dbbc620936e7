//! # poll-db
//!
//! Poll store implementing `PollRepository` with SQLite or PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides both backend implementations of the repository trait
//! defined in `poll-core`. It handles:
//!
//! - Connection pool management and embedded schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use poll_common::AppConfig;
//! use poll_db::pool::{connect, DatabaseConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = AppConfig::from_env()?;
//!     let pool = connect(&DatabaseConfig::from(&app.database)).await?;
//!     let polls = pool.poll_repository();
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{connect, create_pool, DatabaseConfig, DbPool, PoolError};
pub use repositories::{PgPollRepository, SqlitePollRepository};
