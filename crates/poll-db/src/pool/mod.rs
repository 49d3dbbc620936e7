//! Database connection pool management

mod config;
mod postgres;
mod sqlite;

use std::sync::Arc;

use poll_common::{AppError, DatabaseBackend};
use poll_core::traits::PollRepository;
use tracing::info;

use crate::repositories::{PgPollRepository, SqlitePollRepository};

pub use config::DatabaseConfig;
pub use postgres::{create_pg_pool, run_pg_migrations};
pub use sqlite::{create_sqlite_pool, run_sqlite_migrations};

// Re-export pool types for convenience
pub use sqlx::postgres::PgPool;
pub use sqlx::sqlite::SqlitePool;

/// A connection pool for whichever backend is configured
#[derive(Debug, Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl DbPool {
    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Self::Sqlite(_) => DatabaseBackend::Sqlite,
            Self::Postgres(_) => DatabaseBackend::Postgres,
        }
    }

    /// Apply pending migrations for this backend
    pub async fn run_migrations(&self) -> Result<(), PoolError> {
        match self {
            Self::Sqlite(pool) => run_sqlite_migrations(pool).await?,
            Self::Postgres(pool) => run_pg_migrations(pool).await?,
        }
        Ok(())
    }

    /// Build the poll repository backed by this pool
    pub fn poll_repository(&self) -> Arc<dyn PollRepository> {
        match self {
            Self::Sqlite(pool) => Arc::new(SqlitePollRepository::new(pool.clone())),
            Self::Postgres(pool) => Arc::new(PgPollRepository::new(pool.clone())),
        }
    }

    pub async fn close(&self) {
        match self {
            Self::Sqlite(pool) => pool.close().await,
            Self::Postgres(pool) => pool.close().await,
        }
    }
}

/// Create a new connection pool for the configured backend
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    match config.backend {
        DatabaseBackend::Sqlite => create_sqlite_pool(config).await.map(DbPool::Sqlite),
        DatabaseBackend::Postgres => create_pg_pool(config).await.map(DbPool::Postgres),
    }
}

/// Connect and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> Result<DbPool, PoolError> {
    let pool = create_pool(config).await?;
    pool.run_migrations().await?;
    info!(backend = ?pool.backend(), "Database ready");
    Ok(pool)
}

/// Pool setup errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Connect(e) => AppError::database(e),
            PoolError::Migrate(e) => AppError::Migration(e.to_string()),
        }
    }
}
