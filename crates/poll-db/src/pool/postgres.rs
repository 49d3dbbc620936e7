//! PostgreSQL connection pool management

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::DatabaseConfig;

/// Create a new PostgreSQL connection pool
pub async fn create_pg_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
}

/// Apply the embedded PostgreSQL migrations
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("migrations/postgres").run(pool).await
}
