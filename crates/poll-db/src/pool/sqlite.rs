//! SQLite connection pool management

use std::str::FromStr;

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::DatabaseConfig;

/// Create a new SQLite connection pool
///
/// The database file is created if missing. An in-memory database is held
/// on a single connection that never expires, since each new connection to
/// `:memory:` would open an empty database.
pub async fn create_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);

    let pool_options = if config.is_in_memory() {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
    };

    pool_options.connect_with(options).await
}

/// Apply the embedded SQLite migrations
pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("migrations/sqlite").run(pool).await
}
