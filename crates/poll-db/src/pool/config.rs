//! Pool configuration

use std::time::Duration;

use poll_common::DatabaseBackend;

/// Database configuration for connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Which backend `url` points at
    pub backend: DatabaseBackend,
    /// Connection URL (`sqlite://...` or `postgresql://...`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// Maximum idle time before a connection is closed
    pub idle_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            url: String::from("sqlite://pollbot.db"),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DatabaseConfig {
    /// A private in-memory SQLite database
    pub fn in_memory() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            ..Self::default()
        }
    }

    /// Whether the URL names an in-memory SQLite database
    pub fn is_in_memory(&self) -> bool {
        self.backend == DatabaseBackend::Sqlite
            && (self.url.contains(":memory:") || self.url.contains("mode=memory"))
    }
}

impl From<&poll_common::DatabaseConfig> for DatabaseConfig {
    fn from(config: &poll_common::DatabaseConfig) -> Self {
        Self {
            backend: config.backend,
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            ..Self::default()
        }
    }
}
