//! Application configuration structs
//!
//! Loads configuration from environment variables, a `.env` file, or a
//! config file layered under `POLLBOT__*` overrides.

use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub bot: BotConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: default_env(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Which store implementation backs the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Postgres,
}

impl FromStr for DatabaseBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::InvalidValue("DATABASE_TYPE", other.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default, rename = "type")]
    pub backend: DatabaseBackend,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Bot behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// The bot's own user id, used for mention detection and invite filtering
    pub user_id: String,
    #[serde(default = "default_filter_stale_events")]
    pub filter_stale_events: bool,
    #[serde(default = "default_stale_event_secs")]
    pub stale_event_secs: u64,
    #[serde(default = "default_join_attempts")]
    pub join_attempts: u32,
}

impl BotConfig {
    #[must_use]
    pub fn stale_event_threshold(&self) -> Duration {
        Duration::from_secs(self.stale_event_secs)
    }
}

// Default value functions
fn default_app_name() -> String {
    "pollbot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_filter_stale_events() -> bool {
    true
}

fn default_stale_event_secs() -> u64 {
    300 // 5 minutes
}

fn default_join_attempts() -> u32 {
    3
}

/// Read and parse an optional variable, failing only when it is set but malformed.
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                backend: parse_var("DATABASE_TYPE")?.unwrap_or_default(),
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            bot: BotConfig {
                user_id: env::var("BOT_USER_ID").map_err(|_| ConfigError::MissingVar("BOT_USER_ID"))?,
                filter_stale_events: parse_var("BOT_FILTER_STALE_EVENTS")?
                    .unwrap_or_else(default_filter_stale_events),
                stale_event_secs: parse_var("BOT_STALE_EVENT_SECS")?
                    .unwrap_or_else(default_stale_event_secs),
                join_attempts: parse_var("BOT_JOIN_ATTEMPTS")?.unwrap_or_else(default_join_attempts),
            },
        })
    }

    /// Load configuration from a file (toml, yaml, json...) with
    /// `POLLBOT__SECTION__KEY` environment overrides on top.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not describe a full config
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("POLLBOT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::Load(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}
