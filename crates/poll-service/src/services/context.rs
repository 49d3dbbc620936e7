//! Service context - dependency container for services
//!
//! Holds the poll store, the messaging client, and the bot settings.

use std::sync::Arc;
use std::time::Duration;

use poll_common::BotConfig;
use poll_core::traits::{PollRepository, RoomClient};

use super::error::{ServiceError, ServiceResult};

/// Runtime knobs of the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    /// Drop live events older than `stale_event_threshold`
    pub filter_stale_events: bool,
    pub stale_event_threshold: Duration,
    /// How many times to try joining a room we were invited to
    pub join_attempts: u32,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            filter_stale_events: true,
            stale_event_threshold: Duration::from_secs(300),
            join_attempts: 3,
        }
    }
}

impl From<&BotConfig> for BotSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            filter_stale_events: config.filter_stale_events,
            stale_event_threshold: config.stale_event_threshold(),
            join_attempts: config.join_attempts.max(1),
        }
    }
}

/// Service context containing all dependencies
///
/// Cheap to clone; every service borrows it.
#[derive(Clone)]
pub struct ServiceContext {
    poll_repo: Arc<dyn PollRepository>,
    client: Arc<dyn RoomClient>,
    settings: BotSettings,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        poll_repo: Arc<dyn PollRepository>,
        client: Arc<dyn RoomClient>,
        settings: BotSettings,
    ) -> Self {
        Self {
            poll_repo,
            client,
            settings,
        }
    }

    /// Get the poll repository
    pub fn poll_repo(&self) -> &dyn PollRepository {
        self.poll_repo.as_ref()
    }

    /// Get the messaging client
    pub fn client(&self) -> &dyn RoomClient {
        self.client.as_ref()
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// The bot's own user id
    pub fn user_id(&self) -> &str {
        self.client.user_id()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("user_id", &self.client.user_id())
            .field("poll_repo", &"...")
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    poll_repo: Option<Arc<dyn PollRepository>>,
    client: Option<Arc<dyn RoomClient>>,
    settings: Option<BotSettings>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_repo(mut self, repo: Arc<dyn PollRepository>) -> Self {
        self.poll_repo = Some(repo);
        self
    }

    pub fn client(mut self, client: Arc<dyn RoomClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn settings(mut self, settings: BotSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the ServiceContext
    ///
    /// Settings fall back to `BotSettings::default()`.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the repository or client is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.poll_repo
                .ok_or_else(|| ServiceError::validation("poll_repo is required"))?,
            self.client
                .ok_or_else(|| ServiceError::validation("client is required"))?,
            self.settings.unwrap_or_default(),
        ))
    }
}
