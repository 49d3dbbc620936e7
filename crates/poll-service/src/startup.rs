//! Bot startup
//!
//! Wires configuration, telemetry, the poll store and the messaging client
//! into a running event loop.

use std::sync::Arc;

use poll_common::{try_init_tracing_with_config, AppConfig, AppError, TracingConfig};
use poll_core::traits::RoomClient;
use poll_db::{connect, DatabaseConfig, DbPool};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::services::{
    BotSettings, EventDispatcher, EventLoop, InboundEvent, ServiceContextBuilder, ServiceError,
    ServiceResult,
};

/// Open the store and build the dispatcher serving `client`
///
/// # Errors
/// Fails when the client is logged in as another user than `bot.user_id`, or
/// when the store cannot be opened or migrated.
pub async fn create_dispatcher(
    config: &AppConfig,
    client: Arc<dyn RoomClient>,
) -> ServiceResult<(EventDispatcher, DbPool)> {
    if client.user_id() != config.bot.user_id {
        return Err(ServiceError::validation(format!(
            "client is logged in as {}, but the bot is configured as {}",
            client.user_id(),
            config.bot.user_id
        )));
    }

    info!(backend = ?config.database.backend, "Opening poll store...");
    let pool = connect(&DatabaseConfig::from(&config.database))
        .await
        .map_err(AppError::from)?;

    let ctx = ServiceContextBuilder::new()
        .poll_repo(pool.poll_repository())
        .client(client)
        .settings(BotSettings::from(&config.bot))
        .build()?;

    Ok((EventDispatcher::new(ctx), pool))
}

/// Run the bot until every sender of `events` is dropped
///
/// Returns how many events were handled. The store is closed on the way out.
pub async fn run(
    config: AppConfig,
    client: Arc<dyn RoomClient>,
    events: mpsc::Receiver<InboundEvent>,
) -> ServiceResult<u64> {
    // Embedders may have installed their own subscriber
    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        debug!(error = %e, "Keeping the existing tracing subscriber");
    }

    info!(name = %config.app.name, env = ?config.app.env, user_id = %config.bot.user_id, "Starting poll bot...");
    let (dispatcher, pool) = create_dispatcher(&config, client).await?;

    let processed = EventLoop::from_receiver(dispatcher, events).run().await;
    pool.close().await;

    info!(processed, "Poll bot stopped");
    Ok(processed)
}
