//! Startup tests
//!
//! The bot is started from a config file, the way a deployment starts it,
//! and fed through its inbound queue.
//!
//! Run with: cargo test -p integration-tests --test startup_tests

use std::sync::Arc;

use integration_tests::*;
use poll_common::AppConfig;
use poll_core::make_pill;
use poll_service::{InboundEvent, ServiceError, EVENT_BUFFER_SIZE};
use tokio::sync::mpsc;

/// Write a config file for `url` and `user_id`, then load it
fn load_config(url: &str, user_id: &str) -> AppConfig {
    let path = std::env::temp_dir().join(format!(
        "pollbot-startup-{}-{}.toml",
        std::process::id(),
        unique_suffix()
    ));
    std::fs::write(
        &path,
        format!(
            "[app]\nenv = \"development\"\n\n[database]\nurl = \"{url}\"\n\n[bot]\nuser_id = \"{user_id}\"\njoin_attempts = 2\n"
        ),
    )
    .unwrap();

    let config = AppConfig::from_file(&path);
    std::fs::remove_file(&path).ok();
    config.unwrap()
}

// ============================================================================
// Running
// ============================================================================

#[tokio::test]
async fn test_bot_runs_from_config_file() {
    init_test_tracing();
    let config = load_config("sqlite::memory:", BOT_USER_ID);
    let client = Arc::new(MockRoomClient::new(BOT_USER_ID));
    let room = unique_room();

    let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    let handle = tokio::spawn(poll_service::run(config, client.clone(), rx));

    // The first join fails and is retried
    client.fail_joins(1);
    tx.send(InboundEvent::Invite {
        room_id: room.clone(),
        state_key: BOT_USER_ID.to_string(),
    })
    .await
    .unwrap();

    let start = lunch_poll().build(&room, "@alice:x");
    let vote = poll_response(Namespace::Legacy, &room, "@bob:x", &start.event_id, "a2");
    for event in [start, vote] {
        client.push(&event);
        tx.send(InboundEvent::Custom(event)).await.unwrap();
    }
    drop(tx);

    assert_eq!(handle.await.unwrap().unwrap(), 3);
    assert_eq!(client.joined(), [room.clone()]);

    let sent = client.sent(&room);
    assert_eq!(sent.len(), 1);
    assert_eq!(
        client.latest_edit(&sent[0].event_id).unwrap(),
        format!(
            "Poll results for `Lunch?`:\n\nSalad:\n{}\n\nPizza:\n\n",
            make_pill("@bob:x")
        )
    );
}

#[tokio::test]
async fn test_bot_stops_when_queue_closes() {
    let config = load_config("sqlite::memory:", BOT_USER_ID);
    let client = Arc::new(MockRoomClient::new(BOT_USER_ID));

    let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    drop(tx);

    assert_eq!(poll_service::run(config, client, rx).await.unwrap(), 0);
}

// ============================================================================
// Startup failures
// ============================================================================

#[tokio::test]
async fn test_client_for_another_user_is_rejected() {
    let config = load_config("sqlite::memory:", BOT_USER_ID);
    let client = Arc::new(MockRoomClient::new("@someone-else:example.org"));

    let (_tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    let err = poll_service::run(config, client, rx).await.unwrap_err();

    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_unreachable_store_is_reported() {
    let config = load_config("sqlite:///nonexistent-pollbot-dir/polls.db", BOT_USER_ID);
    let client = Arc::new(MockRoomClient::new(BOT_USER_ID));

    let (_tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
    let err = poll_service::run(config, client, rx).await.unwrap_err();

    assert!(matches!(err, ServiceError::App(_)));
    assert_eq!(err.error_code(), "DATABASE_ERROR");
}
