//! Test helpers for integration tests
//!
//! Provides an in-memory room client that keeps a real timeline and pages
//! through it, plus a harness wiring it to the dispatcher and a fresh store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Once};

use anyhow::Result;
use async_trait::async_trait;
use poll_common::{try_init_tracing_with_config, DatabaseBackend, TracingConfig};
use poll_core::events::{EncryptedEvent, HistoryPage, RawEvent, TimelineEvent};
use poll_core::traits::{ClientError, ClientResult, OutgoingMessage, RoomClient};
use poll_db::{connect, DatabaseConfig, DbPool};
use poll_service::{
    BotSettings, EventDispatcher, EventLoop, InboundEvent, ServiceContext, EVENT_BUFFER_SIZE,
};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Bot user id used by every harness
pub const BOT_USER_ID: &str = "@pollbot:example.org";

/// Default number of events per history page
pub const DEFAULT_PAGE_SIZE: usize = 3;

static TRACING: Once = Once::new();

/// Install a test subscriber once per process
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        // Another test binary may have installed one already
        let _ = try_init_tracing_with_config(TracingConfig::development());
    });
}

#[derive(Debug, Default)]
struct RoomState {
    /// Chronological timeline per room
    timelines: HashMap<String, Vec<TimelineEvent>>,
    /// Plaintext of encrypted events, keyed by event id
    sealed: HashMap<String, RawEvent>,
    /// Megolm sessions we hold keys for
    keys: HashSet<String>,
    /// Sessions whose keys can be fetched on request
    shared: HashSet<String>,
    edits: Vec<(String, String, OutgoingMessage)>,
    reactions: Vec<(String, String, String)>,
    joined: Vec<String>,
    history_requests: usize,
    join_failures: u32,
    next_id: u64,
}

/// In-memory room client with paginated history
#[derive(Debug)]
pub struct MockRoomClient {
    user_id: String,
    page_size: usize,
    state: Mutex<RoomState>,
}

impl MockRoomClient {
    pub fn new(user_id: &str) -> Self {
        Self::with_page_size(user_id, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(user_id: &str, page_size: usize) -> Self {
        Self {
            user_id: user_id.to_string(),
            page_size: page_size.max(1),
            state: Mutex::new(RoomState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Append a plain event to its room's timeline
    pub fn push(&self, event: &RawEvent) {
        self.state()
            .timelines
            .entry(event.room_id.clone())
            .or_default()
            .push(TimelineEvent::Plain(event.clone()));
    }

    /// Append an encrypted copy of `event` to its room's timeline
    ///
    /// The key for `session_id` is not held yet; `share_key` makes it
    /// obtainable through a key request.
    pub fn push_encrypted(&self, event: &RawEvent, session_id: &str) -> EncryptedEvent {
        let encrypted = EncryptedEvent {
            event_id: event.event_id.clone(),
            room_id: event.room_id.clone(),
            sender: event.sender.clone(),
            session_id: session_id.to_string(),
            origin_server_ts: event.origin_server_ts,
        };
        let mut state = self.state();
        state.sealed.insert(event.event_id.clone(), event.clone());
        state
            .timelines
            .entry(event.room_id.clone())
            .or_default()
            .push(TimelineEvent::Encrypted(encrypted.clone()));
        encrypted
    }

    pub fn share_key(&self, session_id: &str) {
        self.state().shared.insert(session_id.to_string());
    }

    pub fn fail_joins(&self, times: u32) {
        self.state().join_failures = times;
    }

    /// Messages the bot sent to `room_id`, oldest first
    pub fn sent(&self, room_id: &str) -> Vec<RawEvent> {
        self.state()
            .timelines
            .get(room_id)
            .into_iter()
            .flatten()
            .filter_map(|event| match event {
                TimelineEvent::Plain(ev) if ev.sender == self.user_id => Some(ev.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<(String, String, OutgoingMessage)> {
        self.state().edits.clone()
    }

    /// Body of the latest edit to `event_id`
    pub fn latest_edit(&self, event_id: &str) -> Option<String> {
        self.state()
            .edits
            .iter()
            .rev()
            .find(|(_, id, _)| id == event_id)
            .map(|(_, _, message)| message.body.clone())
    }

    pub fn reactions(&self) -> Vec<(String, String, String)> {
        self.state().reactions.clone()
    }

    pub fn joined(&self) -> Vec<String> {
        self.state().joined.clone()
    }

    pub fn history_requests(&self) -> usize {
        self.state().history_requests
    }
}

fn token(index: usize) -> String {
    format!("p{index}")
}

/// Points past the newest event of whichever room is paged
const LATEST_TOKEN: &str = "latest";

fn parse_token(token: &str, newest: usize) -> Option<usize> {
    if token == LATEST_TOKEN {
        return Some(newest);
    }
    token.strip_prefix('p')?.parse().ok()
}

#[async_trait]
impl RoomClient for MockRoomClient {
    fn user_id(&self) -> &str {
        &self.user_id
    }

    fn sync_token(&self) -> Option<String> {
        Some(LATEST_TOKEN.to_string())
    }

    async fn send(&self, room_id: &str, message: OutgoingMessage) -> ClientResult<String> {
        let mut state = self.state();
        state.next_id += 1;
        let event_id = format!("$bot{}", state.next_id);

        let mut content = json!({
            "msgtype": if message.notice { "m.notice" } else { "m.text" },
            "body": message.body,
        });
        if let Some(reply_to) = &message.reply_to {
            content["m.relates_to"] = json!({"m.in_reply_to": {"event_id": reply_to}});
        }

        let event = RawEvent {
            event_id: event_id.clone(),
            room_id: room_id.to_string(),
            sender: self.user_id.clone(),
            event_type: "m.room.message".to_string(),
            origin_server_ts: chrono::Utc::now().timestamp_millis(),
            content,
        };
        state
            .timelines
            .entry(room_id.to_string())
            .or_default()
            .push(TimelineEvent::Plain(event));
        Ok(event_id)
    }

    async fn edit(&self, room_id: &str, event_id: &str, message: OutgoingMessage) -> ClientResult<()> {
        self.state()
            .edits
            .push((room_id.to_string(), event_id.to_string(), message));
        Ok(())
    }

    async fn fetch_event(&self, room_id: &str, event_id: &str) -> ClientResult<TimelineEvent> {
        self.state()
            .timelines
            .get(room_id)
            .into_iter()
            .flatten()
            .find(|event| event.event_id() == event_id)
            .cloned()
            .ok_or_else(|| ClientError::EventNotFound(event_id.to_string()))
    }

    async fn fetch_history(&self, room_id: &str, from: &str) -> ClientResult<HistoryPage> {
        let mut state = self.state();
        state.history_requests += 1;

        let timeline = state.timelines.get(room_id).map(Vec::as_slice).unwrap_or_default();
        let upper = parse_token(from, timeline.len())
            .ok_or_else(|| ClientError::Request(format!("bad pagination token {from}")))?
            .min(timeline.len());
        let lower = upper.saturating_sub(self.page_size);

        let chunk = timeline[lower..upper].iter().rev().cloned().collect();
        Ok(HistoryPage {
            chunk,
            start: from.to_string(),
            end: (lower > 0).then(|| token(lower)),
        })
    }

    async fn request_room_key(&self, event: &EncryptedEvent) -> ClientResult<()> {
        let mut state = self.state();
        if !state.shared.contains(&event.session_id) {
            return Err(ClientError::KeyRequest(event.session_id.clone()));
        }
        state.keys.insert(event.session_id.clone());
        Ok(())
    }

    async fn decrypt(&self, event: &EncryptedEvent) -> ClientResult<RawEvent> {
        let state = self.state();
        if !state.keys.contains(&event.session_id) {
            return Err(ClientError::Decryption(event.event_id.clone()));
        }
        state
            .sealed
            .get(&event.event_id)
            .cloned()
            .ok_or_else(|| ClientError::Decryption(event.event_id.clone()))
    }

    async fn join(&self, room_id: &str) -> ClientResult<()> {
        let mut state = self.state();
        if state.join_failures > 0 {
            state.join_failures -= 1;
            return Err(ClientError::Join(room_id.to_string()));
        }
        state.joined.push(room_id.to_string());
        Ok(())
    }

    async fn react(&self, room_id: &str, event_id: &str, key: &str) -> ClientResult<()> {
        self.state()
            .reactions
            .push((room_id.to_string(), event_id.to_string(), key.to_string()));
        Ok(())
    }
}

/// Bot wired to a mock room client and a fresh store
pub struct TestBot {
    pub client: Arc<MockRoomClient>,
    pub dispatcher: EventDispatcher,
    pub pool: DbPool,
}

impl TestBot {
    /// Start a bot over an in-memory SQLite store
    pub async fn start() -> Result<Self> {
        Self::start_with_settings(BotSettings::default()).await
    }

    pub async fn start_with_settings(settings: BotSettings) -> Result<Self> {
        Self::start_with(DatabaseConfig::in_memory(), settings, DEFAULT_PAGE_SIZE).await
    }

    pub async fn start_with(db: DatabaseConfig, settings: BotSettings, page_size: usize) -> Result<Self> {
        init_test_tracing();

        let pool = connect(&db).await?;
        let client = Arc::new(MockRoomClient::with_page_size(BOT_USER_ID, page_size));
        let ctx = ServiceContext::new(pool.poll_repository(), client.clone(), settings);

        Ok(Self {
            client,
            dispatcher: EventDispatcher::new(ctx),
            pool,
        })
    }

    pub fn context(&self) -> &ServiceContext {
        self.dispatcher.context()
    }

    /// Deliver a live event: append it to the timeline, then dispatch it
    pub async fn deliver(&self, event: &RawEvent) {
        self.client.push(event);
        let inbound = if event.event_type == "m.room.message" {
            InboundEvent::Message(event.clone())
        } else {
            InboundEvent::Custom(event.clone())
        };
        self.dispatcher.dispatch(inbound).await;
    }

    /// Spawn an event loop over a clone of this bot's dispatcher
    pub fn spawn_loop(&self) -> (JoinHandle<u64>, mpsc::Sender<InboundEvent>) {
        let (event_loop, tx) = EventLoop::new(self.dispatcher.clone(), EVENT_BUFFER_SIZE);
        (tokio::spawn(event_loop.run()), tx)
    }
}

/// Postgres store config, when DATABASE_URL points at Postgres
pub fn postgres_config() -> Option<DatabaseConfig> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL").ok()?;
    if !url.starts_with("postgres") {
        eprintln!("Skipping test: DATABASE_URL is not a Postgres URL");
        return None;
    }

    Some(DatabaseConfig {
        backend: DatabaseBackend::Postgres,
        url,
        ..DatabaseConfig::default()
    })
}
