//! History recovery service
//!
//! Rebuilds a poll the bot never saw by walking the room history backward,
//! collecting the poll's events, and replaying them through [`PollService`].

use std::fmt;

use futures::stream::{self, Stream, StreamExt};
use poll_core::events::{
    is_poll_family_member, HistoryPage, PollEventType, RawEvent, TimelineEvent,
};
use poll_core::traits::{ClientResult, OutgoingMessage, RoomClient};
use poll_core::PollId;
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::poll::PollService;

/// What a recovery request led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The poll's events were replayed, oldest first
    Replayed { poll_id: PollId, events: usize },
    /// A precondition failed; the requester was told why
    Rejected(RejectReason),
    /// The referenced event or the history could not be read
    Aborted,
}

/// Why a recovery request was turned down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    KeysUnavailable,
    Undecryptable,
    NotAPoll { event_type: String },
    AlreadyTracked,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeysUnavailable => {
                f.write_str("Unable to get keys for this poll. Please create a new one")
            }
            Self::Undecryptable => f.write_str("Unable to decrypt this poll. Please create a new one"),
            Self::NotAPoll { event_type } => write!(f, "This is not a poll, but a {event_type}"),
            Self::AlreadyTracked => {
                f.write_str("The statistics for this poll have already been created.")
            }
        }
    }
}

/// Lazily page backward through a room's history starting at `from`
///
/// The stream ends after a page without a continuation token, or right
/// after the first failed fetch.
pub fn history_pages<'c>(
    client: &'c dyn RoomClient,
    room_id: &'c str,
    from: String,
) -> impl Stream<Item = ClientResult<HistoryPage>> + 'c {
    stream::unfold(Some(from), move |token| async move {
        let token = token?;
        match client.fetch_history(room_id, &token).await {
            Ok(page) => {
                let next = page.next_token().map(str::to_string);
                Some((Ok(page), next))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// History recovery service
pub struct RecoveryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RecoveryService<'a> {
    /// Create a new RecoveryService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Recover the poll referenced by a stats request
    ///
    /// `request` is the message asking for statistics; `poll_event_id` the
    /// event it replies to.
    #[instrument(skip(self, request), fields(room_id = %request.room_id, requester = %request.sender))]
    pub async fn recover(&self, request: &RawEvent, poll_event_id: &str) -> ServiceResult<RecoveryOutcome> {
        let client = self.ctx.client();
        let room_id = request.room_id.as_str();

        let referenced = match client.fetch_event(room_id, poll_event_id).await {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "Failed to fetch referenced event");
                return Ok(RecoveryOutcome::Aborted);
            }
        };

        let start = match referenced {
            TimelineEvent::Plain(event) => event,
            TimelineEvent::Encrypted(encrypted) => {
                info!("Referenced event is encrypted, requesting keys");
                if let Err(e) = client.request_room_key(&encrypted).await {
                    info!(error = %e, "Error requesting key for event");
                    return self.reject(request, RejectReason::KeysUnavailable).await;
                }
                match client.decrypt(&encrypted).await {
                    Ok(event) => event,
                    Err(e) => {
                        info!(error = %e, "Error decrypting event");
                        return self.reject(request, RejectReason::Undecryptable).await;
                    }
                }
            }
        };

        if PollEventType::from_str(&start.event_type) != Some(PollEventType::Start) {
            info!(event_type = %start.event_type, "Referenced event is not a poll");
            let reason = RejectReason::NotAPoll {
                event_type: start.event_type,
            };
            return self.reject(request, reason).await;
        }

        let poll_id = PollId::new(room_id, start.event_id.as_str());
        if let Some(poll) = self.ctx.poll_repo().find(&poll_id).await? {
            info!(poll_id = %poll_id, "Poll already tracked");
            let reply_to = poll.reply_event_id.as_deref().unwrap_or(&request.event_id);
            self.reply(room_id, reply_to, &RejectReason::AlreadyTracked).await?;
            return Ok(RecoveryOutcome::Rejected(RejectReason::AlreadyTracked));
        }

        let Some(from) = client.sync_token() else {
            warn!("No sync token loaded, cannot walk history");
            return Ok(RecoveryOutcome::Aborted);
        };

        let mut family = self.collect_family(room_id, &start.event_id, from).await;
        family.reverse();

        let events = family.len();
        info!(poll_id = %poll_id, events, "Replaying poll history");

        let polls = PollService::new(self.ctx);
        for event in &family {
            if let Err(e) = polls.handle_custom_event(event).await {
                warn!(event_id = %event.event_id, error = %e, "Failed to replay event");
            }
        }

        Ok(RecoveryOutcome::Replayed { poll_id, events })
    }

    /// Walk backward collecting the poll's events, newest first, stopping
    /// once the start event is found
    async fn collect_family(&self, room_id: &str, poll_event_id: &str, from: String) -> Vec<RawEvent> {
        let client = self.ctx.client();
        let mut family = Vec::new();

        let pages = history_pages(client, room_id, from);
        futures::pin_mut!(pages);

        while let Some(page) = pages.next().await {
            let page = match page {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, "History walk failed, replaying what was found");
                    break;
                }
            };

            for event in page.chunk {
                let event = match event {
                    TimelineEvent::Encrypted(encrypted) => match client.decrypt(&encrypted).await {
                        Ok(event) => TimelineEvent::Plain(event),
                        Err(e) => {
                            debug!(event_id = %encrypted.event_id, error = %e, "Skipping undecryptable event");
                            continue;
                        }
                    },
                    plain => plain,
                };

                if !is_poll_family_member(&event, poll_event_id) {
                    continue;
                }
                let TimelineEvent::Plain(event) = event else {
                    continue;
                };

                let is_start = event.event_id == poll_event_id;
                family.push(event);
                if is_start {
                    return family;
                }
            }
        }

        warn!("Reached the start of history without finding the poll");
        family
    }

    async fn reject(&self, request: &RawEvent, reason: RejectReason) -> ServiceResult<RecoveryOutcome> {
        self.reply(&request.room_id, &request.event_id, &reason).await?;
        Ok(RecoveryOutcome::Rejected(reason))
    }

    async fn reply(&self, room_id: &str, reply_to: &str, reason: &RejectReason) -> ServiceResult<()> {
        let message = OutgoingMessage::notice(reason.to_string()).in_reply_to(reply_to);
        self.ctx.client().send(room_id, message).await?;
        Ok(())
    }
}
