//! Poll lifecycle service
//!
//! Drives a poll from its start event through responses to its end, keeping
//! the tally message in sync with the store.

use poll_core::entities::{Answer, Poll, Response};
use poll_core::events::{classify, PollEnd, PollEvent, PollResponse, PollStart, RawEvent};
use poll_core::render::render_tally;
use poll_core::traits::OutgoingMessage;
use poll_core::{DomainError, PollId};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// What handling one event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A new poll was stored and its tally message sent
    Created {
        poll_id: PollId,
        reply_event_id: String,
    },
    /// A response was stored and the tally edited
    Updated { poll_id: PollId },
    /// The poll was finalized and removed
    Closed { poll_id: PollId },
    /// Nothing changed
    Ignored(IgnoreReason),
}

/// Why an event left the store untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a poll event, or a malformed one
    NotAPollEvent,
    /// Live event older than the staleness threshold
    Stale,
    /// Start event for a poll that is already tracked
    AlreadyTracked,
    /// Response or end for a poll the store doesn't know
    UnknownPoll,
    /// Response for a poll whose tally message id was never recorded
    NoTallyMessage,
    /// Response naming an answer the poll doesn't have
    UnknownAnswer,
}

impl HandleOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

/// Poll lifecycle service
pub struct PollService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PollService<'a> {
    /// Create a new PollService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Classify a raw event and handle it
    pub async fn handle_custom_event(&self, event: &RawEvent) -> ServiceResult<HandleOutcome> {
        self.handle(classify(event)).await
    }

    /// Handle a classified event
    pub async fn handle(&self, event: PollEvent) -> ServiceResult<HandleOutcome> {
        match event {
            PollEvent::Start(start) => self.handle_start(start).await,
            PollEvent::Response(response) => self.handle_response(response).await,
            PollEvent::End(end) => self.handle_end(end).await,
            PollEvent::Unrelated => Ok(HandleOutcome::Ignored(IgnoreReason::NotAPollEvent)),
        }
    }

    /// Store a new poll and send its initial tally
    ///
    /// Storing, sending and recording the tally id are separate steps; a
    /// failure in between leaves a poll without a tally message.
    #[instrument(skip(self, start), fields(poll_id = %start.poll_id))]
    pub async fn handle_start(&self, start: PollStart) -> ServiceResult<HandleOutcome> {
        let repo = self.ctx.poll_repo();

        if repo.find(&start.poll_id).await?.is_some() {
            debug!("Poll already tracked");
            return Ok(HandleOutcome::Ignored(IgnoreReason::AlreadyTracked));
        }

        let poll = Poll::new(start.poll_id, start.topic, start.kind);
        repo.create(&poll).await?;

        let answers: Vec<Answer> = start
            .answers
            .into_iter()
            .enumerate()
            .map(|(position, option)| {
                Answer::new(
                    poll.id.clone(),
                    option.answer_hash,
                    option.text,
                    position as i32,
                )
            })
            .collect();
        if !answers.is_empty() {
            repo.add_answers(&answers).await?;
        }

        let body = render_tally(&poll, &answers, &[], false);
        let reply_event_id = self
            .ctx
            .client()
            .send(poll.id.room_id(), OutgoingMessage::notice(body))
            .await?;

        repo.set_reply_event_id(&poll.id, &reply_event_id).await?;

        info!(
            kind = %poll.kind,
            answers = answers.len(),
            reply_event_id = %reply_event_id,
            "Poll created"
        );

        Ok(HandleOutcome::Created {
            poll_id: poll.id,
            reply_event_id,
        })
    }

    /// Record a vote and edit the tally
    #[instrument(skip(self, response), fields(poll_id = %response.poll_id, user = %response.user))]
    pub async fn handle_response(&self, response: PollResponse) -> ServiceResult<HandleOutcome> {
        let repo = self.ctx.poll_repo();

        let Some(poll) = repo.find(&response.poll_id).await? else {
            debug!("Response for unknown poll");
            return Ok(HandleOutcome::Ignored(IgnoreReason::UnknownPoll));
        };
        let Some(reply_event_id) = poll.reply_event_id.clone() else {
            debug!("Poll has no tally message yet, dropping response");
            return Ok(HandleOutcome::Ignored(IgnoreReason::NoTallyMessage));
        };

        let record = Response::new(poll.id.clone(), response.user, response.answer_hash);
        match repo.upsert_response(&record).await {
            Ok(()) => {}
            Err(DomainError::UnknownAnswer { answer_hash, .. }) => {
                warn!(answer_hash = %answer_hash, "Response names an unknown answer, dropping");
                return Ok(HandleOutcome::Ignored(IgnoreReason::UnknownAnswer));
            }
            Err(e) => return Err(e.into()),
        }

        let body = self.render(&poll, false).await?;
        self.ctx
            .client()
            .edit(poll.id.room_id(), &reply_event_id, OutgoingMessage::notice(body))
            .await?;

        debug!("Tally updated");
        Ok(HandleOutcome::Updated { poll_id: poll.id })
    }

    /// Finalize the tally and forget the poll
    #[instrument(skip(self, end), fields(poll_id = %end.poll_id))]
    pub async fn handle_end(&self, end: PollEnd) -> ServiceResult<HandleOutcome> {
        let repo = self.ctx.poll_repo();

        let Some(poll) = repo.find(&end.poll_id).await? else {
            debug!("End for unknown poll");
            return Ok(HandleOutcome::Ignored(IgnoreReason::UnknownPoll));
        };

        match poll.reply_event_id.as_deref() {
            Some(reply_event_id) => {
                let body = self.render(&poll, true).await?;
                self.ctx
                    .client()
                    .edit(poll.id.room_id(), reply_event_id, OutgoingMessage::notice(body))
                    .await?;
            }
            None => warn!("Poll ended without a tally message, removing it"),
        }

        repo.delete(&poll.id).await?;

        info!("Poll closed");
        Ok(HandleOutcome::Closed { poll_id: poll.id })
    }

    /// Render the tally from the current persisted state
    pub async fn render(&self, poll: &Poll, is_final: bool) -> ServiceResult<String> {
        let repo = self.ctx.poll_repo();
        let answers = repo.find_answers(&poll.id).await?;
        let responses = repo.find_responses(&poll.id).await?;
        Ok(render_tally(poll, &answers, &responses, is_final))
    }
}
