//! Poll entity <-> model mapper

use poll_core::entities::{Poll, PollKind};
use poll_core::value_objects::PollId;

use crate::models::PollModel;

/// Convert PollModel to Poll entity
impl From<PollModel> for Poll {
    fn from(model: PollModel) -> Self {
        Poll {
            id: PollId::new(model.room_id, model.event_id),
            topic: model.topic,
            // Rows are written in canonical form; anything else reads as undisclosed
            kind: PollKind::parse(&model.kind).unwrap_or(PollKind::Undisclosed),
            reply_event_id: model.reply_event_id,
        }
    }
}

/// Poll entity reference as values for database insertion
pub struct PollInsert<'a> {
    pub room_id: &'a str,
    pub event_id: &'a str,
    pub topic: &'a str,
    pub kind: &'static str,
    pub reply_event_id: Option<&'a str>,
}

impl<'a> PollInsert<'a> {
    pub fn new(poll: &'a Poll) -> Self {
        Self {
            room_id: poll.id.room_id(),
            event_id: poll.id.event_id(),
            topic: &poll.topic,
            kind: poll.kind.as_str(),
            reply_event_id: poll.reply_event_id.as_deref(),
        }
    }
}
