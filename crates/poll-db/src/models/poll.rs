//! Poll database model

use sqlx::FromRow;

/// Database model for polls table
#[derive(Debug, Clone, FromRow)]
pub struct PollModel {
    pub room_id: String,
    pub event_id: String,
    pub topic: String,
    pub kind: String,
    pub reply_event_id: Option<String>,
}
