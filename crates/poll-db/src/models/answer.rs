//! Answer database model

use sqlx::FromRow;

/// Database model for answers table
#[derive(Debug, Clone, FromRow)]
pub struct AnswerModel {
    pub answer: String,
    pub answer_hash: String,
    pub room_id: String,
    pub reference_id: String,
    pub position: i32,
}
