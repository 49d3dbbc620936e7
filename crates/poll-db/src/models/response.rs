//! Response database model

use sqlx::FromRow;

/// Database model for responses table
///
/// `response` holds the chosen answer hash.
#[derive(Debug, Clone, FromRow)]
pub struct ResponseModel {
    pub response: String,
    pub user: String,
    pub room_id: String,
    pub reference_id: String,
}
