//! Response entity <-> model mapper

use poll_core::entities::Response;
use poll_core::value_objects::PollId;

use crate::models::ResponseModel;

/// Convert ResponseModel to Response entity
impl From<ResponseModel> for Response {
    fn from(model: ResponseModel) -> Self {
        Response {
            poll_id: PollId::new(model.room_id, model.reference_id),
            user: model.user,
            answer_hash: model.response,
        }
    }
}

pub struct ResponseInsert<'a> {
    pub response: &'a str,
    pub user: &'a str,
    pub room_id: &'a str,
    pub reference_id: &'a str,
}

impl<'a> ResponseInsert<'a> {
    pub fn new(response: &'a Response) -> Self {
        Self {
            response: &response.answer_hash,
            user: &response.user,
            room_id: response.poll_id.room_id(),
            reference_id: response.poll_id.event_id(),
        }
    }
}
