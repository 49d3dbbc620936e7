//! Answer entity <-> model mapper

use poll_core::entities::Answer;
use poll_core::value_objects::PollId;

use crate::models::AnswerModel;

/// Convert AnswerModel to Answer entity
impl From<AnswerModel> for Answer {
    fn from(model: AnswerModel) -> Self {
        Answer {
            poll_id: PollId::new(model.room_id, model.reference_id),
            answer_hash: model.answer_hash,
            text: model.answer,
            position: model.position,
        }
    }
}

/// Answer entity reference as values for database insertion
pub struct AnswerInsert<'a> {
    pub answer: &'a str,
    pub answer_hash: &'a str,
    pub room_id: &'a str,
    pub reference_id: &'a str,
    pub position: i32,
}

impl<'a> AnswerInsert<'a> {
    pub fn new(answer: &'a Answer) -> Self {
        Self {
            answer: &answer.text,
            answer_hash: &answer.answer_hash,
            room_id: answer.poll_id.room_id(),
            reference_id: answer.poll_id.event_id(),
            position: answer.position,
        }
    }
}
