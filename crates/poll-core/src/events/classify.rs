//! Event classifier
//!
//! Maps raw room events onto poll lifecycle events. Malformed poll events
//! are logged and classified as [`PollEvent::Unrelated`].

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::entities::PollKind;
use crate::value_objects::PollId;

use super::envelope::{non_empty, RawEvent, TimelineEvent};
use super::event_types::PollEventType;

const TEXT_KEY: &str = "org.matrix.msc1767.text";

/// One answer option declared by a poll start event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub answer_hash: String,
    pub text: String,
}

/// A valid poll start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStart {
    pub poll_id: PollId,
    pub topic: String,
    pub kind: PollKind,
    pub answers: Vec<AnswerOption>,
}

/// A valid single-choice vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResponse {
    /// The poll being voted on (room + back-referenced start event)
    pub poll_id: PollId,
    pub user: String,
    pub answer_hash: String,
}

/// A poll being closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollEnd {
    pub poll_id: PollId,
}

/// Classified poll lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollEvent {
    Start(PollStart),
    Response(PollResponse),
    End(PollEnd),
    Unrelated,
}

impl PollEvent {
    /// Poll this event belongs to, if it is a poll event
    pub fn poll_id(&self) -> Option<&PollId> {
        match self {
            Self::Start(s) => Some(&s.poll_id),
            Self::Response(r) => Some(&r.poll_id),
            Self::End(e) => Some(&e.poll_id),
            Self::Unrelated => None,
        }
    }
}

/// Classify a raw event
pub fn classify(event: &RawEvent) -> PollEvent {
    match PollEventType::from_str(&event.event_type) {
        Some(PollEventType::Start) => classify_start(event),
        Some(PollEventType::Response) => classify_response(event),
        Some(PollEventType::End) => classify_end(event),
        None => {
            debug!(
                event_type = %event.event_type,
                sender = %event.sender,
                room_id = %event.room_id,
                "Event is not a poll event"
            );
            PollEvent::Unrelated
        }
    }
}

/// Check whether `event` belongs to the family of the poll started by `poll_event_id`
pub fn is_poll_family_member(event: &TimelineEvent, poll_event_id: &str) -> bool {
    let TimelineEvent::Plain(event) = event else {
        return false;
    };

    match PollEventType::from_str(&event.event_type) {
        Some(PollEventType::Start) => event.event_id == poll_event_id,
        Some(PollEventType::Response | PollEventType::End) => {
            event.relates_to_event_id() == Some(poll_event_id)
        }
        None => false,
    }
}

fn non_empty_object<'v>(content: &'v Value, key: &str) -> Option<&'v Value> {
    content
        .get(key)
        .filter(|c| c.as_object().is_some_and(|o| !o.is_empty()))
}

fn start_content(content: &Value) -> Option<&Value> {
    let legacy = PollEventType::Start.legacy_str();

    non_empty_object(content, legacy)
        .or_else(|| non_empty_object(content, PollEventType::Start.as_str()))
        .or_else(|| {
            // Some clients wrap the poll body in an edit
            let wrapped = content.get("m.new_content")?;
            non_empty_object(wrapped, legacy)
                .or_else(|| non_empty_object(wrapped, PollEventType::End.legacy_str()))
        })
}

fn text_of(value: &Value) -> &str {
    non_empty(value.get(TEXT_KEY))
        .or_else(|| non_empty(value.get("body")))
        .unwrap_or_default()
}

fn classify_start(event: &RawEvent) -> PollEvent {
    let Some(content) = start_content(&event.content) else {
        warn!(event_id = %event.event_id, "Got poll without content");
        return PollEvent::Unrelated;
    };

    let topic = content.get("question").map(text_of).unwrap_or_default();
    if topic.is_empty() {
        warn!(event_id = %event.event_id, "Got poll without topic");
        return PollEvent::Unrelated;
    }

    let kind = content.get("kind").and_then(Value::as_str).unwrap_or_default();
    let Some(kind) = PollKind::parse(kind) else {
        warn!(event_id = %event.event_id, "Got poll without kind");
        return PollEvent::Unrelated;
    };

    let mut seen = HashSet::new();
    let mut answers = Vec::new();
    for answer in content
        .get("answers")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
    {
        let answer_hash = answer.get("id").and_then(Value::as_str).unwrap_or_default();
        let text = text_of(answer);
        if answer_hash.is_empty() {
            warn!(event_id = %event.event_id, "Got poll answer without id");
            continue;
        }
        if text.is_empty() {
            warn!(event_id = %event.event_id, answer_hash, "Got poll answer without text");
            continue;
        }
        if !seen.insert(answer_hash) {
            warn!(event_id = %event.event_id, answer_hash, "Got duplicate poll answer id");
            continue;
        }
        answers.push(AnswerOption {
            answer_hash: answer_hash.to_string(),
            text: text.to_string(),
        });
    }

    PollEvent::Start(PollStart {
        poll_id: PollId::new(&event.room_id, &event.event_id),
        topic: topic.to_string(),
        kind,
        answers,
    })
}

fn classify_response(event: &RawEvent) -> PollEvent {
    let Some(reference_id) = event.relates_to_event_id() else {
        warn!(event_id = %event.event_id, "Got poll response without reference id");
        return PollEvent::Unrelated;
    };

    let selected = event
        .content
        .get(PollEventType::Response.legacy_str())
        .or_else(|| event.content.get(PollEventType::Response.as_str()))
        .and_then(|c| c.get("answers"))
        .and_then(Value::as_array)
        .and_then(|answers| answers.first())
        .and_then(|first| non_empty(Some(first)));

    let Some(answer_hash) = selected else {
        warn!(event_id = %event.event_id, "Got poll response without answers");
        return PollEvent::Unrelated;
    };

    PollEvent::Response(PollResponse {
        poll_id: PollId::new(&event.room_id, reference_id),
        user: event.sender.clone(),
        answer_hash: answer_hash.to_string(),
    })
}

fn classify_end(event: &RawEvent) -> PollEvent {
    match event.relates_to_event_id() {
        Some(reference_id) => PollEvent::End(PollEnd {
            poll_id: PollId::new(&event.room_id, reference_id),
        }),
        None => {
            warn!(event_id = %event.event_id, "Got poll end without reference id");
            PollEvent::Unrelated
        }
    }
}
