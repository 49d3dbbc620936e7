//! Tally rendering
//!
//! Pure functions that turn persisted poll state into the text of the tally
//! message. No I/O happens here.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::entities::{Answer, Poll, Response};

/// Format a user id as an HTML mention ("pill")
pub fn make_pill(user_id: &str) -> String {
    format!(r#"<a href="https://matrix.to/#/{user_id}">{user_id}</a>"#)
}

/// Leading part of a pill for `user_id`, up to the first `>`.
///
/// A message that mentions the bot first has a formatted body starting with this.
pub fn mention_prefix(user_id: &str) -> String {
    let pill = make_pill(user_id);
    match pill.split_once('>') {
        Some((prefix, _)) => prefix.to_string(),
        None => pill,
    }
}

/// Render the tally message for a poll.
///
/// `answers` may be given in any order; they are sorted by `position`.
/// `is_final` only changes the header line.
pub fn render_tally(poll: &Poll, answers: &[Answer], responses: &[Response], is_final: bool) -> String {
    if poll.kind.is_disclosed() {
        render_disclosed(&poll.topic, answers, responses, is_final)
    } else {
        render_undisclosed(&poll.topic, responses, is_final)
    }
}

fn render_disclosed(topic: &str, answers: &[Answer], responses: &[Response], is_final: bool) -> String {
    let mut ordered: Vec<&Answer> = answers.iter().collect();
    ordered.sort_by_key(|a| a.position);

    // Votes for an answer we don't know match no bucket and are not shown.
    let mut data = String::new();
    for answer in ordered.into_iter().rev() {
        let _ = writeln!(data, "{}:", answer.text);
        for response in responses.iter().filter(|r| r.is_for(&answer.answer_hash)) {
            let _ = writeln!(data, "{}", make_pill(&response.user));
        }
        data.push('\n');
    }

    if is_final {
        format!("Final poll results for `{topic}`:\n\n{data}")
    } else {
        format!("Poll results for `{topic}`:\n\n{data}")
    }
}

fn render_undisclosed(topic: &str, responses: &[Response], is_final: bool) -> String {
    let voters: BTreeSet<&str> = responses.iter().map(|r| r.user.as_str()).collect();

    let mut data = String::new();
    for user in voters {
        let _ = writeln!(data, "{}", make_pill(user));
    }
    data.push('\n');

    if is_final {
        format!("Final voters for poll `{topic}`:\n\n{data}")
    } else {
        format!("Voters for poll `{topic}`:\n\n{data}")
    }
}
