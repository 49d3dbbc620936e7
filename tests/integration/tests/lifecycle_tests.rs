//! Poll lifecycle tests
//!
//! Live poll events flowing through the dispatcher into the SQLite store.
//!
//! Run with: cargo test -p integration-tests --test lifecycle_tests

use integration_tests::*;
use poll_core::{make_pill, PollId};
use poll_service::BotSettings;

fn bucket<'a>(answer: &'a str, users: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    (answer, users)
}

fn disclosed_tally(header: &str, topic: &str, buckets: &[(&str, &[&str])]) -> String {
    let mut text = format!("{header} `{topic}`:\n\n");
    for (answer, users) in buckets {
        text.push_str(answer);
        text.push_str(":\n");
        for user in *users {
            text.push_str(&make_pill(user));
            text.push('\n');
        }
        text.push('\n');
    }
    text
}

// ============================================================================
// Full lifecycle
// ============================================================================

#[tokio::test]
async fn test_lunch_poll_lifecycle() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = lunch_poll().build(&room, "@alice:x");
    bot.deliver(&start).await;

    let sent = bot.client.sent(&room);
    assert_eq!(sent.len(), 1);
    let tally_id = sent[0].event_id.clone();
    assert_eq!(sent[0].content["msgtype"], "m.notice");
    assert_eq!(
        sent[0].content["body"],
        disclosed_tally("Poll results for", "Lunch?", &[bucket("Salad", &[]), bucket("Pizza", &[])])
    );

    bot.deliver(&poll_response(Namespace::Legacy, &room, "@alice:x", &start.event_id, "a1"))
        .await;
    bot.deliver(&poll_response(Namespace::Legacy, &room, "@bob:x", &start.event_id, "a2"))
        .await;
    assert_eq!(
        bot.client.latest_edit(&tally_id).unwrap(),
        disclosed_tally(
            "Poll results for",
            "Lunch?",
            &[bucket("Salad", &["@bob:x"]), bucket("Pizza", &["@alice:x"])]
        )
    );

    bot.deliver(&poll_end(Namespace::Legacy, &room, "@alice:x", &start.event_id))
        .await;
    assert_eq!(
        bot.client.latest_edit(&tally_id).unwrap(),
        disclosed_tally(
            "Final poll results for",
            "Lunch?",
            &[bucket("Salad", &["@bob:x"]), bucket("Pizza", &["@alice:x"])]
        )
    );
    assert_eq!(bot.client.edits().len(), 3);

    let poll_id = PollId::new(&room, &start.event_id);
    assert!(bot.context().poll_repo().find(&poll_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_stable_namespace_is_handled() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = lunch_poll().stable().build(&room, "@alice:x");
    bot.deliver(&start).await;
    bot.deliver(&poll_response(Namespace::Stable, &room, "@carol:x", &start.event_id, "a2"))
        .await;

    let tally_id = bot.client.sent(&room)[0].event_id.clone();
    assert_eq!(
        bot.client.latest_edit(&tally_id).unwrap(),
        disclosed_tally(
            "Poll results for",
            "Lunch?",
            &[bucket("Salad", &["@carol:x"]), bucket("Pizza", &[])]
        )
    );
}

// ============================================================================
// Votes
// ============================================================================

#[tokio::test]
async fn test_last_vote_wins() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = lunch_poll().build(&room, "@alice:x");
    bot.deliver(&start).await;
    bot.deliver(&poll_response(Namespace::Legacy, &room, "@bob:x", &start.event_id, "a1"))
        .await;
    bot.deliver(&poll_response(Namespace::Legacy, &room, "@bob:x", &start.event_id, "a2"))
        .await;

    let poll_id = PollId::new(&room, &start.event_id);
    let responses = bot.context().poll_repo().find_responses(&poll_id).await.unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].answer_hash, "a2");

    let tally_id = bot.client.sent(&room)[0].event_id.clone();
    assert_eq!(
        bot.client.latest_edit(&tally_id).unwrap(),
        disclosed_tally(
            "Poll results for",
            "Lunch?",
            &[bucket("Salad", &["@bob:x"]), bucket("Pizza", &[])]
        )
    );
}

#[tokio::test]
async fn test_vote_for_unknown_answer_leaves_tally_alone() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = lunch_poll().build(&room, "@alice:x");
    bot.deliver(&start).await;
    bot.deliver(&poll_response(Namespace::Legacy, &room, "@bob:x", &start.event_id, "zz"))
        .await;

    assert!(bot.client.edits().is_empty());
    let poll_id = PollId::new(&room, &start.event_id);
    assert!(bot
        .context()
        .poll_repo()
        .find_responses(&poll_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_undisclosed_poll_lists_voters_only() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = lunch_poll().undisclosed().build(&room, "@alice:x");
    bot.deliver(&start).await;
    bot.deliver(&poll_response(Namespace::Legacy, &room, "@zed:x", &start.event_id, "a1"))
        .await;
    bot.deliver(&poll_response(Namespace::Legacy, &room, "@bob:x", &start.event_id, "a2"))
        .await;

    let tally_id = bot.client.sent(&room)[0].event_id.clone();
    let text = bot.client.latest_edit(&tally_id).unwrap();
    assert_eq!(
        text,
        format!(
            "Voters for poll `Lunch?`:\n\n{}\n{}\n\n",
            make_pill("@bob:x"),
            make_pill("@zed:x")
        )
    );
    assert!(!text.contains("Pizza"));
    assert!(!text.contains("Salad"));
}

// ============================================================================
// Terminality and duplicates
// ============================================================================

#[tokio::test]
async fn test_events_after_end_are_ignored() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = lunch_poll().build(&room, "@alice:x");
    bot.deliver(&start).await;
    bot.deliver(&poll_end(Namespace::Legacy, &room, "@alice:x", &start.event_id))
        .await;
    assert_eq!(bot.client.edits().len(), 1);

    bot.deliver(&poll_response(Namespace::Legacy, &room, "@bob:x", &start.event_id, "a1"))
        .await;
    bot.deliver(&poll_end(Namespace::Legacy, &room, "@alice:x", &start.event_id))
        .await;

    assert_eq!(bot.client.edits().len(), 1);
    assert_eq!(bot.client.sent(&room).len(), 1);
}

#[tokio::test]
async fn test_duplicate_start_sends_one_tally() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = lunch_poll().build(&room, "@alice:x");
    bot.deliver(&start).await;
    bot.dispatcher.on_custom_event(&start, true).await;

    assert_eq!(bot.client.sent(&room).len(), 1);
}

#[tokio::test]
async fn test_polls_in_different_rooms_are_independent() {
    let bot = TestBot::start().await.unwrap();
    let (room_a, room_b) = (unique_room(), unique_room());

    let start_a = lunch_poll().build(&room_a, "@alice:x");
    let mut start_b = lunch_poll().build(&room_b, "@alice:x");
    start_b.event_id = start_a.event_id.clone();

    bot.deliver(&start_a).await;
    bot.deliver(&start_b).await;
    bot.deliver(&poll_end(Namespace::Legacy, &room_a, "@alice:x", &start_a.event_id))
        .await;

    let repo = bot.context().poll_repo();
    assert!(repo
        .find(&PollId::new(&room_a, &start_a.event_id))
        .await
        .unwrap()
        .is_none());
    assert!(repo
        .find(&PollId::new(&room_b, &start_b.event_id))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_malformed_poll_is_not_tracked() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let mut start = PollStartFixture::new("", &[("a1", "Pizza")]).build(&room, "@alice:x");
    bot.deliver(&start).await;
    start.content = serde_json::json!({});
    bot.deliver(&start).await;

    assert!(bot.client.sent(&room).is_empty());
}

// ============================================================================
// Staleness
// ============================================================================

#[tokio::test]
async fn test_stale_live_events_are_dropped() {
    let bot = TestBot::start().await.unwrap();
    let room = unique_room();

    let start = aged(lunch_poll().build(&room, "@alice:x"), 600);
    bot.deliver(&start).await;

    assert!(bot.client.sent(&room).is_empty());
}

#[tokio::test]
async fn test_stale_filter_disabled_keeps_old_events() {
    let settings = BotSettings {
        filter_stale_events: false,
        ..BotSettings::default()
    };
    let bot = TestBot::start_with_settings(settings).await.unwrap();
    let room = unique_room();

    let start = aged(lunch_poll().build(&room, "@alice:x"), 600);
    bot.deliver(&start).await;

    assert_eq!(bot.client.sent(&room).len(), 1);
}
