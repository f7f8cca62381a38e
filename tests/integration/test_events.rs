//! Integration tests for player events.
//!
//! Subscribers see every state change in order; these tests collect the
//! event stream while driving the sample course.

use std::path::PathBuf;

use codequest_engine::{
    timer_channel, AttemptSettings, Catalog, Language, Player, PlayerEvent, PreferenceStore,
};
use tokio::sync::broadcast::Receiver;

fn sample_player() -> (Player, codequest_engine::TimerReceiver) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample-course/catalog.yaml");
    let catalog = Catalog::load(path).expect("Failed to load catalog");
    let (tx, rx) = timer_channel();
    let settings = AttemptSettings {
        max_failures: 2,
        ..AttemptSettings::default()
    };
    let player = Player::new(catalog, PreferenceStore::in_memory(Language::En), settings, tx);
    (player, rx)
}

fn drain(events: &mut Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

fn names(events: &[PlayerEvent]) -> Vec<&'static str> {
    events.iter().map(PlayerEvent::event_name).collect()
}

#[tokio::test(start_paused = true)]
async fn test_event_stream_for_a_level() {
    let (mut player, mut rx) = sample_player();
    let mut events = player.subscribe();

    player.start_level("types").expect("types should start");
    player.request_hint().expect("hint failed");
    player.submit().expect("submit failed");
    player.submit().expect("submit failed");

    let fired = rx.recv().await.expect("timer channel closed");
    player.handle_timer(&fired);

    player
        .set_code("let wizard: string = \"Merlin\";")
        .expect("set_code failed");
    player.submit().expect("submit failed");
    let fired = rx.recv().await.expect("timer channel closed");
    player.handle_timer(&fired);

    let received = drain(&mut events);
    assert_eq!(
        names(&received),
        vec![
            "level_started",
            "lesson_started",
            "hint_revealed",
            "attempt_evaluated",
            "attempt_evaluated",
            "solution_revealed",
            "solution_hidden",
            "attempt_evaluated",
            "level_complete",
        ]
    );

    assert_eq!(
        received.last(),
        Some(&PlayerEvent::level_complete("types", 100, 100, true))
    );
}

#[tokio::test]
async fn test_back_event() {
    let (mut player, _rx) = sample_player();
    let mut events = player.subscribe();

    player.start_level("basics").expect("basics should start");
    player.back_to_levels();

    let received = drain(&mut events);
    assert_eq!(
        names(&received),
        vec!["level_started", "lesson_started", "back"]
    );
    assert_eq!(received.last(), Some(&PlayerEvent::back("basics")));
}

#[tokio::test]
async fn test_language_change_event() {
    let (mut player, _rx) = sample_player();
    let mut events = player.subscribe();

    player.set_language(Language::Ko).expect("in-memory store");

    assert_eq!(
        drain(&mut events),
        vec![PlayerEvent::language_changed(Language::Ko)]
    );
}

#[tokio::test]
async fn test_events_serialize_as_tagged_json() {
    let (mut player, _rx) = sample_player();
    let mut events = player.subscribe();

    player.start_level("basics").expect("basics should start");

    let received = drain(&mut events);
    let lesson_started = serde_json::to_value(&received[1]).expect("serialize event");
    assert_eq!(lesson_started["event"], "lesson_started");
    assert_eq!(lesson_started["payload"]["levelId"], "basics");
    assert_eq!(lesson_started["payload"]["lessonId"], "basics-1");
    assert_eq!(lesson_started["payload"]["index"], 0);
    assert_eq!(lesson_started["payload"]["total"], 2);
}

#[tokio::test]
async fn test_late_subscriber_sees_only_new_events() {
    let (mut player, _rx) = sample_player();
    player.start_level("basics").expect("basics should start");

    let mut late = player.subscribe();
    player.back_to_levels();

    assert_eq!(names(&drain(&mut late)), vec!["back"]);
}
