//! End-to-end progression tests for the CodeQuest engine.
//!
//! These drive a [`Player`] through the sample course with tokio's clock
//! paused, so the advance and reveal delays elapse instantly and in order.

use std::path::PathBuf;
use std::time::Duration;

use codequest_engine::{
    timer_channel, AttemptOutcome, Catalog, CategoryFilter, Config, Language, Player,
    PlayerUpdate, PreferenceStore, QuestError, Screen, TimerKind, TimerReceiver,
};

/// Path to the sample course fixture.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample-course")
}

fn sample_config() -> Config {
    Config::load_from_file(&fixture_path().join("codequest.json")).expect("Failed to load config")
}

fn sample_player() -> (Player, TimerReceiver) {
    let catalog =
        Catalog::load(fixture_path().join("catalog.yaml")).expect("Failed to load catalog");
    let (tx, rx) = timer_channel();
    let player = Player::new(
        catalog,
        PreferenceStore::in_memory(Language::En),
        sample_config().attempts,
        tx,
    );
    (player, rx)
}

fn type_solution(player: &mut Player) {
    let solution = player
        .session()
        .expect("no active lesson")
        .current_lesson()
        .exercise
        .solution
        .clone();
    player.set_code(solution).expect("set_code failed");
}

/// Solves the current lesson and lets the advance delay run out.
async fn pass_lesson(player: &mut Player, rx: &mut TimerReceiver) -> PlayerUpdate {
    type_solution(player);
    assert_eq!(player.submit().expect("submit failed"), AttemptOutcome::Passed);
    let fired = rx.recv().await.expect("timer channel closed");
    assert_eq!(fired.kind, TimerKind::Advance);
    player.handle_timer(&fired)
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Fixtures
// ============================================================================

#[test]
fn test_sample_catalog_loads() {
    let catalog =
        Catalog::load(fixture_path().join("catalog.yaml")).expect("Failed to load catalog");

    assert_eq!(catalog.len(), 4);
    assert_eq!(catalog.categories(), vec!["react", "typescript"]);
    assert_eq!(catalog.lessons_for("basics").map(<[_]>::len), Some(2));
    assert!(catalog.lessons_for("capstone").is_none());
}

#[test]
fn test_sample_config_loads() {
    let config = sample_config();

    assert_eq!(config.catalog.as_deref(), Some("catalog.yaml"));
    assert_eq!(config.default_language, Language::Ko);
    assert_eq!(config.attempts.max_failures, 2);
    assert_eq!(config.attempts.reveal_window_ms, 2000);
    assert_eq!(config.attempts.advance_delay_ms, 500);
}

// ============================================================================
// Progression
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_full_course_progression() {
    let (mut player, mut rx) = sample_player();

    let unlocked: Vec<&str> = player
        .levels()
        .iter()
        .filter(|view| !view.locked)
        .map(|view| view.level.id.as_str())
        .collect();
    assert_eq!(unlocked, vec!["basics", "types"]);

    player.start_level("basics").expect("basics should start");
    assert_eq!(
        pass_lesson(&mut player, &mut rx).await,
        PlayerUpdate::NextLesson { index: 1 }
    );

    let session = player.session().expect("still in basics");
    assert_eq!(session.current_lesson().id, "basics-2");
    assert_eq!(session.code(), "function B() {\n\n}");

    // Different formatting from the reference still passes.
    player
        .set_code("function B(){ return (<p>Hello</p>); }")
        .expect("set_code failed");
    assert_eq!(player.submit().expect("submit failed"), AttemptOutcome::Passed);
    let fired = rx.recv().await.expect("timer channel closed");
    assert_eq!(
        player.handle_timer(&fired),
        PlayerUpdate::LevelComplete {
            level_id: "basics".to_string(),
            points: 100,
            first_completion: true,
        }
    );
    assert!(matches!(player.screen(), Screen::Levels));

    player.start_level("components").expect("components unlocked");
    pass_lesson(&mut player, &mut rx).await;

    let progress = player.progress();
    assert_eq!(progress.total_points(), 250);
    assert_eq!(progress.completed_levels(), 2);
    let ids: Vec<&str> = progress.completed_level_ids().iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["basics", "components"]);
    assert_eq!(player.completion_percent(), 50);
}

#[tokio::test(start_paused = true)]
async fn test_locked_level_lists_missing_prerequisites() {
    let (mut player, mut rx) = sample_player();

    let err = player.start_level("capstone").unwrap_err();
    let QuestError::LevelLocked { missing, .. } = err else {
        panic!("expected LevelLocked, got {err:?}");
    };
    assert_eq!(missing, vec!["basics", "components"]);

    player.start_level("basics").expect("basics should start");
    pass_lesson(&mut player, &mut rx).await;
    pass_lesson(&mut player, &mut rx).await;

    let err = player.start_level("capstone").unwrap_err();
    assert!(err.to_string().contains("components"));
    assert!(matches!(
        err,
        QuestError::LevelLocked { ref missing, .. } if missing == &vec!["components".to_string()]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_level_without_lessons_shows_not_found() {
    let (mut player, mut rx) = sample_player();
    for level in ["basics", "components"] {
        player.start_level(level).expect("level should start");
        while !matches!(
            pass_lesson(&mut player, &mut rx).await,
            PlayerUpdate::LevelComplete { .. }
        ) {}
    }

    player.start_level("capstone").expect("missing content is not an error");

    let Screen::NotFound(details) = player.screen() else {
        panic!("expected the not-found screen");
    };
    assert_eq!(details.level_id, "capstone");
    assert_eq!(details.lesson_index, 0);
    assert_eq!(details.available_ids, vec!["basics", "components", "types"]);
    assert!(matches!(player.submit(), Err(QuestError::NoActiveLesson)));

    player.back_to_levels();
    assert!(matches!(player.screen(), Screen::Levels));
    assert_eq!(player.progress().total_points(), 250);
}

#[tokio::test(start_paused = true)]
async fn test_replay_awards_points_once() {
    let (mut player, mut rx) = sample_player();

    player.start_level("types").expect("types should start");
    let first = pass_lesson(&mut player, &mut rx).await;
    assert!(matches!(first, PlayerUpdate::LevelComplete { first_completion: true, .. }));

    player.start_level("types").expect("completed levels stay playable");
    let replay = pass_lesson(&mut player, &mut rx).await;
    assert_eq!(
        replay,
        PlayerUpdate::LevelComplete {
            level_id: "types".to_string(),
            points: 100,
            first_completion: false,
        }
    );

    assert_eq!(player.progress().total_points(), 100);
    assert_eq!(player.progress().completed_levels(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_category_filter_on_overview() {
    let (player, _rx) = sample_player();

    let typescript: Vec<&str> = player
        .levels_in(&CategoryFilter::parse("typescript"))
        .iter()
        .map(|view| view.level.id.as_str())
        .collect();
    assert_eq!(typescript, vec!["types"]);
    assert_eq!(player.levels_in(&CategoryFilter::All).len(), 4);
}

// ============================================================================
// Attempts, hints and reveal
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reveal_window_then_pass() {
    let (mut player, mut rx) = sample_player();
    player.start_level("basics").expect("basics should start");

    assert_eq!(
        player.submit().expect("submit failed"),
        AttemptOutcome::Failed { attempt: 1 }
    );
    assert_eq!(
        player.submit().expect("submit failed"),
        AttemptOutcome::SolutionRevealed { attempt: 2 }
    );
    assert_eq!(
        player.session().and_then(|s| s.solution()),
        Some("function A() { return <h1>Hi</h1> }")
    );

    type_solution(&mut player);
    assert_eq!(player.submit().expect("submit failed"), AttemptOutcome::Passed);
    assert!(player.session().and_then(|s| s.solution()).is_none());

    let fired = rx.recv().await.expect("timer channel closed");
    assert_eq!(fired.kind, TimerKind::Advance);
    assert_eq!(player.handle_timer(&fired), PlayerUpdate::NextLesson { index: 1 });
}

#[tokio::test(start_paused = true)]
async fn test_reveal_expires_and_resets_counter() {
    let (mut player, mut rx) = sample_player();
    player.start_level("types").expect("types should start");
    player.submit().expect("submit failed");
    player.submit().expect("submit failed");

    tokio::time::advance(Duration::from_millis(1900)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "reveal window is 2000 ms");

    let fired = rx.recv().await.expect("timer channel closed");
    assert_eq!(fired.kind, TimerKind::RevealExpired);
    assert_eq!(player.handle_timer(&fired), PlayerUpdate::SolutionHidden);

    let session = player.session().expect("still in types");
    assert!(session.solution().is_none());
    assert_eq!(session.attempts().consecutive_failures(), 0);

    assert_eq!(
        player.submit().expect("submit failed"),
        AttemptOutcome::Failed { attempt: 1 }
    );
}

#[tokio::test(start_paused = true)]
async fn test_hints_reset_between_lessons() {
    let (mut player, mut rx) = sample_player();
    player.start_level("basics").expect("basics should start");

    let first = player.request_hint().expect("hint failed").expect("first hint");
    assert_eq!(first.get(Language::Ko), "return 문을 사용하세요");
    player.request_hint().expect("hint failed").expect("second hint");
    assert!(player.request_hint().expect("hint failed").is_none());
    assert_eq!(player.session().map(|s| s.visible_hints().len()), Some(2));

    pass_lesson(&mut player, &mut rx).await;

    let session = player.session().expect("still in basics");
    assert!(session.visible_hints().is_empty());
    assert_eq!(session.hints().total(), 1);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_leaving_level_cancels_pending_reveal() {
    let (mut player, mut rx) = sample_player();
    player.start_level("basics").expect("basics should start");
    player.submit().expect("submit failed");
    player.submit().expect("submit failed");

    player.back_to_levels();
    player.start_level("types").expect("types should start");

    tokio::time::advance(Duration::from_secs(30)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "reveal timer from basics must not fire");

    let session = player.session().expect("in types");
    assert_eq!(session.level().id, "types");
    assert_eq!(session.attempts().consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_skipping_wait_cancels_advance_timer() {
    let (mut player, mut rx) = sample_player();
    player.start_level("basics").expect("basics should start");
    type_solution(&mut player);
    player.submit().expect("submit failed");

    assert_eq!(
        player.advance_now().expect("advance failed"),
        PlayerUpdate::NextLesson { index: 1 }
    );

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;
    assert!(rx.try_recv().is_err(), "advance timer must not fire twice");
    assert_eq!(player.session().map(|s| s.lesson_index()), Some(1));
}

// ============================================================================
// Preferences
// ============================================================================

#[tokio::test]
async fn test_language_preference_survives_restart() {
    let dir = std::env::temp_dir().join(format!("codequest_it_prefs_{}", std::process::id()));
    let config = Config {
        preferences_file: dir.join("prefs.json").display().to_string(),
        ..Config::default()
    };

    let (tx, _rx) = timer_channel();
    let mut player = Player::from_config(&config, tx).expect("player from config");
    assert_eq!(player.language(), Language::En);
    player.set_language(Language::Ko).expect("save preference");

    let (tx, _rx) = timer_channel();
    let restarted = Player::from_config(&config, tx).expect("player from config");
    assert_eq!(restarted.language(), Language::Ko);

    std::fs::remove_dir_all(&dir).ok();
}
