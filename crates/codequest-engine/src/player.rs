//! The player: one learner moving between the level overview and lessons.
//!
//! [`Player`] owns the long-lived state (catalog, progress, preferences) and
//! at most one [`LevelSession`]. All mutation goes through its methods, and
//! fired timers are fed back in with [`Player::handle_timer`] from the same
//! task that handles input.
//!
//! Methods that can schedule a timer ([`Player::submit`],
//! [`Player::advance_now`] and [`Player::handle_timer`]) spawn a tokio task
//! and must be called from within a tokio runtime.

use crate::attempt::AttemptOutcome;
use crate::catalog::Catalog;
use crate::config::{AttemptSettings, Config};
use crate::error::{ContentNotFound, QuestError, Result};
use crate::evaluate::{Evaluator, NormalizedMatch};
use crate::events::{EventBroadcaster, PlayerEvent};
use crate::i18n::{Language, LocalizedText, Translations};
use crate::preferences::PreferenceStore;
use crate::progress::{CompletionOutcome, Progress};
use crate::sequencer::{Advance, LevelSession, TimerEffect};
use crate::timer::{TimerFired, TimerSender};
use crate::unlock::{self, CategoryFilter, LevelView};

/// What the learner is looking at.
#[derive(Debug)]
pub enum Screen {
    /// The level overview.
    Levels,
    /// A level in progress.
    Lesson(Box<LevelSession>),
    /// A level that has no lessons; only going back is possible.
    NotFound(ContentNotFound),
}

/// Visible effect of advancing or of a fired timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerUpdate {
    /// Nothing changed.
    Nothing,
    /// The revealed solution was hidden again.
    SolutionHidden,
    /// The next lesson of the level is showing.
    NextLesson {
        /// Zero-based index of the new lesson.
        index: usize,
    },
    /// The level was completed and the overview is showing again.
    LevelComplete {
        /// The completed level.
        level_id: String,
        /// The level's point value.
        points: u32,
        /// `false` if the level had been completed before.
        first_completion: bool,
    },
}

/// A single learner's session.
///
/// Must be driven from within a tokio runtime: grading and advancing
/// schedule timers with `tokio::spawn`.
pub struct Player {
    catalog: Catalog,
    progress: Progress,
    preferences: PreferenceStore,
    translations: Translations,
    settings: AttemptSettings,
    evaluator: Box<dyn Evaluator>,
    timers: TimerSender,
    events: EventBroadcaster,
    screen: Screen,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("levels", &self.catalog.len())
            .field("progress", &self.progress)
            .field("language", &self.translations)
            .field("screen", &self.screen)
            .finish_non_exhaustive()
    }
}

impl Player {
    /// Creates a player on the level overview with empty progress.
    #[must_use]
    pub fn new(
        catalog: Catalog,
        preferences: PreferenceStore,
        settings: AttemptSettings,
        timers: TimerSender,
    ) -> Self {
        Self {
            catalog,
            progress: Progress::new(),
            translations: Translations::new(preferences.language()),
            preferences,
            settings,
            evaluator: Box::new(NormalizedMatch),
            timers,
            events: EventBroadcaster::default(),
            screen: Screen::Levels,
        }
    }

    /// Creates a player from configuration.
    ///
    /// Loads the configured catalog (or the built-in one) and the saved
    /// language preference.
    ///
    /// # Errors
    ///
    /// Returns catalog loading errors; see [`Catalog::load`].
    pub fn from_config(config: &Config, timers: TimerSender) -> Result<Self> {
        let catalog = match &config.catalog {
            Some(path) => Catalog::load(path)?,
            None => Catalog::embedded()?,
        };
        let preferences = PreferenceStore::load(&config.preferences_file, config.default_language);
        Ok(Self::new(catalog, preferences, config.attempts, timers))
    }

    /// Replaces the grader used for submissions.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// The loaded catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current progress.
    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.progress
    }

    /// The active screen.
    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The level in progress, if any.
    #[must_use]
    pub fn session(&self) -> Option<&LevelSession> {
        match &self.screen {
            Screen::Lesson(session) => Some(&**session),
            _ => None,
        }
    }

    /// Interface messages in the active language.
    #[must_use]
    pub const fn localizer(&self) -> &Translations {
        &self.translations
    }

    /// The active language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.preferences.language()
    }

    /// Attempt and reveal timing in use.
    #[must_use]
    pub const fn settings(&self) -> AttemptSettings {
        self.settings
    }

    /// Subscribes to player events.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Every level with its derived lock and completion flags.
    #[must_use]
    pub fn levels(&self) -> Vec<LevelView<'_>> {
        unlock::annotate_levels(self.catalog.levels(), &self.progress)
    }

    /// Levels passing `filter`.
    #[must_use]
    pub fn levels_in(&self, filter: &CategoryFilter) -> Vec<LevelView<'_>> {
        self.levels()
            .into_iter()
            .filter(|view| filter.matches(view.level))
            .collect()
    }

    /// Share of the catalog completed, in whole percent.
    #[must_use]
    pub fn completion_percent(&self) -> u32 {
        unlock::completion_percent(&self.progress, self.catalog.len())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Enters a level at its first lesson.
    ///
    /// Any level in progress is abandoned first, with the same `back` event
    /// as [`Player::back_to_levels`]. A level without lessons shows the
    /// not-found screen instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::UnknownLevel` for an id the catalog lacks and
    /// `QuestError::LevelLocked` if a prerequisite is not completed.
    pub fn start_level(&mut self, level_id: &str) -> Result<()> {
        let level = self
            .catalog
            .level(level_id)
            .ok_or_else(|| QuestError::unknown_level(level_id))?;

        let missing = unlock::missing_prerequisites(level, &self.progress);
        if !missing.is_empty() {
            return Err(QuestError::level_locked(level_id, missing));
        }

        if let Some(left) = self.leave_screen() {
            self.events.send(PlayerEvent::back(left));
        }

        match LevelSession::start(&self.catalog, level_id, self.settings, self.timers.clone()) {
            Ok(session) => {
                let position = session.position();
                self.events
                    .send(PlayerEvent::level_started(level_id, position.total));
                self.events.send(PlayerEvent::lesson_started(
                    level_id,
                    &session.current_lesson().id,
                    0,
                    position.total,
                ));
                self.screen = Screen::Lesson(Box::new(session));
                Ok(())
            }
            Err(QuestError::ContentNotFound(details)) => {
                self.events.send(PlayerEvent::content_not_found(&details));
                self.screen = Screen::NotFound(details);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Returns to the level overview without awarding anything.
    pub fn back_to_levels(&mut self) {
        if let Some(level_id) = self.leave_screen() {
            self.events.send(PlayerEvent::back(level_id));
        }
    }

    /// Skips the remaining advance delay once the exercise is solved.
    ///
    /// Does nothing while the exercise is unsolved.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::NoActiveLesson` outside a level.
    pub fn advance_now(&mut self) -> Result<PlayerUpdate> {
        let session = self.active_session()?;
        if !session.attempts().is_completed() {
            return Ok(PlayerUpdate::Nothing);
        }
        let advance = session.advance();
        Ok(self.apply_advance(advance))
    }

    /// Applies a fired timer.
    ///
    /// Timers that no longer belong to the active lesson are ignored.
    pub fn handle_timer(&mut self, fired: &TimerFired) -> PlayerUpdate {
        let Screen::Lesson(session) = &mut self.screen else {
            tracing::debug!(timer_id = %fired.id, "Timer fired outside a level; ignored");
            return PlayerUpdate::Nothing;
        };

        match session.on_timer(fired) {
            TimerEffect::Ignored => PlayerUpdate::Nothing,
            TimerEffect::SolutionHidden => {
                let lesson_id = session.current_lesson().id.clone();
                self.events.send(PlayerEvent::solution_hidden(lesson_id));
                PlayerUpdate::SolutionHidden
            }
            TimerEffect::Advanced(advance) => self.apply_advance(advance),
        }
    }

    // ========================================================================
    // Exercise actions
    // ========================================================================

    /// Grades the code buffer of the current exercise.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::NoActiveLesson` outside a level.
    pub fn submit(&mut self) -> Result<AttemptOutcome> {
        let Screen::Lesson(session) = &mut self.screen else {
            return Err(QuestError::NoActiveLesson);
        };

        let outcome = session.submit(self.evaluator.as_ref());
        let lesson_id = &session.current_lesson().id;
        let failures = session.attempts().consecutive_failures();

        match outcome {
            AttemptOutcome::Ignored => {}
            AttemptOutcome::Passed | AttemptOutcome::Failed { .. } => {
                self.events.send(PlayerEvent::attempt_evaluated(
                    lesson_id,
                    outcome == AttemptOutcome::Passed,
                    failures,
                ));
            }
            AttemptOutcome::SolutionRevealed { attempt } => {
                self.events
                    .send(PlayerEvent::attempt_evaluated(lesson_id, false, failures));
                self.events.send(PlayerEvent::solution_revealed(
                    lesson_id,
                    attempt,
                    self.settings.reveal_window_ms,
                ));
            }
        }
        Ok(outcome)
    }

    /// Reveals the next hint of the current exercise.
    ///
    /// Returns `None` when every hint is already visible.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::NoActiveLesson` outside a level.
    pub fn request_hint(&mut self) -> Result<Option<LocalizedText>> {
        let Screen::Lesson(session) = &mut self.screen else {
            return Err(QuestError::NoActiveLesson);
        };

        let Some(hint) = session.request_hint().cloned() else {
            return Ok(None);
        };
        let hints = session.hints();
        self.events.send(PlayerEvent::hint_revealed(
            &session.current_lesson().id,
            hints.current_index().unwrap_or_default(),
            hints.total(),
        ));
        Ok(Some(hint))
    }

    /// Appends a line to the code buffer.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::NoActiveLesson` outside a level.
    pub fn edit_code(&mut self, line: &str) -> Result<()> {
        self.active_session()?.append_line(line);
        Ok(())
    }

    /// Replaces the code buffer.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::NoActiveLesson` outside a level.
    pub fn set_code(&mut self, code: impl Into<String>) -> Result<()> {
        self.active_session()?.set_code(code);
        Ok(())
    }

    /// Restores the exercise's starting code.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::NoActiveLesson` outside a level.
    pub fn reset_code(&mut self) -> Result<()> {
        self.active_session()?.reset_code();
        Ok(())
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Switches the interface language and saves the preference.
    ///
    /// The switch takes effect even if saving fails.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::PreferencesWriteError` if the preference file
    /// cannot be written.
    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.translations.set_language(language);
        let saved = self.preferences.set_language(language);
        self.events.send(PlayerEvent::language_changed(language));
        saved
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn active_session(&mut self) -> Result<&mut LevelSession> {
        match &mut self.screen {
            Screen::Lesson(session) => Ok(&mut **session),
            _ => Err(QuestError::NoActiveLesson),
        }
    }

    /// Switches to the overview, cancelling any pending timer, and returns the
    /// id of the level that was left.
    fn leave_screen(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.screen, Screen::Levels) {
            Screen::Levels => None,
            Screen::Lesson(session) => Some(session.abandon()),
            Screen::NotFound(details) => Some(details.level_id),
        }
    }

    fn apply_advance(&mut self, advance: Advance) -> PlayerUpdate {
        match advance {
            Advance::AlreadyComplete => PlayerUpdate::Nothing,
            Advance::NextLesson { index } => {
                if let Some(session) = self.session() {
                    self.events.send(PlayerEvent::lesson_started(
                        &session.level().id,
                        &session.current_lesson().id,
                        index,
                        session.position().total,
                    ));
                }
                PlayerUpdate::NextLesson { index }
            }
            Advance::LevelComplete { level_id, points } => {
                let first_completion = self.progress.record_completion(&level_id, points)
                    == CompletionOutcome::FirstCompletion;
                self.events.send(PlayerEvent::level_complete(
                    &level_id,
                    points,
                    self.progress.total_points(),
                    first_completion,
                ));
                self.screen = Screen::Levels;
                PlayerUpdate::LevelComplete {
                    level_id,
                    points,
                    first_completion,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::timer::{timer_channel, TimerReceiver};

    fn player() -> (Player, TimerReceiver) {
        let (tx, rx) = timer_channel();
        let player = Player::new(
            Catalog::embedded().unwrap(),
            PreferenceStore::in_memory(Language::En),
            AttemptSettings::default(),
            tx,
        );
        (player, rx)
    }

    fn solve_current(player: &mut Player) {
        let solution = player
            .session()
            .unwrap()
            .current_lesson()
            .exercise
            .solution
            .clone();
        player.set_code(solution).unwrap();
    }

    #[tokio::test]
    async fn test_starts_on_level_overview() {
        let (player, _rx) = player();
        assert!(matches!(player.screen(), Screen::Levels));
        assert_eq!(player.levels().len(), 9);
        assert_eq!(player.completion_percent(), 0);
    }

    #[tokio::test]
    async fn test_locked_level_is_refused() {
        let (mut player, _rx) = player();
        let err = player.start_level("react-2").unwrap_err();
        assert!(matches!(
            err,
            QuestError::LevelLocked { ref missing, .. } if missing == &vec!["react-1".to_string()]
        ));
        assert!(matches!(player.screen(), Screen::Levels));
    }

    #[tokio::test]
    async fn test_unknown_level_is_refused() {
        let (mut player, _rx) = player();
        assert!(matches!(
            player.start_level("vue-1"),
            Err(QuestError::UnknownLevel { .. })
        ));
    }

    #[tokio::test]
    async fn test_actions_need_an_active_lesson() {
        let (mut player, _rx) = player();
        assert!(matches!(player.submit(), Err(QuestError::NoActiveLesson)));
        assert!(matches!(player.request_hint(), Err(QuestError::NoActiveLesson)));
        assert!(matches!(player.edit_code("x"), Err(QuestError::NoActiveLesson)));
        assert!(matches!(player.advance_now(), Err(QuestError::NoActiveLesson)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_level_with_advance_now() {
        let (mut player, _rx) = player();
        let mut events = player.subscribe();

        player.start_level("react-1").unwrap();
        assert_eq!(player.advance_now().unwrap(), PlayerUpdate::Nothing);

        solve_current(&mut player);
        assert_eq!(player.submit().unwrap(), AttemptOutcome::Passed);
        assert_eq!(
            player.advance_now().unwrap(),
            PlayerUpdate::LevelComplete {
                level_id: "react-1".to_string(),
                points: 100,
                first_completion: true
            }
        );

        assert!(matches!(player.screen(), Screen::Levels));
        assert_eq!(player.progress().total_points(), 100);
        assert!(!player.levels()[1].locked);

        let names: Vec<&str> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|event| event.event_name())
            .collect();
        assert_eq!(
            names,
            vec!["level_started", "lesson_started", "attempt_evaluated", "level_complete"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_timer_completes_level() {
        let (mut player, mut rx) = player();
        player.start_level("typescript-1").unwrap();
        solve_current(&mut player);
        player.submit().unwrap();

        let fired = rx.recv().await.unwrap();
        assert!(matches!(
            player.handle_timer(&fired),
            PlayerUpdate::LevelComplete { first_completion: true, .. }
        ));
        assert!(player.progress().is_completed("typescript-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_timer_hides_solution() {
        let (mut player, mut rx) = player();
        player.start_level("react-1").unwrap();
        for _ in 0..3 {
            player.submit().unwrap();
        }
        assert!(player.session().unwrap().solution().is_some());

        let fired = rx.recv().await.unwrap();
        assert_eq!(player.handle_timer(&fired), PlayerUpdate::SolutionHidden);
        let session = player.session().unwrap();
        assert!(session.solution().is_none());
        assert_eq!(session.attempts().consecutive_failures(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_cancels_timers_and_awards_nothing() {
        let (mut player, mut rx) = player();
        let mut events = player.subscribe();
        player.start_level("react-1").unwrap();
        solve_current(&mut player);
        player.submit().unwrap();

        player.back_to_levels();

        assert!(matches!(player.screen(), Screen::Levels));
        assert_eq!(player.progress().total_points(), 0);
        tokio::time::advance(std::time::Duration::from_secs(10)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert!(rx.try_recv().is_err());

        let last = std::iter::from_fn(|| events.try_recv().ok()).last().unwrap();
        assert_eq!(last, PlayerEvent::back("react-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_levels_during_reveal_emits_back() {
        let (mut player, mut rx) = player();
        player.start_level("react-1").unwrap();
        for _ in 0..3 {
            player.submit().unwrap();
        }
        let mut events = player.subscribe();

        player.start_level("typescript-1").unwrap();

        tokio::time::advance(std::time::Duration::from_secs(30)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert!(rx.try_recv().is_err());

        let received: Vec<PlayerEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        let names: Vec<&str> = received.iter().map(PlayerEvent::event_name).collect();
        assert_eq!(names, vec!["back", "level_started", "lesson_started"]);
        assert_eq!(received[0], PlayerEvent::back("react-1"));
        assert_eq!(player.session().unwrap().level().id, "typescript-1");
    }

    #[tokio::test]
    async fn test_back_on_overview_emits_nothing() {
        let (mut player, _rx) = player();
        let mut events = player.subscribe();
        player.back_to_levels();
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_hint_requests_emit_events() {
        let (mut player, _rx) = player();
        let mut events = player.subscribe();
        player.start_level("react-1").unwrap();

        let first = player.request_hint().unwrap().unwrap();
        assert!(!first.is_blank());

        let hint_events: Vec<PlayerEvent> = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|event| event.event_name() == "hint_revealed")
            .collect();
        assert_eq!(hint_events.len(), 1);
    }

    #[tokio::test]
    async fn test_set_language_switches_messages() {
        let (mut player, _rx) = player();
        player.set_language(Language::Ko).unwrap();
        assert_eq!(player.language(), Language::Ko);
        assert_eq!(
            crate::i18n::Localizer::text(player.localizer(), crate::i18n::MessageKey::Hints),
            "힌트"
        );
    }
}
