//! Walking through the lessons of one level.
//!
//! A [`LevelSession`] owns everything transient about the level being
//! played: the lesson index, the learner's code buffer, the attempt
//! controller, and the hint revealer. Moving to another lesson rebuilds the
//! per-lesson parts from scratch, which also cancels any pending timer.

use crate::attempt::{AttemptController, AttemptOutcome, StatusMessage, TimerOutcome};
use crate::catalog::{Catalog, Lesson, Level};
use crate::config::AttemptSettings;
use crate::error::{ContentNotFound, QuestError, Result};
use crate::evaluate::Evaluator;
use crate::hints::HintRevealer;
use crate::i18n::LocalizedText;
use crate::timer::{TimerFired, TimerSender};

/// Result of moving past the current lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the lesson at `index`.
    NextLesson {
        /// Zero-based index of the new lesson.
        index: usize,
    },
    /// The last lesson was finished. Reported once per session.
    LevelComplete {
        /// The completed level.
        level_id: String,
        /// The level's point value.
        points: u32,
    },
    /// The level was already completed; nothing changed.
    AlreadyComplete,
}

/// What a fired timer did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEffect {
    /// The revealed solution was hidden again.
    SolutionHidden,
    /// The session advanced after a correct submission.
    Advanced(Advance),
    /// The timer belonged to an earlier lesson or was cancelled.
    Ignored,
}

/// "Lesson i of n" for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonPosition {
    /// One-based lesson number.
    pub number: usize,
    /// Lessons in the level.
    pub total: usize,
}

impl LessonPosition {
    /// Share of the level reached, rounded to a whole percent.
    #[must_use]
    pub const fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        (self.number * 100 + self.total / 2) / self.total
    }
}

/// An in-progress level.
#[derive(Debug)]
pub struct LevelSession {
    level: Level,
    lessons: Vec<Lesson>,
    index: usize,
    code: String,
    attempts: AttemptController,
    hints: HintRevealer,
    settings: AttemptSettings,
    timers: TimerSender,
    finished: bool,
    available_ids: Vec<String>,
}

impl LevelSession {
    /// Starts `level_id` at its first lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::UnknownLevel` if the catalog has no such level and
    /// `QuestError::ContentNotFound` if the level has no lessons.
    pub fn start(
        catalog: &Catalog,
        level_id: &str,
        settings: AttemptSettings,
        timers: TimerSender,
    ) -> Result<Self> {
        let level = catalog
            .level(level_id)
            .ok_or_else(|| QuestError::unknown_level(level_id))?;

        let lessons = catalog.lessons_for(level_id).unwrap_or_default();
        let Some(first) = lessons.first() else {
            tracing::warn!(level_id = %level_id, "Level has no lessons");
            return Err(QuestError::ContentNotFound(ContentNotFound {
                level_id: level_id.to_string(),
                lesson_index: 0,
                lessons_found: lessons.len(),
                available_ids: catalog.lesson_keys(),
            }));
        };

        tracing::info!(level_id = %level_id, lessons = lessons.len(), "Level started");
        Ok(Self {
            level: level.clone(),
            code: first.exercise.initial_code.clone(),
            hints: HintRevealer::new(first.exercise.hints.clone()),
            attempts: AttemptController::new(settings, timers.clone()),
            lessons: lessons.to_vec(),
            index: 0,
            settings,
            timers,
            finished: false,
            available_ids: catalog.lesson_keys(),
        })
    }

    // ------------------------------------------------------------------------
    // Lesson access
    // ------------------------------------------------------------------------

    /// The level being played.
    #[must_use]
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Zero-based index of the current lesson.
    #[must_use]
    pub const fn lesson_index(&self) -> usize {
        self.index
    }

    /// The current lesson.
    #[must_use]
    pub fn current_lesson(&self) -> &Lesson {
        &self.lessons[self.index]
    }

    /// Looks up a lesson of this level by index.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::ContentNotFound` if `index` is out of range.
    pub fn lesson(&self, index: usize) -> Result<&Lesson> {
        self.lessons.get(index).ok_or_else(|| {
            QuestError::ContentNotFound(ContentNotFound {
                level_id: self.level.id.clone(),
                lesson_index: index,
                lessons_found: self.lessons.len(),
                available_ids: self.available_ids.clone(),
            })
        })
    }

    /// Position of the current lesson within the level.
    #[must_use]
    pub fn position(&self) -> LessonPosition {
        LessonPosition {
            number: self.index + 1,
            total: self.lessons.len(),
        }
    }

    /// Returns `true` once the level-complete signal has been emitted.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    // ------------------------------------------------------------------------
    // Code buffer
    // ------------------------------------------------------------------------

    /// The learner's current code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replaces the learner's code.
    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    /// Appends one line to the learner's code.
    pub fn append_line(&mut self, line: &str) {
        if !self.code.is_empty() && !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code.push_str(line);
    }

    /// Restores the exercise's starting code.
    pub fn reset_code(&mut self) {
        self.code.clone_from(&self.lessons[self.index].exercise.initial_code);
    }

    // ------------------------------------------------------------------------
    // Exercise actions
    // ------------------------------------------------------------------------

    /// Evaluates the code buffer against the current exercise.
    pub fn submit(&mut self, evaluator: &dyn Evaluator) -> AttemptOutcome {
        if self.finished {
            return AttemptOutcome::Ignored;
        }

        let lesson = &self.lessons[self.index];
        let passed = evaluator.evaluate(&self.code, &lesson.exercise.solution);
        let outcome = self.attempts.record(passed);
        tracing::debug!(
            level_id = %self.level.id,
            lesson_id = %lesson.id,
            passed,
            ?outcome,
            "Submission evaluated"
        );
        outcome
    }

    /// Reveals the next hint of the current exercise.
    pub fn request_hint(&mut self) -> Option<&LocalizedText> {
        self.hints.request_next_hint()
    }

    /// Hints revealed so far.
    #[must_use]
    pub fn visible_hints(&self) -> &[LocalizedText] {
        self.hints.visible_hints()
    }

    /// The hint revealer of the current exercise.
    #[must_use]
    pub const fn hints(&self) -> &HintRevealer {
        &self.hints
    }

    /// The reference solution, while the reveal window is open.
    #[must_use]
    pub fn solution(&self) -> Option<&str> {
        self.attempts
            .solution_visible()
            .then(|| self.current_lesson().exercise.solution.as_str())
    }

    /// The attempt state of the current exercise.
    #[must_use]
    pub const fn attempts(&self) -> &AttemptController {
        &self.attempts
    }

    /// The current status line.
    #[must_use]
    pub const fn status_message(&self) -> Option<StatusMessage> {
        self.attempts.status_message()
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Moves past the current lesson.
    ///
    /// Resets attempt and hint state for the next lesson, or reports level
    /// completion after the last one. Completion is reported exactly once.
    pub fn advance(&mut self) -> Advance {
        if self.finished {
            return Advance::AlreadyComplete;
        }

        let next = self.index + 1;
        if next < self.lessons.len() {
            self.index = next;
            self.enter_lesson();
            tracing::debug!(
                level_id = %self.level.id,
                lesson_id = %self.current_lesson().id,
                index = next,
                "Next lesson"
            );
            return Advance::NextLesson { index: next };
        }

        self.finished = true;
        self.attempts.cancel_timer();
        Advance::LevelComplete {
            level_id: self.level.id.clone(),
            points: self.level.points,
        }
    }

    /// Applies a fired timer.
    pub fn on_timer(&mut self, fired: &TimerFired) -> TimerEffect {
        match self.attempts.on_timer(fired) {
            TimerOutcome::Stale => TimerEffect::Ignored,
            TimerOutcome::SolutionHidden => TimerEffect::SolutionHidden,
            TimerOutcome::AdvanceDue => TimerEffect::Advanced(self.advance()),
        }
    }

    /// Gives up the level without credit and returns its id.
    ///
    /// Any pending timer is cancelled before this returns.
    pub fn abandon(mut self) -> String {
        self.attempts.cancel_timer();
        tracing::info!(
            level_id = %self.level.id,
            lesson_index = self.index,
            "Level abandoned"
        );
        self.level.id
    }

    fn enter_lesson(&mut self) {
        let exercise = &self.lessons[self.index].exercise;
        self.code.clone_from(&exercise.initial_code);
        self.hints = HintRevealer::new(exercise.hints.clone());
        // Dropping the old controller aborts its pending timer.
        self.attempts = AttemptController::new(self.settings, self.timers.clone());
    }
}
