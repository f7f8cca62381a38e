//! Attempt tracking and timed solution reveal for a single exercise.
//!
//! The controller never evaluates code itself; it is told whether each
//! submission passed and decides what happens next:
//!
//! - `Active` -> pass -> `Completed` (advance timer scheduled)
//! - `Active` -> fail below the threshold -> `Active` ("attempt N")
//! - `Active` -> fail at the threshold -> `RevealWindow` (reveal timer scheduled)
//! - `RevealWindow` -> reveal timer fires -> `Active` with the counter reset
//!
//! At most one timer is pending at any time. Scheduling a new one drops (and
//! thereby aborts) the previous one, and fired messages whose id does not
//! match the pending timer are ignored.

use serde::{Deserialize, Serialize};

use crate::config::AttemptSettings;
use crate::i18n::{Localizer, MessageKey};
use crate::timer::{PendingTimer, TimerFired, TimerId, TimerKind, TimerSender};

// ============================================================================
// Phase and messages
// ============================================================================

/// Where the exercise stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptPhase {
    /// Accepting submissions.
    #[default]
    Active,
    /// Solution is visible; submissions are still accepted.
    RevealWindow,
    /// Solved; further submissions are ignored.
    Completed,
}

impl AttemptPhase {
    /// Returns `true` if submissions are evaluated in this phase.
    #[must_use]
    pub const fn accepts_submissions(&self) -> bool {
        matches!(self, Self::Active | Self::RevealWindow)
    }
}

/// The status line shown under the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusMessage {
    /// The submission was correct.
    Passed,
    /// A failed attempt below the reveal threshold.
    AttemptFailed {
        /// Consecutive failures so far.
        attempt: u32,
    },
    /// The threshold was reached and the solution is shown.
    SolutionShown {
        /// Consecutive failures so far.
        attempts: u32,
        /// How long the solution stays visible.
        seconds: u64,
    },
    /// The reveal window closed.
    NotQuiteRight,
}

impl StatusMessage {
    /// Returns `true` for the success message.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Renders the message in the localizer's language.
    #[must_use]
    pub fn render<L: Localizer + ?Sized>(&self, localizer: &L) -> String {
        match *self {
            Self::Passed => localizer.text(MessageKey::Excellent).to_string(),
            Self::AttemptFailed { attempt } => {
                localizer.format(MessageKey::AttemptFailed, &[("attempt", &attempt)])
            }
            Self::SolutionShown { attempts, seconds } => localizer.format(
                MessageKey::SolutionShown,
                &[("attempts", &attempts), ("seconds", &seconds)],
            ),
            Self::NotQuiteRight => localizer.text(MessageKey::NotQuiteRight).to_string(),
        }
    }
}

/// Result of recording a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Correct; the exercise is completed.
    Passed,
    /// Wrong, below the reveal threshold.
    Failed {
        /// Consecutive failures so far.
        attempt: u32,
    },
    /// Wrong, and the solution is now visible.
    SolutionRevealed {
        /// Consecutive failures so far.
        attempt: u32,
    },
    /// The exercise was already completed; nothing changed.
    Ignored,
}

/// Result of delivering a fired timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    /// The reveal window closed and the solution is hidden again.
    SolutionHidden,
    /// The pause after a correct submission is over.
    AdvanceDue,
    /// The timer was cancelled or replaced; nothing changed.
    Stale,
}

// ============================================================================
// Controller
// ============================================================================

/// Per-exercise attempt state.
#[derive(Debug)]
pub struct AttemptController {
    settings: AttemptSettings,
    timers: TimerSender,
    phase: AttemptPhase,
    failures: u32,
    message: Option<StatusMessage>,
    pending: Option<PendingTimer>,
}

impl AttemptController {
    /// Creates a fresh controller: no failures, nothing revealed, no timer.
    #[must_use]
    pub const fn new(settings: AttemptSettings, timers: TimerSender) -> Self {
        Self {
            settings,
            timers,
            phase: AttemptPhase::Active,
            failures: 0,
            message: None,
            pending: None,
        }
    }

    /// Records the verdict for one submission.
    ///
    /// Schedules a timer when the exercise is solved or the solution is
    /// revealed, so it must run inside a tokio runtime.
    pub fn record(&mut self, passed: bool) -> AttemptOutcome {
        if !self.phase.accepts_submissions() {
            return AttemptOutcome::Ignored;
        }

        if passed {
            self.failures = 0;
            self.phase = AttemptPhase::Completed;
            self.message = Some(StatusMessage::Passed);
            self.schedule(TimerKind::Advance);
            return AttemptOutcome::Passed;
        }

        self.failures = self.failures.saturating_add(1);
        let attempt = self.failures;

        if attempt >= self.settings.max_failures {
            self.phase = AttemptPhase::RevealWindow;
            self.message = Some(StatusMessage::SolutionShown {
                attempts: attempt,
                seconds: self.settings.reveal_window_secs(),
            });
            self.schedule(TimerKind::RevealExpired);
            tracing::debug!(attempt, "Solution revealed");
            AttemptOutcome::SolutionRevealed { attempt }
        } else {
            self.message = Some(StatusMessage::AttemptFailed { attempt });
            AttemptOutcome::Failed { attempt }
        }
    }

    /// Applies a fired timer.
    ///
    /// Messages from timers that were cancelled or replaced are ignored.
    pub fn on_timer(&mut self, fired: &TimerFired) -> TimerOutcome {
        if !self.pending.as_ref().is_some_and(|pending| pending.matches(fired)) {
            tracing::debug!(timer_id = %fired.id, "Ignoring stale timer");
            return TimerOutcome::Stale;
        }
        self.pending = None;

        match fired.kind {
            TimerKind::RevealExpired => {
                self.phase = AttemptPhase::Active;
                self.failures = 0;
                self.message = Some(StatusMessage::NotQuiteRight);
                TimerOutcome::SolutionHidden
            }
            TimerKind::Advance => TimerOutcome::AdvanceDue,
        }
    }

    /// Cancels the pending timer, if any.
    pub fn cancel_timer(&mut self) {
        self.pending = None;
    }

    fn schedule(&mut self, kind: TimerKind) {
        let delay = match kind {
            TimerKind::RevealExpired => self.settings.reveal_window(),
            TimerKind::Advance => self.settings.advance_delay(),
        };
        // Replacing the pending timer drops and aborts the old one.
        self.pending = Some(PendingTimer::schedule(kind, delay, &self.timers));
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> AttemptPhase {
        self.phase
    }

    /// Consecutive failed submissions.
    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Returns `true` while the reference solution is shown.
    #[must_use]
    pub fn solution_visible(&self) -> bool {
        self.phase == AttemptPhase::RevealWindow
    }

    /// Returns `true` once the exercise is solved.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == AttemptPhase::Completed
    }

    /// The current status line, if any.
    #[must_use]
    pub const fn status_message(&self) -> Option<StatusMessage> {
        self.message
    }

    /// Id and purpose of the pending timer.
    #[must_use]
    pub fn pending_timer(&self) -> Option<(TimerId, TimerKind)> {
        self.pending
            .as_ref()
            .map(|pending| (pending.id(), pending.kind()))
    }
}
