//! Player events and broadcasting.
//!
//! Every state change the surrounding application may care about is published
//! as a [`PlayerEvent`] on a broadcast channel. Events are serialized as JSON
//! objects with `event` and `payload` fields.
//!
//! # Event Types
//!
//! - `level_started` / `lesson_started` - navigation into a level or lesson
//! - `attempt_evaluated` - a submission was judged
//! - `solution_revealed` / `solution_hidden` - the reveal window opened or closed
//! - `hint_revealed` - one more hint is visible
//! - `level_complete` - every lesson of a level was passed
//! - `back` - the learner abandoned a level
//! - `content_not_found` - a level has no lessons to show
//! - `language_changed` - the interface language was switched
//!
//! # Example
//!
//! ```
//! use codequest_engine::events::{EventBroadcaster, PlayerEvent};
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(16);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.send(PlayerEvent::back("react-1"));
//!
//! if let Ok(event) = receiver.recv().await {
//!     assert_eq!(event.event_name(), "back");
//! }
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::ContentNotFound;
use crate::i18n::Language;

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload for the `level_started` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStartedPayload {
    /// The level entered.
    pub level_id: String,
    /// Number of lessons in the level.
    pub lessons: usize,
    /// When the level was entered.
    pub timestamp: DateTime<Utc>,
}

/// Payload for the `lesson_started` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStartedPayload {
    /// The level the lesson belongs to.
    pub level_id: String,
    /// The lesson entered.
    pub lesson_id: String,
    /// Zero-based position within the level.
    pub index: usize,
    /// Lessons in the level.
    pub total: usize,
}

/// Payload for the `attempt_evaluated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptEvaluatedPayload {
    /// The lesson whose exercise was attempted.
    pub lesson_id: String,
    /// Whether the submission matched the solution.
    pub passed: bool,
    /// Consecutive failures after this attempt.
    pub consecutive_failures: u32,
}

/// Payload for the `solution_revealed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionRevealedPayload {
    /// The lesson whose solution is shown.
    pub lesson_id: String,
    /// Failed attempts that triggered the reveal.
    pub attempts: u32,
    /// How long the solution stays visible, in milliseconds.
    pub window_ms: u64,
}

/// Payload for the `solution_hidden` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionHiddenPayload {
    /// The lesson whose solution was hidden again.
    pub lesson_id: String,
}

/// Payload for the `hint_revealed` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintRevealedPayload {
    /// The lesson the hint belongs to.
    pub lesson_id: String,
    /// Zero-based index of the hint now visible.
    pub index: usize,
    /// Hints available for the exercise.
    pub total: usize,
}

/// Payload for the `level_complete` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCompletePayload {
    /// The completed level.
    pub level_id: String,
    /// The level's point value.
    pub points: u32,
    /// Total points after this completion.
    pub total_points: u64,
    /// `false` when the level had been completed before and no points were added.
    pub first_completion: bool,
}

/// Payload for the `back` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackPayload {
    /// The level that was left.
    pub level_id: String,
}

/// Payload for the `content_not_found` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNotFoundPayload {
    /// The level that was requested.
    pub level_id: String,
    /// The lesson index that was requested.
    pub lesson_index: usize,
    /// Level ids that do have lessons.
    pub available_ids: Vec<String>,
}

/// Payload for the `language_changed` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageChangedPayload {
    /// The new interface language.
    pub language: Language,
}

// ============================================================================
// Player Events
// ============================================================================

/// Events published by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// A level was entered.
    LevelStarted(LevelStartedPayload),
    /// A lesson was entered.
    LessonStarted(LessonStartedPayload),
    /// A submission was judged.
    AttemptEvaluated(AttemptEvaluatedPayload),
    /// The reference solution became visible.
    SolutionRevealed(SolutionRevealedPayload),
    /// The reference solution was hidden again.
    SolutionHidden(SolutionHiddenPayload),
    /// One more hint became visible.
    HintRevealed(HintRevealedPayload),
    /// Every lesson of a level was passed.
    LevelComplete(LevelCompletePayload),
    /// The learner returned to the level overview.
    Back(BackPayload),
    /// A level had no lessons to show.
    ContentNotFound(ContentNotFoundPayload),
    /// The interface language changed.
    LanguageChanged(LanguageChangedPayload),
}

impl PlayerEvent {
    /// Creates a `LevelStarted` event.
    #[must_use]
    pub fn level_started(level_id: impl Into<String>, lessons: usize) -> Self {
        Self::LevelStarted(LevelStartedPayload {
            level_id: level_id.into(),
            lessons,
            timestamp: Utc::now(),
        })
    }

    /// Creates a `LessonStarted` event.
    #[must_use]
    pub fn lesson_started(
        level_id: impl Into<String>,
        lesson_id: impl Into<String>,
        index: usize,
        total: usize,
    ) -> Self {
        Self::LessonStarted(LessonStartedPayload {
            level_id: level_id.into(),
            lesson_id: lesson_id.into(),
            index,
            total,
        })
    }

    /// Creates an `AttemptEvaluated` event.
    #[must_use]
    pub fn attempt_evaluated(
        lesson_id: impl Into<String>,
        passed: bool,
        consecutive_failures: u32,
    ) -> Self {
        Self::AttemptEvaluated(AttemptEvaluatedPayload {
            lesson_id: lesson_id.into(),
            passed,
            consecutive_failures,
        })
    }

    /// Creates a `SolutionRevealed` event.
    #[must_use]
    pub fn solution_revealed(lesson_id: impl Into<String>, attempts: u32, window_ms: u64) -> Self {
        Self::SolutionRevealed(SolutionRevealedPayload {
            lesson_id: lesson_id.into(),
            attempts,
            window_ms,
        })
    }

    /// Creates a `SolutionHidden` event.
    #[must_use]
    pub fn solution_hidden(lesson_id: impl Into<String>) -> Self {
        Self::SolutionHidden(SolutionHiddenPayload {
            lesson_id: lesson_id.into(),
        })
    }

    /// Creates a `HintRevealed` event.
    #[must_use]
    pub fn hint_revealed(lesson_id: impl Into<String>, index: usize, total: usize) -> Self {
        Self::HintRevealed(HintRevealedPayload {
            lesson_id: lesson_id.into(),
            index,
            total,
        })
    }

    /// Creates a `LevelComplete` event.
    #[must_use]
    pub fn level_complete(
        level_id: impl Into<String>,
        points: u32,
        total_points: u64,
        first_completion: bool,
    ) -> Self {
        Self::LevelComplete(LevelCompletePayload {
            level_id: level_id.into(),
            points,
            total_points,
            first_completion,
        })
    }

    /// Creates a `Back` event for leaving `level_id`.
    #[must_use]
    pub fn back(level_id: impl Into<String>) -> Self {
        Self::Back(BackPayload {
            level_id: level_id.into(),
        })
    }

    /// Creates a `ContentNotFound` event from the error details.
    #[must_use]
    pub fn content_not_found(details: &ContentNotFound) -> Self {
        Self::ContentNotFound(ContentNotFoundPayload {
            level_id: details.level_id.clone(),
            lesson_index: details.lesson_index,
            available_ids: details.available_ids.clone(),
        })
    }

    /// Creates a `LanguageChanged` event.
    #[must_use]
    pub const fn language_changed(language: Language) -> Self {
        Self::LanguageChanged(LanguageChangedPayload { language })
    }

    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::LevelStarted(_) => "level_started",
            Self::LessonStarted(_) => "lesson_started",
            Self::AttemptEvaluated(_) => "attempt_evaluated",
            Self::SolutionRevealed(_) => "solution_revealed",
            Self::SolutionHidden(_) => "solution_hidden",
            Self::HintRevealed(_) => "hint_revealed",
            Self::LevelComplete(_) => "level_complete",
            Self::Back(_) => "back",
            Self::ContentNotFound(_) => "content_not_found",
            Self::LanguageChanged(_) => "language_changed",
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Broadcasts player events to every subscriber.
///
/// Events are not kept for subscribers that join later.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster whose subscribers buffer up to `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new subscriber.
    ///
    /// A subscriber that falls behind receives a `Lagged` error and misses
    /// the oldest events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event and returns how many subscribers will see it.
    pub fn send(&self, event: PlayerEvent) -> usize {
        tracing::trace!(event = event.event_name(), "Publishing event");
        // Err only means nobody is subscribed.
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
