//! CodeQuest Engine
//!
//! Lesson progression and exercise evaluation: normalizes and grades learner
//! code, runs the attempt/hint/reveal protocol of each exercise, walks the
//! lessons of a level, and unlocks levels as progress grows.

pub mod attempt;
pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod events;
pub mod hints;
pub mod i18n;
pub mod normalize;
pub mod player;
pub mod preferences;
pub mod preview;
pub mod progress;
pub mod sequencer;
pub mod timer;
pub mod unlock;

pub use attempt::{AttemptController, AttemptOutcome, AttemptPhase, StatusMessage};
pub use catalog::{Catalog, Difficulty, Exercise, Lesson, Level, MAX_CATALOG_SIZE};
pub use config::{AttemptSettings, Config};
pub use error::{ContentNotFound, QuestError, Result};
pub use evaluate::{evaluate, Evaluator, NormalizedMatch};
pub use events::{EventBroadcaster, PlayerEvent};
pub use hints::HintRevealer;
pub use i18n::{Language, LocalizedText, Localizer, MessageKey, Translations};
pub use normalize::normalize;
pub use player::{Player, PlayerUpdate, Screen};
pub use preferences::PreferenceStore;
pub use preview::{render_preview, Preview};
pub use progress::{CompletionOutcome, Progress};
pub use sequencer::{Advance, LessonPosition, LevelSession, TimerEffect};
pub use timer::{timer_channel, TimerFired, TimerId, TimerKind, TimerReceiver, TimerSender};
pub use unlock::{annotate_levels, is_locked, CategoryFilter, LevelView};
