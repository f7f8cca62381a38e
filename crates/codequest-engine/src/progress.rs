//! Learner progress across the session.
//!
//! Progress only ever grows: points are added, level ids are appended, and
//! nothing is removed. Replaying a level that is already completed leaves the
//! record untouched, so the completed count always equals the number of
//! distinct completed levels.

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// What a completion did to the progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// First completion; points were awarded.
    FirstCompletion,
    /// The level was already completed; nothing changed.
    Replay,
}

/// Accumulated score and completed levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    total_points: u64,
    completed_levels: u32,
    completed_level_ids: IndexSet<String>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Creates an empty progress record.
    ///
    /// # Examples
    ///
    /// ```
    /// use codequest_engine::Progress;
    ///
    /// let progress = Progress::new();
    /// assert_eq!(progress.total_points(), 0);
    /// assert_eq!(progress.completed_levels(), 0);
    /// assert!(progress.completed_level_ids().is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            total_points: 0,
            completed_levels: 0,
            completed_level_ids: IndexSet::new(),
            started_at: now,
            updated_at: now,
        }
    }

    /// Records that `level_id` was completed, worth `points`.
    ///
    /// Points and the count change only on the first completion of a level.
    pub fn record_completion(&mut self, level_id: &str, points: u32) -> CompletionOutcome {
        if self.completed_level_ids.contains(level_id) {
            tracing::debug!(level_id = %level_id, "Level replayed; progress unchanged");
            return CompletionOutcome::Replay;
        }

        self.completed_level_ids.insert(level_id.to_string());
        self.total_points = self.total_points.saturating_add(u64::from(points));
        self.completed_levels = self.completed_levels.saturating_add(1);
        self.touch();

        tracing::info!(
            level_id = %level_id,
            points,
            total_points = self.total_points,
            "Level completed"
        );
        CompletionOutcome::FirstCompletion
    }

    /// Total points earned.
    #[must_use]
    pub const fn total_points(&self) -> u64 {
        self.total_points
    }

    /// Number of distinct levels completed.
    #[must_use]
    pub const fn completed_levels(&self) -> u32 {
        self.completed_levels
    }

    /// Completed level ids in completion order.
    #[must_use]
    pub const fn completed_level_ids(&self) -> &IndexSet<String> {
        &self.completed_level_ids
    }

    /// Returns `true` if `level_id` has been completed.
    #[must_use]
    pub fn is_completed(&self, level_id: &str) -> bool {
        self.completed_level_ids.contains(level_id)
    }

    /// When the session started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When progress last changed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
