//! Lock state of levels, derived from prerequisites and progress.
//!
//! Nothing here is stored. Every view is recomputed from the catalog and the
//! current [`Progress`], so lock state cannot drift from what was completed.

use serde::Serialize;

use crate::catalog::Level;
use crate::progress::Progress;

/// Returns `true` if some prerequisite of `level` is not completed.
///
/// Levels without prerequisites are never locked. A prerequisite that names
/// no level can never be satisfied, so such a level stays locked.
#[must_use]
pub fn is_locked(level: &Level, progress: &Progress) -> bool {
    !level
        .prerequisites
        .iter()
        .all(|prerequisite| progress.is_completed(prerequisite))
}

/// Prerequisites of `level` that are not completed yet, in declared order.
#[must_use]
pub fn missing_prerequisites(level: &Level, progress: &Progress) -> Vec<String> {
    level
        .prerequisites
        .iter()
        .filter(|prerequisite| !progress.is_completed(prerequisite))
        .cloned()
        .collect()
}

/// A level annotated with its derived flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelView<'a> {
    /// The catalog entry.
    #[serde(flatten)]
    pub level: &'a Level,
    /// Some prerequisite is not completed.
    pub locked: bool,
    /// The level itself is completed.
    pub completed: bool,
}

/// Annotates every level with `locked` and `completed`, in catalog order.
#[must_use]
pub fn annotate_levels<'a>(levels: &'a [Level], progress: &Progress) -> Vec<LevelView<'a>> {
    levels
        .iter()
        .map(|level| LevelView {
            level,
            locked: is_locked(level, progress),
            completed: progress.is_completed(&level.id),
        })
        .collect()
}

/// Which categories the level overview shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every level.
    #[default]
    All,
    /// Levels tagged with this category (case-insensitive).
    Category(String),
}

impl CategoryFilter {
    /// Parses a filter argument; `all` or an empty string selects everything.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Category(value.to_ascii_lowercase())
        }
    }

    /// Returns `true` if `level` passes the filter.
    #[must_use]
    pub fn matches(&self, level: &Level) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => level.category.eq_ignore_ascii_case(category),
        }
    }
}

/// Share of the catalog completed, rounded to a whole percent.
///
/// Returns 0 for an empty catalog.
#[must_use]
pub fn completion_percent(progress: &Progress, level_count: usize) -> u32 {
    if level_count == 0 {
        return 0;
    }
    let completed = u64::from(progress.completed_levels());
    let total = level_count as u64;
    let percent = (completed * 100 + total / 2) / total;
    u32::try_from(percent.min(100)).unwrap_or(100)
}
