//! Step-by-step disclosure of an exercise's hints.

use crate::i18n::LocalizedText;

/// Reveals hints one at a time, never going back.
///
/// Nothing is visible until the first request; each request shows one more
/// hint until all are visible, after which requests are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintRevealer {
    hints: Vec<LocalizedText>,
    shown: Option<usize>,
}

impl HintRevealer {
    /// Creates a revealer with nothing shown.
    #[must_use]
    pub const fn new(hints: Vec<LocalizedText>) -> Self {
        Self { hints, shown: None }
    }

    /// Reveals the next hint and returns it.
    ///
    /// Returns `None` when every hint is already visible (or there are none).
    pub fn request_next_hint(&mut self) -> Option<&LocalizedText> {
        let next = self.shown.map_or(0, |index| index + 1);
        if next >= self.hints.len() {
            return None;
        }
        self.shown = Some(next);
        self.hints.get(next)
    }

    /// Hints revealed so far, in order.
    #[must_use]
    pub fn visible_hints(&self) -> &[LocalizedText] {
        self.shown
            .map_or(&[][..], |index| &self.hints[..=index])
    }

    /// Index of the last revealed hint.
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        self.shown
    }

    /// Total number of hints.
    #[must_use]
    pub fn total(&self) -> usize {
        self.hints.len()
    }

    /// Returns `true` once every hint is visible.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.visible_hints().len() == self.hints.len()
    }
}
