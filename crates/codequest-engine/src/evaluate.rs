//! Pass/fail judgement of a submission against a reference solution.

use crate::normalize::normalize;

/// Decides whether a submission solves an exercise.
///
/// Implementations must be pure and total: the same inputs always give the
/// same verdict and no input is an error.
pub trait Evaluator: Send + Sync {
    /// Returns `true` if `submission` is accepted for `reference`.
    fn evaluate(&self, submission: &str, reference: &str) -> bool;
}

/// Strict comparison of normalized text.
///
/// Formatting differences are forgiven; anything else (a renamed identifier,
/// a reordered statement, an equivalent but different expression) fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizedMatch;

impl Evaluator for NormalizedMatch {
    fn evaluate(&self, submission: &str, reference: &str) -> bool {
        evaluate(submission, reference)
    }
}

/// Compares `submission` to `reference` after normalizing both.
///
/// # Examples
///
/// ```
/// use codequest_engine::evaluate;
///
/// assert!(evaluate(
///     "function A(){return <h1>Hi</h1>}",
///     "function A() { return <h1>Hi</h1> }",
/// ));
/// assert!(!evaluate("function A() {\n\n}", "function A() { return <h1>Hi</h1> }"));
/// ```
#[must_use]
pub fn evaluate(submission: &str, reference: &str) -> bool {
    normalize(submission) == normalize(reference)
}
