//! Canonical form of learner source text.
//!
//! Normalization is purely lexical: it does not parse the code, it only
//! removes formatting differences so that `function A(){}` and
//! `function A () { }` compare equal.

use once_cell::sync::Lazy;
use regex::Regex;

/// Runs of whitespace of any kind.
#[allow(clippy::expect_used)]
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A bracket character with the whitespace hugging it on either side.
#[allow(clippy::expect_used)]
static BRACKET_PADDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([{}()<>])\s*").expect("bracket pattern is valid"));

/// Returns the canonical form of `text`.
///
/// Applied in order:
/// 1. every run of whitespace collapses to a single space
/// 2. whitespace directly before or after `{ } ( ) < >` is removed
/// 3. leading and trailing whitespace is trimmed
///
/// The result is a fixed point: normalizing it again changes nothing.
///
/// # Examples
///
/// ```
/// use codequest_engine::normalize;
///
/// assert_eq!(normalize("function A() {\n  return 1;\n}"), "function A(){return 1;}");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let tightened = BRACKET_PADDING.replace_all(&collapsed, "$1");
    tightened.trim().to_string()
}
