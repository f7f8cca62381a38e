//! Error types for the CodeQuest engine.
//!
//! This module defines the error hierarchy for all engine operations,
//! including configuration loading, catalog parsing, preference persistence,
//! and the recoverable conditions a learner can hit while navigating levels.

use std::path::PathBuf;

/// A specialized `Result` type for CodeQuest engine operations.
pub type Result<T> = std::result::Result<T, QuestError>;

/// Diagnostics attached to a missing level or lesson.
///
/// Absence of authored lessons is an expected condition (a level listed in
/// the catalog without content yet), so this carries enough context to show
/// a helpful "not found" screen instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNotFound {
    /// The level that was requested.
    pub level_id: String,
    /// The lesson index that was requested.
    pub lesson_index: usize,
    /// How many lessons the catalog holds for the level.
    pub lessons_found: usize,
    /// Level ids that do have lessons in the catalog.
    pub available_ids: Vec<String>,
}

impl std::fmt::Display for ContentNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "level '{}' lesson {} (lessons found: {}, available: [{}])",
            self.level_id,
            self.lesson_index,
            self.lessons_found,
            self.available_ids.join(", ")
        )
    }
}

/// Errors that can occur while running CodeQuest.
///
/// Error variants are organized by subsystem and include actionable suggestions
/// where possible to help users resolve issues.
#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your codequest.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Catalog Errors
    // ========================================================================
    /// Catalog file was not found at the specified path.
    #[error("Catalog not found: '{path}'\n\nSuggestion: Check the 'catalog' field in codequest.json or remove it to use the built-in levels")]
    CatalogNotFound {
        /// Path where the catalog was expected.
        path: PathBuf,
    },

    /// Catalog file exceeds the 1MB size limit.
    #[error("Catalog exceeds size limit (1024KB): '{path}' is {size_kb}KB\n\nSuggestion: Split the curriculum into smaller catalogs")]
    CatalogTooLarge {
        /// Path to the oversized catalog.
        path: PathBuf,
        /// Actual size in kilobytes.
        size_kb: u64,
    },

    /// Catalog file contains non-UTF-8 content.
    #[error("Catalog has invalid encoding: '{path}'\n\nSuggestion: Convert the file to UTF-8 encoding")]
    CatalogEncodingError {
        /// Path to the catalog with encoding issues.
        path: PathBuf,
    },

    /// Catalog YAML could not be parsed.
    #[error("Invalid YAML in catalog '{source_name}': {message}\n\nSuggestion: Check indentation and quoting in the catalog file")]
    CatalogParseError {
        /// File path or name of the embedded catalog.
        source_name: String,
        /// Description of the parse error.
        message: String,
    },

    /// Catalog parsed but violates a content rule.
    #[error("Invalid catalog: {message}\n\nSuggestion: {suggestion}")]
    CatalogValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the author.
        suggestion: String,
    },

    // ========================================================================
    // Navigation Errors
    // ========================================================================
    /// No level with the given id exists in the catalog.
    #[error("Unknown level: '{level_id}'\n\nSuggestion: Run 'list' to see the available level ids")]
    UnknownLevel {
        /// The id that was requested.
        level_id: String,
    },

    /// The level still has unmet prerequisites.
    #[error("Level '{level_id}' is locked: complete {} first", .missing.join(", "))]
    LevelLocked {
        /// The locked level.
        level_id: String,
        /// Prerequisites not yet completed.
        missing: Vec<String>,
    },

    /// An action that needs an open lesson was issued from another screen.
    #[error("No lesson is active\n\nSuggestion: Start a level first")]
    NoActiveLesson,

    /// Requested level or lesson has no authored content.
    #[error("Content not found: {0}")]
    ContentNotFound(ContentNotFound),

    // ========================================================================
    // Preference Errors
    // ========================================================================
    /// Failed to write the preference file.
    #[error("Failed to save preferences to '{path}': {message}\n\nSuggestion: Check write permissions for the preferences directory")]
    PreferencesWriteError {
        /// Path where the preferences were to be written.
        path: PathBuf,
        /// Description of the write failure.
        message: String,
    },

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuestError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `CatalogNotFound` error.
    #[must_use]
    pub fn catalog_not_found(path: impl Into<PathBuf>) -> Self {
        Self::CatalogNotFound { path: path.into() }
    }

    /// Creates a new `CatalogTooLarge` error.
    #[must_use]
    pub fn catalog_too_large(path: impl Into<PathBuf>, size_kb: u64) -> Self {
        Self::CatalogTooLarge {
            path: path.into(),
            size_kb,
        }
    }

    /// Creates a new `CatalogEncodingError`.
    #[must_use]
    pub fn catalog_encoding(path: impl Into<PathBuf>) -> Self {
        Self::CatalogEncodingError { path: path.into() }
    }

    /// Creates a new `CatalogParseError`.
    #[must_use]
    pub fn catalog_parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CatalogParseError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new `CatalogValidationError`.
    #[must_use]
    pub fn catalog_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::CatalogValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `UnknownLevel` error.
    #[must_use]
    pub fn unknown_level(level_id: impl Into<String>) -> Self {
        Self::UnknownLevel {
            level_id: level_id.into(),
        }
    }

    /// Creates a new `LevelLocked` error.
    #[must_use]
    pub fn level_locked(level_id: impl Into<String>, missing: Vec<String>) -> Self {
        Self::LevelLocked {
            level_id: level_id.into(),
            missing,
        }
    }

    /// Creates a new `PreferencesWriteError`.
    #[must_use]
    pub fn preferences_write(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PreferencesWriteError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the learner can keep playing after this error.
    ///
    /// Navigation mistakes and preference write failures leave the session
    /// intact; load failures at startup do not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownLevel { .. }
                | Self::LevelLocked { .. }
                | Self::NoActiveLesson
                | Self::ContentNotFound(_)
                | Self::PreferencesWriteError { .. }
        )
    }
}
