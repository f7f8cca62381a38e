//! Configuration types for CodeQuest.
//!
//! This module provides the configuration structures used to control the
//! player: which content catalog to load, where learner preferences live,
//! the fallback interface language, and the attempt/reveal timing.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};
use crate::i18n::Language;

/// The default config file name.
const CONFIG_FILE_NAME: &str = "codequest.json";

/// Default preference file path.
fn default_preferences_file() -> String {
    ".codequest/preferences.json".to_string()
}

/// Default number of consecutive failures before the solution is revealed.
const fn default_max_failures() -> u32 {
    3
}

/// Default time the revealed solution stays visible, in milliseconds.
const fn default_reveal_window_ms() -> u64 {
    5000
}

/// Default pause between a correct submission and the next lesson, in milliseconds.
const fn default_advance_delay_ms() -> u64 {
    1500
}

/// Main configuration for CodeQuest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Path to a YAML content catalog. The built-in curriculum is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Path to the file holding the learner's language preference.
    #[serde(default = "default_preferences_file")]
    pub preferences_file: String,

    /// Language used when no preference has been saved yet.
    #[serde(default)]
    pub default_language: Language,

    /// Attempt and reveal timing.
    #[serde(default)]
    pub attempts: AttemptSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            preferences_file: default_preferences_file(),
            default_language: Language::default(),
            attempts: AttemptSettings::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `codequest.json` in the current directory. If found, loads and
    /// validates the configuration. If not found, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            QuestError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `codequest.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        Self::load_from_file(&config_path)
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::ConfigParseError` if the file exists but contains
    /// invalid JSON or an unknown language.
    ///
    /// Returns `QuestError::ConfigValidationError` if the configuration values
    /// are invalid (e.g., zero failures, empty paths).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(QuestError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| QuestError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// Checks that:
    /// - `attempts.maxFailures` is greater than 0
    /// - `attempts.revealWindowMs` is greater than 0
    /// - `preferencesFile` is not empty
    /// - `catalog`, when given, is not empty
    ///
    /// # Errors
    ///
    /// Returns `QuestError::ConfigValidationError` if any validation check fails.
    pub fn validate(&self) -> Result<()> {
        if self.attempts.max_failures == 0 {
            return Err(QuestError::config_validation(
                "attempts.maxFailures must be greater than 0",
                "Set attempts.maxFailures to at least 1 in your codequest.json",
            ));
        }

        if self.attempts.reveal_window_ms == 0 {
            return Err(QuestError::config_validation(
                "attempts.revealWindowMs must be greater than 0",
                "Set attempts.revealWindowMs to at least 1 in your codequest.json",
            ));
        }

        if self.preferences_file.trim().is_empty() {
            return Err(QuestError::config_validation(
                "preferencesFile must not be empty",
                "Provide a writable file path in your codequest.json",
            ));
        }

        if self
            .catalog
            .as_deref()
            .is_some_and(|catalog| catalog.trim().is_empty())
        {
            return Err(QuestError::config_validation(
                "catalog path must not be empty",
                "Provide a valid catalog file path or remove the 'catalog' field to use the built-in levels",
            ));
        }

        Ok(())
    }
}

/// Timing of the attempt/reveal protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSettings {
    /// Consecutive failures that trigger the solution reveal.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,

    /// How long the revealed solution stays visible, in milliseconds.
    #[serde(default = "default_reveal_window_ms")]
    pub reveal_window_ms: u64,

    /// Pause between a correct submission and the next lesson, in milliseconds.
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,
}

impl Default for AttemptSettings {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            reveal_window_ms: default_reveal_window_ms(),
            advance_delay_ms: default_advance_delay_ms(),
        }
    }
}

impl AttemptSettings {
    /// The reveal window as a [`Duration`].
    #[must_use]
    pub const fn reveal_window(&self) -> Duration {
        Duration::from_millis(self.reveal_window_ms)
    }

    /// The advance delay as a [`Duration`].
    #[must_use]
    pub const fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    /// The reveal window in whole seconds, rounded up, for status messages.
    #[must_use]
    pub const fn reveal_window_secs(&self) -> u64 {
        self.reveal_window_ms.div_ceil(1000)
    }
}
