//! Persisted learner preferences.
//!
//! Only the interface language survives between sessions. It is stored as a
//! small JSON document, `{"preferredLanguage":"ko"}`, and read once at
//! startup. A missing, corrupt, or unsupported value never stops the player:
//! the configured default is used instead.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};
use crate::i18n::Language;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesDocument {
    preferred_language: String,
}

/// The learner's stored preferences and where they are saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    language: Language,
}

impl PreferenceStore {
    /// Reads preferences from `path`, falling back to `default_language`.
    pub fn load(path: impl Into<PathBuf>, default_language: Language) -> Self {
        let path = path.into();
        let language = read_language(&path).unwrap_or(default_language);
        tracing::debug!(path = %path.display(), %language, "Preferences loaded");
        Self {
            path: Some(path),
            language,
        }
    }

    /// Creates a store that never touches the filesystem.
    #[must_use]
    pub const fn in_memory(language: Language) -> Self {
        Self {
            path: None,
            language,
        }
    }

    /// The preferred language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Where preferences are saved, if anywhere.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Changes the preferred language and saves it.
    ///
    /// The in-memory value is updated even if saving fails.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::PreferencesWriteError` if the file cannot be written.
    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.language = language;
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| QuestError::preferences_write(path, e.to_string()))?;
        }

        let document = PreferencesDocument {
            preferred_language: language.code().to_string(),
        };
        let content = serde_json::to_string_pretty(&document)?;
        std::fs::write(path, content)
            .map_err(|e| QuestError::preferences_write(path, e.to_string()))?;

        tracing::info!(path = %path.display(), %language, "Saved language preference");
        Ok(())
    }
}

fn read_language(path: &Path) -> Option<Language> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read preferences");
            return None;
        }
    };

    let document: PreferencesDocument = match serde_json::from_str(&content) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences");
            return None;
        }
    };

    let language = Language::from_code(&document.preferred_language);
    if language.is_none() {
        tracing::warn!(
            path = %path.display(),
            value = %document.preferred_language,
            "Ignoring unsupported language preference"
        );
    }
    language
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("codequest_prefs_{name}_{}", std::process::id()))
    }

    #[test]
    fn test_missing_file_uses_default() {
        let store = PreferenceStore::load(temp_path("missing").join("prefs.json"), Language::Ko);
        assert_eq!(store.language(), Language::Ko);
    }

    #[test]
    fn test_reads_saved_language() {
        let path = temp_path("saved");
        std::fs::write(&path, r#"{"preferredLanguage":"ko"}"#).unwrap();

        let store = PreferenceStore::load(&path, Language::En);
        assert_eq!(store.language(), Language::Ko);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unsupported_language_is_ignored() {
        let path = temp_path("unsupported");
        std::fs::write(&path, r#"{"preferredLanguage":"fr"}"#).unwrap();

        let store = PreferenceStore::load(&path, Language::En);
        assert_eq!(store.language(), Language::En);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{ not json").unwrap();

        let store = PreferenceStore::load(&path, Language::Ko);
        assert_eq!(store.language(), Language::Ko);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_set_language_persists_and_creates_directories() {
        let dir = temp_path("nested");
        let path = dir.join("deeper").join("preferences.json");

        let mut store = PreferenceStore::load(&path, Language::En);
        store.set_language(Language::Ko).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains(r#""preferredLanguage": "ko""#));
        assert_eq!(PreferenceStore::load(&path, Language::En).language(), Language::Ko);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_in_memory_store_never_writes() {
        let mut store = PreferenceStore::in_memory(Language::En);
        store.set_language(Language::Ko).unwrap();
        assert_eq!(store.language(), Language::Ko);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_write_failure_keeps_new_language() {
        let blocker = temp_path("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let mut store = PreferenceStore::load(blocker.join("prefs.json"), Language::En);
        let err = store.set_language(Language::Ko).unwrap_err();

        assert!(matches!(err, QuestError::PreferencesWriteError { .. }));
        assert!(err.is_recoverable());
        assert_eq!(store.language(), Language::Ko);

        std::fs::remove_file(&blocker).ok();
    }
}
