//! Content catalog: levels, their lessons, and each lesson's exercise.
//!
//! The catalog is immutable after loading. It is read from YAML, either the
//! built-in curriculum compiled into the binary or a file chosen by the user,
//! and validated once so that the rest of the engine can rely on its shape.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{QuestError, Result};
use crate::i18n::{LocalizedText, MessageKey};

/// Maximum allowed catalog file size in bytes (1MB).
pub const MAX_CATALOG_SIZE: u64 = 1024 * 1024;

/// Name reported in errors for the compiled-in catalog.
const EMBEDDED_SOURCE: &str = "<built-in catalog>";

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.yaml");

// ============================================================================
// Catalog entries
// ============================================================================

/// Difficulty tier of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Entry level.
    Beginner,
    /// Builds on beginner levels.
    Intermediate,
    /// Hardest tier.
    Advanced,
}

impl Difficulty {
    /// The interface message naming this tier.
    #[must_use]
    pub const fn message_key(self) -> MessageKey {
        match self {
            Self::Beginner => MessageKey::Beginner,
            Self::Intermediate => MessageKey::Intermediate,
            Self::Advanced => MessageKey::Advanced,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// A unit of the curriculum, gated by prerequisite levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    /// Unique level identifier.
    pub id: String,
    /// Display title.
    pub title: LocalizedText,
    /// Short summary shown on the level overview.
    #[serde(default)]
    pub description: LocalizedText,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Free-form category tag used for filtering (e.g. `react`).
    pub category: String,
    /// Points awarded the first time the level is completed.
    pub points: u32,
    /// Levels that must be completed before this one unlocks.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// One step of a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Unique lesson identifier.
    pub id: String,
    /// Display title.
    pub title: LocalizedText,
    /// One-line summary.
    #[serde(default)]
    pub description: LocalizedText,
    /// Teaching text shown before the exercise.
    #[serde(default)]
    pub content: LocalizedText,
    /// Example snippets.
    #[serde(default)]
    pub examples: Vec<LocalizedText>,
    /// The exercise the learner must solve.
    pub exercise: Exercise,
}

/// The coding task attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// What the learner has to build.
    #[serde(default)]
    pub description: LocalizedText,
    /// Code the submission buffer starts with.
    #[serde(default)]
    pub initial_code: String,
    /// Reference solution submissions are compared against.
    pub solution: String,
    /// Ordered hints, revealed one at a time.
    pub hints: Vec<LocalizedText>,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    levels: Vec<Level>,
    #[serde(default)]
    lessons: IndexMap<String, Vec<Lesson>>,
}

/// All levels and lessons available to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    levels: Vec<Level>,
    lessons: IndexMap<String, Vec<Lesson>>,
}

impl Catalog {
    /// Builds a catalog from parts and validates it.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::CatalogValidationError` if the content breaks a
    /// catalog rule (see [`Catalog::validate`]).
    pub fn new(levels: Vec<Level>, lessons: IndexMap<String, Vec<Lesson>>) -> Result<Self> {
        let catalog = Self { levels, lessons };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Returns the curriculum compiled into the engine.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled YAML is broken, which the test suite guards.
    pub fn embedded() -> Result<Self> {
        Self::from_yaml_str(EMBEDDED_CATALOG, EMBEDDED_SOURCE)
    }

    /// Parses and validates a catalog from YAML text.
    ///
    /// `source_name` is used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::CatalogParseError` for malformed YAML and
    /// `QuestError::CatalogValidationError` for content rule violations.
    pub fn from_yaml_str(yaml: &str, source_name: &str) -> Result<Self> {
        let document: CatalogDocument = serde_yaml::from_str(yaml)
            .map_err(|e| QuestError::catalog_parse(source_name, e.to_string()))?;
        Self::new(document.levels, document.lessons)
    }

    /// Loads a catalog from the given file path.
    ///
    /// Validates that:
    /// - The file exists
    /// - The file size is within the 1MB limit
    /// - The content is valid UTF-8
    ///
    /// # Errors
    ///
    /// Returns `QuestError::CatalogNotFound` if the file doesn't exist.
    /// Returns `QuestError::CatalogTooLarge` if the file exceeds 1MB.
    /// Returns `QuestError::CatalogEncodingError` if the file is not valid UTF-8.
    /// Returns parse and validation errors as [`Catalog::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                QuestError::catalog_not_found(path)
            } else {
                QuestError::Io(e)
            }
        })?;

        let file_size = metadata.len();
        if file_size > MAX_CATALOG_SIZE {
            return Err(QuestError::catalog_too_large(path, file_size / 1024));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                QuestError::catalog_encoding(path)
            } else {
                QuestError::Io(e)
            }
        })?;

        let catalog = Self::from_yaml_str(&content, &path.display().to_string())?;
        tracing::info!(
            path = %path.display(),
            levels = catalog.levels.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Checks the catalog content rules.
    ///
    /// Errors:
    /// - a level or lesson id is empty or used twice
    /// - a `lessons` key names no level
    /// - an exercise has an empty solution or no hints
    ///
    /// Prerequisites naming unknown levels only log a warning: such a level
    /// stays locked forever, which is an authoring mistake but not a reason
    /// to refuse the whole curriculum.
    ///
    /// # Errors
    ///
    /// Returns `QuestError::CatalogValidationError` on the first violation.
    pub fn validate(&self) -> Result<()> {
        let mut level_ids = HashSet::new();
        for level in &self.levels {
            if level.id.trim().is_empty() {
                return Err(QuestError::catalog_validation(
                    "a level has an empty id",
                    "Give every level a unique, non-empty id",
                ));
            }
            if !level_ids.insert(level.id.as_str()) {
                return Err(QuestError::catalog_validation(
                    format!("level id '{}' is used more than once", level.id),
                    "Rename one of the duplicated levels",
                ));
            }
        }

        for level in &self.levels {
            for prerequisite in &level.prerequisites {
                if !level_ids.contains(prerequisite.as_str()) || *prerequisite == level.id {
                    tracing::warn!(
                        level_id = %level.id,
                        prerequisite = %prerequisite,
                        "Prerequisite can never be satisfied; level will stay locked"
                    );
                }
            }
        }

        let mut lesson_ids = HashSet::new();
        for (level_id, lessons) in &self.lessons {
            if !level_ids.contains(level_id.as_str()) {
                return Err(QuestError::catalog_validation(
                    format!("lessons are listed under unknown level '{level_id}'"),
                    "Add the level to 'levels' or move its lessons under an existing level id",
                ));
            }

            for lesson in lessons {
                if lesson.id.trim().is_empty() || !lesson_ids.insert(lesson.id.as_str()) {
                    return Err(QuestError::catalog_validation(
                        format!("lesson id '{}' in level '{level_id}' is empty or duplicated", lesson.id),
                        "Give every lesson a unique, non-empty id",
                    ));
                }
                if lesson.exercise.solution.trim().is_empty() {
                    return Err(QuestError::catalog_validation(
                        format!("lesson '{}' has an empty solution", lesson.id),
                        "Provide the reference solution for the exercise",
                    ));
                }
                if lesson.exercise.hints.is_empty() {
                    return Err(QuestError::catalog_validation(
                        format!("lesson '{}' has no hints", lesson.id),
                        "Add at least one hint to the exercise",
                    ));
                }
            }
        }

        Ok(())
    }

    /// All levels in catalog order.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Looks up a level by id.
    #[must_use]
    pub fn level(&self, level_id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == level_id)
    }

    /// Returns the ordered lessons of a level, or `None` if none were authored.
    #[must_use]
    pub fn lessons_for(&self, level_id: &str) -> Option<&[Lesson]> {
        self.lessons.get(level_id).map(Vec::as_slice)
    }

    /// Level ids that have lessons, in catalog order.
    #[must_use]
    pub fn lesson_keys(&self) -> Vec<String> {
        self.lessons.keys().cloned().collect()
    }

    /// Distinct category tags in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.levels
            .iter()
            .map(|level| level.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` if the catalog has no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    const MINIMAL: &str = r#"
levels:
  - id: a
    title: { en: "A" }
    difficulty: beginner
    category: react
    points: 10
  - id: b
    title: { en: "B", ko: "비" }
    difficulty: advanced
    category: typescript
    points: 20
    prerequisites: [a]
lessons:
  a:
    - id: a-1
      title: { en: "First" }
      exercise:
        initialCode: "let x ="
        solution: "let x = 1;"
        hints:
          - en: "Assign one"
"#;

    // ------------------------------------------------------------------------
    // Embedded catalog
    // ------------------------------------------------------------------------

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::embedded().unwrap();

        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.categories(), vec!["react", "typescript"]);

        for level in catalog.levels() {
            let lessons = catalog.lessons_for(&level.id).unwrap();
            assert_eq!(lessons.len(), 1, "level {} should have one lesson", level.id);
            assert_eq!(lessons[0].id, format!("{}-1", level.id));
            assert!(!lessons[0].exercise.hints.is_empty());
        }
    }

    #[test]
    fn test_embedded_catalog_prerequisite_chains() {
        let catalog = Catalog::embedded().unwrap();

        assert!(catalog.level("react-1").unwrap().prerequisites.is_empty());
        assert!(catalog.level("typescript-1").unwrap().prerequisites.is_empty());
        assert_eq!(catalog.level("react-5").unwrap().prerequisites, vec!["react-4"]);
        assert_eq!(
            catalog.level("typescript-4").unwrap().prerequisites,
            vec!["typescript-3"]
        );

        let points: u32 = catalog.levels().iter().map(|level| level.points).sum();
        assert_eq!(points, 1600);
    }

    #[test]
    fn test_embedded_initial_code_does_not_solve_exercise() {
        let catalog = Catalog::embedded().unwrap();
        for level in catalog.levels() {
            for lesson in catalog.lessons_for(&level.id).unwrap() {
                assert!(
                    !crate::evaluate(&lesson.exercise.initial_code, &lesson.exercise.solution),
                    "initial code of {} already passes",
                    lesson.id
                );
            }
        }
    }

    #[test]
    fn test_embedded_catalog_is_bilingual() {
        let catalog = Catalog::embedded().unwrap();
        let level = catalog.level("typescript-3").unwrap();
        assert_eq!(level.title.get(Language::En), "Generics");
        assert_eq!(level.title.get(Language::Ko), "제네릭");
        assert_eq!(level.difficulty, Difficulty::Intermediate);
    }

    // ------------------------------------------------------------------------
    // Parsing and lookup
    // ------------------------------------------------------------------------

    #[test]
    fn test_from_yaml_str_minimal() {
        let catalog = Catalog::from_yaml_str(MINIMAL, "minimal").unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lesson_keys(), vec!["a"]);
        assert!(catalog.lessons_for("a").is_some());
        assert!(catalog.lessons_for("b").is_none());
        assert!(catalog.level("zzz").is_none());

        let exercise = &catalog.lessons_for("a").unwrap()[0].exercise;
        assert_eq!(exercise.initial_code, "let x =");
        assert_eq!(exercise.hints[0].get(Language::Ko), "Assign one");
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = Catalog::from_yaml_str("levels: [", "broken.yaml").unwrap_err();
        assert!(
            matches!(&err, QuestError::CatalogParseError { source_name, .. } if source_name == "broken.yaml"),
            "Expected CatalogParseError, got: {err:?}"
        );
    }

    #[test]
    fn test_unknown_difficulty_is_parse_error() {
        let yaml = MINIMAL.replace("difficulty: advanced", "difficulty: legendary");
        let err = Catalog::from_yaml_str(&yaml, "bad").unwrap_err();
        assert!(matches!(err, QuestError::CatalogParseError { .. }));
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    #[test]
    fn test_duplicate_level_id_rejected() {
        let yaml = MINIMAL.replace("- id: b", "- id: a");
        let err = Catalog::from_yaml_str(&yaml, "dup").unwrap_err();
        assert!(err.to_string().contains("used more than once"));
    }

    #[test]
    fn test_lessons_for_unknown_level_rejected() {
        let yaml = MINIMAL.replace("lessons:\n  a:", "lessons:\n  ghost:");
        let err = Catalog::from_yaml_str(&yaml, "ghost").unwrap_err();
        assert!(
            matches!(&err, QuestError::CatalogValidationError { message, .. } if message.contains("ghost")),
            "Expected CatalogValidationError, got: {err:?}"
        );
    }

    #[test]
    fn test_exercise_without_hints_rejected() {
        let yaml = MINIMAL.replace("        hints:\n          - en: \"Assign one\"\n", "        hints: []\n");
        let err = Catalog::from_yaml_str(&yaml, "nohints").unwrap_err();
        assert!(err.to_string().contains("has no hints"));
    }

    #[test]
    fn test_empty_solution_rejected() {
        let yaml = MINIMAL.replace("solution: \"let x = 1;\"", "solution: \"   \"");
        let err = Catalog::from_yaml_str(&yaml, "nosolution").unwrap_err();
        assert!(err.to_string().contains("empty solution"));
    }

    #[test]
    fn test_unknown_prerequisite_is_allowed() {
        let yaml = MINIMAL.replace("prerequisites: [a]", "prerequisites: [missing]");
        let catalog = Catalog::from_yaml_str(&yaml, "warn").unwrap();
        assert_eq!(catalog.level("b").unwrap().prerequisites, vec!["missing"]);
    }

    // ------------------------------------------------------------------------
    // File loading
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("test_codequest_catalog.yaml");
        std::fs::write(&path, MINIMAL).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = Catalog::load("/nonexistent/catalog.yaml").unwrap_err();
        assert!(matches!(err, QuestError::CatalogNotFound { .. }));
    }

    #[test]
    fn test_load_oversized_file() {
        let path = std::env::temp_dir().join("test_codequest_catalog_large.yaml");
        let padding = format!("# {}\n", "x".repeat(1024));
        std::fs::write(&path, padding.repeat(1100)).unwrap();

        let err = Catalog::load(&path).unwrap_err();
        assert!(
            matches!(err, QuestError::CatalogTooLarge { size_kb, .. } if size_kb >= 1024),
            "Expected CatalogTooLarge"
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_non_utf8_file() {
        let path = std::env::temp_dir().join("test_codequest_catalog_latin1.yaml");
        std::fs::write(&path, [0x6c, 0x65, 0x76, 0xff, 0xfe, 0x0a]).unwrap();

        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, QuestError::CatalogEncodingError { .. }));

        std::fs::remove_file(&path).ok();
    }
}
