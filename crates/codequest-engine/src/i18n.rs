//! Localization for learner-facing text.
//!
//! Two kinds of text are localized: catalog content ([`LocalizedText`], one
//! value per language with English always present) and fixed interface
//! messages ([`MessageKey`], looked up through a [`Localizer`]). Lookups for a
//! missing translation fall back to English.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

// ============================================================================
// Language
// ============================================================================

/// A supported interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    /// English (default and fallback).
    #[default]
    En,
    /// Korean.
    Ko,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Self; 2] = [Self::En, Self::Ko];

    /// Parses a language code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Self::En),
            "ko" => Some(Self::Ko),
            _ => None,
        }
    }

    /// Returns the two-letter language code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ko => "ko",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_code(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid language '{s}': expected one of 'en', 'ko'"))
        })
    }
}

impl Serialize for Language {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

// ============================================================================
// LocalizedText
// ============================================================================

/// Catalog text with an English original and an optional Korean translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// English text, always present.
    pub en: String,
    /// Korean text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ko: Option<String>,
}

impl LocalizedText {
    /// Creates an English-only text.
    #[must_use]
    pub fn english(en: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ko: None,
        }
    }

    /// Creates a text with both translations.
    #[must_use]
    pub fn new(en: impl Into<String>, ko: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ko: Some(ko.into()),
        }
    }

    /// Returns the text in `language`, falling back to English.
    #[must_use]
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Ko => self.ko.as_deref().unwrap_or(&self.en),
        }
    }

    /// Returns `true` if the English text is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.en.trim().is_empty()
    }
}

// ============================================================================
// Interface messages
// ============================================================================

/// Keys of fixed interface messages.
///
/// Messages whose text contains `{name}` placeholders are filled in with
/// [`Localizer::format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Application title.
    Title,
    /// Application subtitle.
    Subtitle,
    /// Submission passed.
    Excellent,
    /// Shown when the revealed solution is hidden again.
    NotQuiteRight,
    /// Failed attempt below the reveal threshold. Placeholder: `{attempt}`.
    AttemptFailed,
    /// Threshold reached. Placeholders: `{attempts}`, `{seconds}`.
    SolutionShown,
    /// Requested level has no lessons.
    LevelNotFound,
    /// Navigation back to the level overview.
    BackToLevels,
    /// Lesson position. Placeholders: `{current}`, `{total}`.
    LessonPosition,
    /// Heading for the exercise block.
    Exercise,
    /// Heading for revealed hints.
    Hints,
    /// Shown when every hint is already visible.
    NoMoreHints,
    /// Heading for the revealed solution.
    Solution,
    /// Heading for the learner's code buffer.
    YourCode,
    /// Heading for the text preview.
    Preview,
    /// Level badge for locked levels.
    Locked,
    /// Level badge for completed levels.
    Completed,
    /// Unit label for points.
    Points,
    /// Label for the prerequisite list.
    Requires,
    /// Difficulty tier `beginner`.
    Beginner,
    /// Difficulty tier `intermediate`.
    Intermediate,
    /// Difficulty tier `advanced`.
    Advanced,
    /// Category filter showing every level.
    AllCategories,
    /// Overall progress. Placeholders: `{completed}`, `{total}`, `{percent}`.
    LevelsCompleted,
    /// Total score label.
    TotalPoints,
    /// Level finished. Placeholder: `{points}`.
    LevelComplete,
    /// Level finished again; no points awarded.
    LevelReplayed,
}

impl MessageKey {
    /// Returns the stable identifier of this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Excellent => "excellent",
            Self::NotQuiteRight => "notQuiteRight",
            Self::AttemptFailed => "attemptFailed",
            Self::SolutionShown => "solutionShown",
            Self::LevelNotFound => "levelNotFound",
            Self::BackToLevels => "backToLevels",
            Self::LessonPosition => "lessonPosition",
            Self::Exercise => "exercise",
            Self::Hints => "hints",
            Self::NoMoreHints => "noMoreHints",
            Self::Solution => "solution",
            Self::YourCode => "yourCode",
            Self::Preview => "preview",
            Self::Locked => "locked",
            Self::Completed => "completed",
            Self::Points => "points",
            Self::Requires => "requires",
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::AllCategories => "allCategories",
            Self::LevelsCompleted => "levelsCompleted",
            Self::TotalPoints => "totalPoints",
            Self::LevelComplete => "levelComplete",
            Self::LevelReplayed => "levelReplayed",
        }
    }
}

/// Source of interface messages for the active language.
pub trait Localizer {
    /// The language messages are currently rendered in.
    fn language(&self) -> Language;

    /// Looks up the raw message for `key` in `language`.
    fn lookup(&self, language: Language, key: MessageKey) -> Option<&str>;

    /// Returns the message for `key`, falling back to English and finally to
    /// the key's identifier.
    fn text(&self, key: MessageKey) -> &str {
        self.lookup(self.language(), key)
            .or_else(|| self.lookup(Language::En, key))
            .unwrap_or_else(|| key.as_str())
    }

    /// Returns the message for `key` with `{name}` placeholders replaced.
    fn format(&self, key: MessageKey, args: &[(&str, &dyn Display)]) -> String {
        args.iter()
            .fold(self.text(key).to_string(), |message, (name, value)| {
                message.replace(&format!("{{{name}}}"), &value.to_string())
            })
    }
}

/// Built-in English and Korean message tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Translations {
    language: Language,
}

impl Translations {
    /// Creates a message table rendering in `language`.
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self { language }
    }

    /// Switches the active language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }
}

impl Localizer for Translations {
    fn language(&self) -> Language {
        self.language
    }

    fn lookup(&self, language: Language, key: MessageKey) -> Option<&str> {
        match language {
            Language::En => Some(english(key)),
            Language::Ko => korean(key),
        }
    }
}

const fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Title => "CodeQuest",
        MessageKey::Subtitle => "Learn React and TypeScript one quest at a time",
        MessageKey::Excellent => "Excellent! Your solution is correct!",
        MessageKey::NotQuiteRight => "Not quite right. Check the hints and try again!",
        MessageKey::AttemptFailed => "Attempt {attempt}. Try again.",
        MessageKey::SolutionShown => {
            "Wrong {attempts} times. Showing solution for {seconds} seconds."
        }
        MessageKey::LevelNotFound => "Level not found",
        MessageKey::BackToLevels => "Back to levels",
        MessageKey::LessonPosition => "Lesson {current} of {total}",
        MessageKey::Exercise => "Exercise",
        MessageKey::Hints => "Hints",
        MessageKey::NoMoreHints => "No more hints for this exercise",
        MessageKey::Solution => "Solution",
        MessageKey::YourCode => "Your code",
        MessageKey::Preview => "Preview",
        MessageKey::Locked => "Locked",
        MessageKey::Completed => "Completed",
        MessageKey::Points => "points",
        MessageKey::Requires => "Requires",
        MessageKey::Beginner => "Beginner",
        MessageKey::Intermediate => "Intermediate",
        MessageKey::Advanced => "Advanced",
        MessageKey::AllCategories => "All",
        MessageKey::LevelsCompleted => "{completed} of {total} levels completed ({percent}%)",
        MessageKey::TotalPoints => "Total points",
        MessageKey::LevelComplete => "Level complete! +{points} points",
        MessageKey::LevelReplayed => "Level complete! Points were already awarded for this level.",
    }
}

const fn korean(key: MessageKey) -> Option<&'static str> {
    let text = match key {
        MessageKey::Subtitle => "한 번에 하나의 퀘스트로 React와 TypeScript를 배워보세요",
        MessageKey::Excellent => "훌륭합니다! 정답입니다!",
        MessageKey::NotQuiteRight => "아직 정답이 아닙니다. 힌트를 확인하고 다시 시도해보세요!",
        MessageKey::AttemptFailed => "{attempt}번째 시도입니다. 다시 시도해보세요.",
        MessageKey::SolutionShown => "{attempts}번 틀렸습니다. {seconds}초간 솔루션을 보여드립니다.",
        MessageKey::LevelNotFound => "레벨을 찾을 수 없습니다",
        MessageKey::BackToLevels => "레벨 목록으로",
        MessageKey::LessonPosition => "레슨 {current} / {total}",
        MessageKey::Exercise => "연습 문제",
        MessageKey::Hints => "힌트",
        MessageKey::NoMoreHints => "더 이상 힌트가 없습니다",
        MessageKey::Solution => "솔루션",
        MessageKey::YourCode => "내 코드",
        MessageKey::Preview => "미리보기",
        MessageKey::Locked => "잠김",
        MessageKey::Completed => "완료",
        MessageKey::Points => "점",
        MessageKey::Requires => "선행 레벨",
        MessageKey::Beginner => "초급",
        MessageKey::Intermediate => "중급",
        MessageKey::Advanced => "고급",
        MessageKey::AllCategories => "전체",
        MessageKey::LevelsCompleted => "{total}개 중 {completed}개 레벨 완료 ({percent}%)",
        MessageKey::TotalPoints => "총 점수",
        MessageKey::LevelComplete => "레벨 완료! +{points}점",
        MessageKey::LevelReplayed => "레벨 완료! 이 레벨의 점수는 이미 받았습니다.",
        MessageKey::Title => return None,
    };
    Some(text)
}
