use serde::{Deserialize, Serialize};

use crate::model::item::Language;

/// Source code the candidate is editing for one coding problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDraft {
    pub language: Language,
    pub source: String,
}

impl CodeDraft {
    #[must_use]
    pub fn new(language: Language, source: impl Into<String>) -> Self {
        Self {
            language,
            source: source.into(),
        }
    }
}

/// Word and character counts shown while writing a paragraph answer.
///
/// The session never scores from these counts; only the local fallback grader
/// looks at them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub words: u32,
    pub characters: u32,
}

impl TextStats {
    #[must_use]
    pub fn of(text: &str) -> Self {
        let words = text.split_whitespace().count();
        let characters = text.chars().count();
        Self {
            words: u32::try_from(words).unwrap_or(u32::MAX),
            characters: u32::try_from(characters).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn over_limit(&self, word_limit: u32) -> bool {
        self.words > word_limit
    }
}
