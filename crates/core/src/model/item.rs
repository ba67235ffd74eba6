use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ItemId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemError {
    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("invalid option letter: {0:?}")]
    InvalidOption(String),

    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    #[error("coding problem has no test cases")]
    NoTestCases,

    #[error("word limit must be > 0")]
    InvalidWordLimit,
}

/// Anything a session can step through.
pub trait AssessmentItem {
    fn id(&self) -> ItemId;
    fn prompt(&self) -> &str;
}

//
// ─── MCQ ───────────────────────────────────────────────────────────────────────
//

/// One of the four answer slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum McqOption {
    A,
    B,
    C,
    D,
}

impl McqOption {
    pub const ALL: [McqOption; 4] = [McqOption::A, McqOption::B, McqOption::C, McqOption::D];

    /// Parses `"A"`..`"D"` (case-insensitive, surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns `ItemError::InvalidOption` for anything else.
    pub fn from_letter(raw: &str) -> Result<Self, ItemError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            _ => Err(ItemError::InvalidOption(raw.to_string())),
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    #[must_use]
    pub fn letter(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for McqOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqQuestion {
    id: ItemId,
    question: String,
    options: [String; 4],
    correct: McqOption,
}

impl McqQuestion {
    /// # Errors
    ///
    /// Returns `ItemError::EmptyPrompt` if the question text is blank.
    pub fn new(
        id: ItemId,
        question: impl Into<String>,
        options: [String; 4],
        correct: McqOption,
    ) -> Result<Self, ItemError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(ItemError::EmptyPrompt);
        }
        Ok(Self {
            id,
            question,
            options,
            correct,
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn option(&self, option: McqOption) -> &str {
        &self.options[option.index()]
    }

    #[must_use]
    pub fn options(&self) -> &[String; 4] {
        &self.options
    }

    #[must_use]
    pub fn correct(&self) -> McqOption {
        self.correct
    }

    #[must_use]
    pub fn is_correct(&self, choice: McqOption) -> bool {
        self.correct == choice
    }
}

impl AssessmentItem for McqQuestion {
    fn id(&self) -> ItemId {
        self.id
    }

    fn prompt(&self) -> &str {
        &self.question
    }
}

//
// ─── CODING ────────────────────────────────────────────────────────────────────
//

/// Languages offered in the coding editor, with their execution-service ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::C,
    ];

    /// Language id understood by the execution service.
    #[must_use]
    pub fn execution_id(self) -> u32 {
        match self {
            Self::Python => 71,
            Self::JavaScript => 63,
            Self::Java => 62,
            Self::Cpp => 54,
            Self::C => 50,
        }
    }

    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Java => "java",
            Self::Cpp => "cpp",
            Self::C => "c",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::Java => "Java",
            Self::Cpp => "C++",
            Self::C => "C",
        }
    }

    /// # Errors
    ///
    /// Returns `ItemError::UnknownLanguage` for an unrecognized slug.
    pub fn from_slug(slug: &str) -> Result<Self, ItemError> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.slug() == slug)
            .ok_or_else(|| ItemError::UnknownLanguage(slug.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingProblem {
    id: ItemId,
    title: String,
    prompt: String,
    starter_code: BTreeMap<Language, String>,
    test_cases: Vec<TestCase>,
}

impl CodingProblem {
    /// # Errors
    ///
    /// Returns `ItemError::EmptyPrompt` for a blank prompt and
    /// `ItemError::NoTestCases` when nothing could grade a submission.
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        prompt: impl Into<String>,
        starter_code: BTreeMap<Language, String>,
        test_cases: Vec<TestCase>,
    ) -> Result<Self, ItemError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ItemError::EmptyPrompt);
        }
        if test_cases.is_empty() {
            return Err(ItemError::NoTestCases);
        }
        Ok(Self {
            id,
            title: title.into(),
            prompt,
            starter_code,
            test_cases,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Starter code for `language`, or an empty string when none was authored.
    #[must_use]
    pub fn starter_for(&self, language: Language) -> &str {
        self.starter_code.get(&language).map_or("", String::as_str)
    }

    #[must_use]
    pub fn starter_code(&self) -> &BTreeMap<Language, String> {
        &self.starter_code
    }

    #[must_use]
    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    /// Test cases shown to the candidate.
    pub fn sample_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases.iter().filter(|case| !case.hidden)
    }
}

impl AssessmentItem for CodingProblem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }
}

//
// ─── PARAGRAPH ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphPrompt {
    id: ItemId,
    prompt: String,
    word_limit: u32,
}

impl ParagraphPrompt {
    /// # Errors
    ///
    /// Returns `ItemError::EmptyPrompt` or `ItemError::InvalidWordLimit`.
    pub fn new(id: ItemId, prompt: impl Into<String>, word_limit: u32) -> Result<Self, ItemError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(ItemError::EmptyPrompt);
        }
        if word_limit == 0 {
            return Err(ItemError::InvalidWordLimit);
        }
        Ok(Self {
            id,
            prompt,
            word_limit,
        })
    }

    #[must_use]
    pub fn word_limit(&self) -> u32 {
        self.word_limit
    }
}

impl AssessmentItem for ParagraphPrompt {
    fn id(&self) -> ItemId {
        self.id
    }

    fn prompt(&self) -> &str {
        &self.prompt
    }
}
