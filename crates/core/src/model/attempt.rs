use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ids::{AttemptId, ParseIdError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Mcq,
    Coding,
    Paragraph,
}

impl TestType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::Coding => "coding",
            Self::Paragraph => "paragraph",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestType {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcq" => Ok(Self::Mcq),
            "coding" => Ok(Self::Coding),
            "paragraph" => Ok(Self::Paragraph),
            _ => Err(ParseIdError::new("TestType")),
        }
    }
}

/// How an attempt reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The candidate pressed submit.
    Submitted,
    /// The second integrity violation forced submission.
    ForcedByViolations,
    /// The countdown reached zero.
    TimedOut,
}

impl AttemptOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::ForcedByViolations => "forced_by_violations",
            Self::TimedOut => "timed_out",
        }
    }
}

impl FromStr for AttemptOutcome {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "forced_by_violations" => Ok(Self::ForcedByViolations),
            "timed_out" => Ok(Self::TimedOut),
            _ => Err(ParseIdError::new("AttemptOutcome")),
        }
    }
}

/// The record handed to the result-submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: AttemptId,
    pub test_type: TestType,
    /// Percentage in `0..=100`.
    pub score: u8,
    pub total_items: u32,
    pub answered: u32,
    pub skipped: u32,
    pub violation_count: u8,
    pub outcome: AttemptOutcome,
    pub elapsed_secs: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
