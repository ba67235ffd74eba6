//! Environment-driven configuration for collaborators and time budgets.

use std::env;

use assess_core::model::TestType;
use assess_core::variant::{Coding, Mcq, Paragraph, Variant};

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Code-execution endpoints. Present only when `ASSESS_EXEC_URL` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Endpoint for graded submissions; graded submit is disabled without it.
    pub grader_url: Option<String>,
}

impl ExecutionConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but reads variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let base_url = non_empty(lookup("ASSESS_EXEC_URL"))?;
        Some(Self {
            base_url,
            api_key: non_empty(lookup("ASSESS_EXEC_KEY")),
            grader_url: non_empty(lookup("ASSESS_GRADER_URL")),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextGradingConfig {
    pub url: String,
}

impl TextGradingConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        non_empty(lookup("ASSESS_TEXT_GRADER_URL")).map(|url| Self { url })
    }
}

/// Per-variant time budgets in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetConfig {
    pub mcq_secs: u32,
    pub coding_secs: u32,
    pub paragraph_secs: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            mcq_secs: Mcq::BUDGET_SECS,
            coding_secs: Coding::BUDGET_SECS,
            paragraph_secs: Paragraph::BUDGET_SECS,
        }
    }
}

impl BudgetConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Invalid or zero overrides fall back to the variant defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: u32| {
            lookup(key)
                .and_then(|raw| raw.trim().parse::<u32>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(default)
        };
        let defaults = Self::default();
        Self {
            mcq_secs: read("ASSESS_MCQ_SECS", defaults.mcq_secs),
            coding_secs: read("ASSESS_CODING_SECS", defaults.coding_secs),
            paragraph_secs: read("ASSESS_PARAGRAPH_SECS", defaults.paragraph_secs),
        }
    }

    #[must_use]
    pub fn for_test_type(&self, test_type: TestType) -> u32 {
        match test_type {
            TestType::Mcq => self.mcq_secs,
            TestType::Coding => self.coding_secs,
            TestType::Paragraph => self.paragraph_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn execution_requires_base_url() {
        assert_eq!(ExecutionConfig::from_lookup(lookup(&[])), None);
        assert_eq!(
            ExecutionConfig::from_lookup(lookup(&[("ASSESS_EXEC_URL", "  ")])),
            None
        );

        let config = ExecutionConfig::from_lookup(lookup(&[
            ("ASSESS_EXEC_URL", "http://judge.local"),
            ("ASSESS_GRADER_URL", "http://grader.local/submit"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://judge.local");
        assert_eq!(config.api_key, None);
        assert_eq!(
            config.grader_url.as_deref(),
            Some("http://grader.local/submit")
        );
    }

    #[test]
    fn budgets_ignore_invalid_overrides() {
        let budgets = BudgetConfig::from_lookup(lookup(&[
            ("ASSESS_MCQ_SECS", "60"),
            ("ASSESS_CODING_SECS", "0"),
            ("ASSESS_PARAGRAPH_SECS", "soon"),
        ]));
        assert_eq!(budgets.mcq_secs, 60);
        assert_eq!(budgets.coding_secs, 2700);
        assert_eq!(budgets.for_test_type(TestType::Paragraph), 1500);
    }

    #[test]
    fn text_grader_url_is_optional() {
        assert_eq!(TextGradingConfig::from_lookup(lookup(&[])), None);
        assert_eq!(
            TextGradingConfig::from_lookup(lookup(&[("ASSESS_TEXT_GRADER_URL", "http://g")])),
            Some(TextGradingConfig {
                url: "http://g".into()
            })
        );
    }
}
