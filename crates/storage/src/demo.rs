//! Sample items for local runs and UI smoke tests.

use std::collections::BTreeMap;

use assess_core::error::Error as CoreError;
use assess_core::model::{
    CodingProblem, ItemId, Language, McqOption, McqQuestion, ParagraphPrompt, TestCase,
};
use thiserror::Error;

use crate::repository::{Storage, StorageError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Item(#[from] CoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// How many items of each kind were written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub mcq: usize,
    pub coding: usize,
    pub paragraph: usize,
}

impl SeedReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mcq + self.coding + self.paragraph == 0
    }
}

fn options(a: &str, b: &str, c: &str, d: &str) -> [String; 4] {
    [a.into(), b.into(), c.into(), d.into()]
}

/// # Errors
///
/// Returns `CoreError` if a sample item fails validation.
pub fn mcq_questions() -> Result<Vec<McqQuestion>, CoreError> {
    Ok(vec![
        McqQuestion::new(
            ItemId::new(1),
            "Which data structure gives O(1) average lookup by key?",
            options("Linked list", "Hash map", "Binary heap", "Stack"),
            McqOption::B,
        )?,
        McqQuestion::new(
            ItemId::new(2),
            "What does HTTP status 404 mean?",
            options("Unauthorized", "Server error", "Not found", "Moved permanently"),
            McqOption::C,
        )?,
        McqQuestion::new(
            ItemId::new(3),
            "Which SQL clause filters grouped rows?",
            options("HAVING", "WHERE", "ORDER BY", "LIMIT"),
            McqOption::A,
        )?,
        McqQuestion::new(
            ItemId::new(4),
            "Binary search on a sorted array of n items runs in",
            options("O(n)", "O(n log n)", "O(1)", "O(log n)"),
            McqOption::D,
        )?,
    ])
}

/// # Errors
///
/// Returns `CoreError` if a sample item fails validation.
pub fn coding_problems() -> Result<Vec<CodingProblem>, CoreError> {
    let mut starter = BTreeMap::new();
    starter.insert(
        Language::Python,
        "a, b = map(int, input().split())\n# print the sum\n".to_string(),
    );
    starter.insert(
        Language::JavaScript,
        "const [a, b] = require('fs').readFileSync(0, 'utf8').trim().split(' ').map(Number);\n"
            .to_string(),
    );
    starter.insert(
        Language::Cpp,
        "#include <iostream>\nint main() {\n    long a, b;\n    std::cin >> a >> b;\n}\n"
            .to_string(),
    );

    let mut reverse_starter = BTreeMap::new();
    reverse_starter.insert(Language::Python, "s = input()\n".to_string());

    Ok(vec![
        CodingProblem::new(
            ItemId::new(1),
            "Sum of two numbers",
            "Read two integers from one line and print their sum.",
            starter,
            vec![
                TestCase {
                    input: "1 2".into(),
                    expected_output: "3".into(),
                    hidden: false,
                },
                TestCase {
                    input: "-5 5".into(),
                    expected_output: "0".into(),
                    hidden: true,
                },
            ],
        )?,
        CodingProblem::new(
            ItemId::new(2),
            "Reverse a string",
            "Read one line and print it reversed.",
            reverse_starter,
            vec![
                TestCase {
                    input: "abc".into(),
                    expected_output: "cba".into(),
                    hidden: false,
                },
                TestCase {
                    input: "racecar".into(),
                    expected_output: "racecar".into(),
                    hidden: true,
                },
            ],
        )?,
    ])
}

/// # Errors
///
/// Returns `CoreError` if a sample item fails validation.
pub fn paragraph_prompts() -> Result<Vec<ParagraphPrompt>, CoreError> {
    Ok(vec![
        ParagraphPrompt::new(
            ItemId::new(1),
            "Describe a technical decision you made that you would revisit today.",
            250,
        )?,
        ParagraphPrompt::new(
            ItemId::new(2),
            "Explain how you would onboard a new teammate onto an unfamiliar codebase.",
            200,
        )?,
    ])
}

/// Writes the sample items into any table that is still empty. Tables that
/// already hold items are left alone.
///
/// # Errors
///
/// Returns `SeedError` if a sample is invalid or the store rejects a write.
pub async fn seed_if_empty(storage: &Storage) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    if storage.items.mcq_questions().await?.is_empty() {
        for question in mcq_questions()? {
            storage.items.upsert_mcq(&question).await?;
            report.mcq += 1;
        }
    }
    if storage.items.coding_problems().await?.is_empty() {
        for problem in coding_problems()? {
            storage.items.upsert_coding(&problem).await?;
            report.coding += 1;
        }
    }
    if storage.items.paragraph_prompts().await?.is_empty() {
        for prompt in paragraph_prompts()? {
            storage.items.upsert_paragraph(&prompt).await?;
            report.paragraph += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_once_into_empty_tables() {
        let storage = Storage::in_memory();
        let first = seed_if_empty(&storage).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                mcq: 4,
                coding: 2,
                paragraph: 2
            }
        );

        let second = seed_if_empty(&storage).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(storage.items.mcq_questions().await.unwrap().len(), 4);
    }

    #[test]
    fn samples_keep_hidden_cases_out_of_view() {
        let problems = coding_problems().unwrap();
        assert_eq!(problems[0].sample_cases().count(), 1);
        assert_eq!(problems[0].starter_for(Language::Java), "");
    }
}
