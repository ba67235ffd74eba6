//! Assessment variants: item shape, response shape, time budget, proctoring
//! and scoring rule, consumed polymorphically by [`crate::session::Session`].

use std::collections::HashMap;
use std::fmt;

use crate::model::{
    AssessmentItem, CodeDraft, CodingProblem, ItemId, McqOption, McqQuestion, ParagraphPrompt,
    TestType,
};

/// Result of applying a variant's scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Final percentage in `0..=100`.
    Percent(u8),
    /// Scored by an external grader after finalization.
    Deferred,
}

pub trait Variant: fmt::Debug + Send + Sync + 'static {
    type Item: AssessmentItem + Clone + fmt::Debug + Send + Sync + 'static;
    type Response: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    const TEST_TYPE: TestType;
    /// Default time budget in seconds.
    const BUDGET_SECS: u32;
    /// Whether the integrity guard and fullscreen gate apply.
    const PROCTORED: bool;

    /// Score the attempt. `grades` holds per-item percentages returned by
    /// external graders.
    fn score(
        &self,
        items: &[Self::Item],
        responses: &HashMap<ItemId, Self::Response>,
        grades: &HashMap<ItemId, u8>,
    ) -> Score;
}

/// `round(100 * part / whole)`, with an empty whole scoring zero.
#[must_use]
pub fn percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part.min(whole) + whole) / (2 * whole);
    u8::try_from(rounded).unwrap_or(100)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mcq;

impl Variant for Mcq {
    type Item = McqQuestion;
    type Response = McqOption;

    const TEST_TYPE: TestType = TestType::Mcq;
    const BUDGET_SECS: u32 = 1800;
    const PROCTORED: bool = true;

    fn score(
        &self,
        items: &[McqQuestion],
        responses: &HashMap<ItemId, McqOption>,
        _grades: &HashMap<ItemId, u8>,
    ) -> Score {
        let correct = items
            .iter()
            .filter(|item| {
                responses
                    .get(&item.id())
                    .is_some_and(|choice| item.is_correct(*choice))
            })
            .count();
        Score::Percent(percent(correct as u64, items.len() as u64))
    }
}

/// Mean of per-item grades; items without a grade count as zero.
#[must_use]
pub fn average_grade<I: AssessmentItem>(items: &[I], grades: &HashMap<ItemId, u8>) -> u8 {
    let total: u64 = items
        .iter()
        .map(|item| u64::from(grades.get(&item.id()).copied().unwrap_or(0).min(100)))
        .sum();
    percent(total, 100 * items.len() as u64)
}

/// Coding problems are graded by the execution service. When every recorded
/// draft already carries a grade the session averages them; otherwise the
/// remaining drafts are graded after finalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coding;

impl Variant for Coding {
    type Item = CodingProblem;
    type Response = CodeDraft;

    const TEST_TYPE: TestType = TestType::Coding;
    const BUDGET_SECS: u32 = 2700;
    const PROCTORED: bool = true;

    fn score(
        &self,
        items: &[CodingProblem],
        responses: &HashMap<ItemId, CodeDraft>,
        grades: &HashMap<ItemId, u8>,
    ) -> Score {
        let ungraded = items
            .iter()
            .any(|item| responses.contains_key(&item.id()) && !grades.contains_key(&item.id()));
        if ungraded {
            Score::Deferred
        } else {
            Score::Percent(average_grade(items, grades))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paragraph;

impl Variant for Paragraph {
    type Item = ParagraphPrompt;
    type Response = String;

    const TEST_TYPE: TestType = TestType::Paragraph;
    const BUDGET_SECS: u32 = 1500;
    const PROCTORED: bool = false;

    fn score(
        &self,
        _items: &[ParagraphPrompt],
        _responses: &HashMap<ItemId, String>,
        _grades: &HashMap<ItemId, u8>,
    ) -> Score {
        Score::Deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Language, TestCase};
    use std::collections::BTreeMap;

    fn mcq(id: u64, correct: McqOption) -> McqQuestion {
        McqQuestion::new(
            ItemId::new(id),
            format!("Q{id}"),
            ["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn problem(id: u64) -> CodingProblem {
        CodingProblem::new(
            ItemId::new(id),
            "P",
            "Solve it",
            BTreeMap::new(),
            vec![TestCase {
                input: String::new(),
                expected_output: "ok".into(),
                hidden: false,
            }],
        )
        .unwrap()
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn mcq_unanswered_counts_as_incorrect() {
        let items = vec![mcq(1, McqOption::A), mcq(2, McqOption::B), mcq(3, McqOption::C)];
        let mut responses = HashMap::new();
        responses.insert(ItemId::new(1), McqOption::A);
        responses.insert(ItemId::new(3), McqOption::B);

        let score = Mcq.score(&items, &responses, &HashMap::new());
        assert_eq!(score, Score::Percent(33));
    }

    #[test]
    fn coding_averages_external_grades() {
        let items = vec![problem(1), problem(2)];
        let mut responses = HashMap::new();
        responses.insert(ItemId::new(1), CodeDraft::new(Language::Python, "print(1)"));
        let mut grades = HashMap::new();
        grades.insert(ItemId::new(1), 75);

        assert_eq!(
            Coding.score(&items, &responses, &grades),
            Score::Percent(38)
        );
    }

    #[test]
    fn coding_defers_when_a_recorded_draft_is_ungraded() {
        let items = vec![problem(1), problem(2)];
        let mut responses = HashMap::new();
        responses.insert(ItemId::new(1), CodeDraft::new(Language::Python, "print(1)"));
        responses.insert(ItemId::new(2), CodeDraft::new(Language::Python, "print(2)"));
        let mut grades = HashMap::new();
        grades.insert(ItemId::new(1), 100);

        assert_eq!(Coding.score(&items, &responses, &grades), Score::Deferred);
        assert_eq!(
            Coding.score(&items, &HashMap::new(), &HashMap::new()),
            Score::Percent(0)
        );
    }

    #[test]
    fn paragraph_defers_scoring() {
        assert_eq!(
            Paragraph.score(&[], &HashMap::new(), &HashMap::new()),
            Score::Deferred
        );
        assert!(!Paragraph::PROCTORED);
        assert_eq!(Paragraph::BUDGET_SECS, 1500);
    }
}
