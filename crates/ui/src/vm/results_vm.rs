use assess_core::model::{AttemptOutcome, AttemptResult, TestType};

use crate::vm::time_fmt::{format_datetime, format_duration};

#[must_use]
pub fn test_type_label(test_type: TestType) -> &'static str {
    match test_type {
        TestType::Mcq => "Multiple choice",
        TestType::Coding => "Coding",
        TestType::Paragraph => "Paragraph writing",
    }
}

#[must_use]
pub fn outcome_label(outcome: AttemptOutcome) -> &'static str {
    match outcome {
        AttemptOutcome::Submitted => "Submitted",
        AttemptOutcome::ForcedByViolations => "Submitted automatically after a second violation",
        AttemptOutcome::TimedOut => "Time ran out",
    }
}

/// UI-ready summary of one finished attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub test_label: &'static str,
    pub score_label: String,
    pub outcome_label: &'static str,
    pub answered_label: String,
    pub elapsed_label: String,
    pub violations_label: String,
    pub finished_label: String,
}

impl ResultVm {
    #[must_use]
    pub fn new(result: &AttemptResult) -> Self {
        let answered_label = if result.skipped == 0 {
            format!("{} of {} answered", result.answered, result.total_items)
        } else {
            format!(
                "{} of {} answered, {} skipped",
                result.answered, result.total_items, result.skipped
            )
        };
        let violations_label = match result.violation_count {
            0 => "No integrity warnings".to_owned(),
            1 => "1 integrity warning".to_owned(),
            n => format!("{n} integrity warnings"),
        };

        Self {
            test_label: test_type_label(result.test_type),
            score_label: format!("{}%", result.score),
            outcome_label: outcome_label(result.outcome),
            answered_label,
            elapsed_label: format!("Time used: {}", format_duration(result.elapsed_secs)),
            violations_label,
            finished_label: format_datetime(result.finished_at),
        }
    }
}

#[must_use]
pub fn map_result_rows(results: &[AttemptResult]) -> Vec<ResultVm> {
    results.iter().map(ResultVm::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::AttemptId;
    use assess_core::time::fixed_now;

    fn result(outcome: AttemptOutcome, skipped: u32, violations: u8) -> AttemptResult {
        AttemptResult {
            attempt_id: AttemptId::generate(),
            test_type: TestType::Mcq,
            score: 33,
            total_items: 3,
            answered: 2,
            skipped,
            violation_count: violations,
            outcome,
            elapsed_secs: 245,
            started_at: fixed_now(),
            finished_at: fixed_now(),
        }
    }

    #[test]
    fn maps_a_clean_submission() {
        let vm = ResultVm::new(&result(AttemptOutcome::Submitted, 0, 0));
        assert_eq!(vm.test_label, "Multiple choice");
        assert_eq!(vm.score_label, "33%");
        assert_eq!(vm.outcome_label, "Submitted");
        assert_eq!(vm.answered_label, "2 of 3 answered");
        assert_eq!(vm.elapsed_label, "Time used: 4m 05s");
        assert_eq!(vm.violations_label, "No integrity warnings");
    }

    #[test]
    fn forced_submission_mentions_skips_and_warnings() {
        let vm = ResultVm::new(&result(AttemptOutcome::ForcedByViolations, 1, 2));
        assert_eq!(vm.answered_label, "2 of 3 answered, 1 skipped");
        assert_eq!(vm.violations_label, "2 integrity warnings");
        assert!(vm.outcome_label.contains("second violation"));
    }

    #[test]
    fn rows_keep_input_order() {
        let rows = map_result_rows(&[
            result(AttemptOutcome::TimedOut, 0, 1),
            result(AttemptOutcome::Submitted, 0, 0),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].outcome_label, "Time ran out");
        assert_eq!(rows[0].violations_label, "1 integrity warning");
    }
}
