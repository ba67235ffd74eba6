use assess_core::model::Language;
use services::execution::{GradeReport, RunOutput};

/// Options for the language picker, in display order.
#[must_use]
pub fn language_options() -> Vec<(&'static str, &'static str)> {
    Language::ALL
        .iter()
        .map(|language| (language.slug(), language.label()))
        .collect()
}

/// Output panel for an ad-hoc run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutputVm {
    pub stdout: String,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub stats_label: Option<String>,
}

impl RunOutputVm {
    #[must_use]
    pub fn new(output: &RunOutput) -> Self {
        let non_empty = |text: &str| (!text.trim().is_empty()).then(|| text.to_owned());
        let stats_label = match (output.time_seconds, output.memory_kb) {
            (Some(time), Some(memory)) => Some(format!("{time:.3} s, {memory} KB")),
            (Some(time), None) => Some(format!("{time:.3} s")),
            (None, Some(memory)) => Some(format!("{memory} KB")),
            (None, None) => None,
        };
        Self {
            stdout: output.stdout.clone(),
            stderr: non_empty(&output.stderr),
            compile_output: output.compile_output.as_deref().and_then(non_empty),
            stats_label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseVm {
    pub label: String,
    pub passed: bool,
    pub input: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Report panel for a graded submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradeVm {
    pub summary: String,
    pub cases: Vec<CaseVm>,
}

impl GradeVm {
    #[must_use]
    pub fn new(report: &GradeReport) -> Self {
        Self {
            summary: format!(
                "{} of {} tests passed ({}%)",
                report.passed, report.total, report.score
            ),
            cases: report
                .results
                .iter()
                .enumerate()
                .map(|(index, case)| CaseVm {
                    label: format!("Test {}", index + 1),
                    passed: case.passed,
                    input: case.input.clone(),
                    expected: case.expected_output.clone(),
                    actual: case.actual_output.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::execution::TestCaseResult;

    #[test]
    fn picker_lists_every_language() {
        let options = language_options();
        assert_eq!(options.len(), Language::ALL.len());
        assert_eq!(options[0], (Language::Python.slug(), Language::Python.label()));
    }

    #[test]
    fn run_output_hides_blank_streams() {
        let vm = RunOutputVm::new(&RunOutput {
            stdout: "hi\n".into(),
            stderr: "  \n".into(),
            compile_output: Some(String::new()),
            time_seconds: Some(0.0123),
            memory_kb: Some(2048),
        });
        assert_eq!(vm.stdout, "hi\n");
        assert!(vm.stderr.is_none());
        assert!(vm.compile_output.is_none());
        assert_eq!(vm.stats_label.as_deref(), Some("0.012 s, 2048 KB"));
    }

    #[test]
    fn grade_report_lists_cases() {
        let vm = GradeVm::new(&GradeReport {
            passed: 1,
            total: 2,
            score: 50,
            results: vec![
                TestCaseResult {
                    input: Some("1".into()),
                    expected_output: Some("1".into()),
                    actual_output: Some("1".into()),
                    passed: true,
                },
                TestCaseResult {
                    input: None,
                    expected_output: None,
                    actual_output: Some("oops".into()),
                    passed: false,
                },
            ],
        });
        assert_eq!(vm.summary, "1 of 2 tests passed (50%)");
        assert_eq!(vm.cases[1].label, "Test 2");
        assert!(!vm.cases[1].passed);
    }
}
