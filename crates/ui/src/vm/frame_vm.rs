use assess_core::model::{TestType, Violation};
use assess_core::session::{PauseReason, SessionSnapshot, SessionStatus};
use assess_core::variant::Variant;
use services::{AssessmentError, AssessmentSnapshot, SubmissionState};

use crate::vm::results_vm::{ResultVm, test_type_label};
use crate::vm::time_fmt::{TimerTone, format_countdown};

/// Strikes allowed before the test is submitted on the candidate's behalf.
const STRIKE_LIMIT: u8 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FramePhase {
    Unavailable(String),
    Intro,
    Running,
    Paused,
    Finished,
}

/// Blocking panel shown over the items while the session is paused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayVm {
    Warning { title: String, message: String },
    FullscreenExit { message: String },
}

/// Everything the proctor frame renders around the items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameVm {
    pub phase: FramePhase,
    pub title: String,
    pub timer_label: String,
    pub timer_class: &'static str,
    pub progress_label: String,
    pub answered_label: String,
    pub strikes_label: Option<String>,
    pub budget_label: String,
    pub rules: Vec<&'static str>,
    pub fullscreen_required: bool,
    pub overlay: Option<OverlayVm>,
    pub result: Option<ResultVm>,
    pub submission_label: Option<String>,
    pub can_retry: bool,
}

impl FrameVm {
    #[must_use]
    pub fn new<V: Variant>(snapshot: &AssessmentSnapshot<V::Response>) -> Self {
        let session = &snapshot.session;
        let phase = phase_of(session);
        let overlay = if session.status == SessionStatus::Paused {
            session
                .pause_reason
                .map(|reason| overlay_for(reason, snapshot.warning.as_ref()))
        } else {
            None
        };
        let strikes_label = V::PROCTORED
            .then(|| format!("Warnings: {} of {STRIKE_LIMIT}", session.violation_count));

        Self {
            phase,
            title: format!("{} test", test_type_label(session.test_type)),
            timer_label: format_countdown(session.remaining_secs),
            timer_class: TimerTone::of(session.remaining_secs, session.budget_secs).class(),
            progress_label: progress_label(session),
            answered_label: answered_label(session),
            strikes_label,
            budget_label: budget_label(session.budget_secs),
            rules: rules(V::PROCTORED, session.fullscreen_required),
            fullscreen_required: session.fullscreen_required,
            overlay,
            result: snapshot.result.as_ref().map(ResultVm::new),
            submission_label: submission_label(&snapshot.submission),
            can_retry: matches!(snapshot.submission, SubmissionState::Failed { .. }),
        }
    }
}

fn phase_of(session: &SessionSnapshot) -> FramePhase {
    if let Some(message) = &session.load_error {
        return FramePhase::Unavailable(message.clone());
    }
    match session.status {
        SessionStatus::NotStarted => FramePhase::Intro,
        SessionStatus::Running => FramePhase::Running,
        SessionStatus::Paused => FramePhase::Paused,
        SessionStatus::Completed | SessionStatus::Expired => FramePhase::Finished,
    }
}

fn overlay_for(reason: PauseReason, warning: Option<&Violation>) -> OverlayVm {
    match reason {
        PauseReason::Violation => {
            let what = warning.map_or("An integrity violation was detected.", |v| {
                v.kind.describe()
            });
            OverlayVm::Warning {
                title: "Integrity warning".to_owned(),
                message: format!(
                    "{what} This is your first warning. A second violation submits the test automatically."
                ),
            }
        }
        PauseReason::FullscreenExit => OverlayVm::FullscreenExit {
            message: "The test was paused because fullscreen ended. Return to fullscreen to continue."
                .to_owned(),
        },
    }
}

#[must_use]
pub fn item_noun(test_type: TestType) -> &'static str {
    match test_type {
        TestType::Mcq => "Question",
        TestType::Coding => "Problem",
        TestType::Paragraph => "Prompt",
    }
}

fn progress_label(session: &SessionSnapshot) -> String {
    if session.total_items == 0 {
        return "No items".to_owned();
    }
    format!(
        "{} {} of {}",
        item_noun(session.test_type),
        session.current_index + 1,
        session.total_items
    )
}

fn answered_label(session: &SessionSnapshot) -> String {
    match session.skipped.len() {
        0 => format!("{} answered", session.answered),
        skipped => format!("{} answered, {skipped} skipped", session.answered),
    }
}

#[must_use]
pub fn budget_label(seconds: u32) -> String {
    match (seconds / 60, seconds % 60) {
        (0, secs) => format!("{secs} seconds"),
        (1, 0) => "1 minute".to_owned(),
        (minutes, 0) => format!("{minutes} minutes"),
        (minutes, secs) => format!("{minutes} min {secs} s"),
    }
}

fn rules(proctored: bool, fullscreen: bool) -> Vec<&'static str> {
    let mut rules = vec!["The timer starts when you begin and does not stop for page changes."];
    if proctored {
        if fullscreen {
            rules.push("The test runs in fullscreen. Leaving fullscreen pauses it.");
        }
        rules.push("Stay on this tab and keep the window focused.");
        rules.push("Copy, paste, printing and developer tools are disabled.");
        rules.push("The first violation pauses the test with a warning.");
        rules.push("A second violation submits the test automatically.");
    }
    rules.push("Your answers are submitted automatically when time runs out.");
    rules
}

#[must_use]
pub fn submission_label(state: &SubmissionState) -> Option<String> {
    match state {
        SubmissionState::NotSubmitted => None,
        SubmissionState::Pending => Some("Saving your result...".to_owned()),
        SubmissionState::Submitted { .. } => Some("Your result has been saved.".to_owned()),
        SubmissionState::Failed { message } => {
            Some(format!("Your result could not be saved: {message}"))
        }
    }
}

/// Message shown in the notice bar when an action fails.
#[must_use]
pub fn error_notice(err: &AssessmentError) -> String {
    match err {
        AssessmentError::FullscreenDenied => {
            "Fullscreen is required for this test. Allow fullscreen and try again.".to_owned()
        }
        AssessmentError::Unavailable(message) => format!("The test is unavailable: {message}"),
        AssessmentError::NotRunning => "The test is not running.".to_owned(),
        AssessmentError::Closed => "The test has been closed.".to_owned(),
        AssessmentError::NoResponse(_) => "Write some code before running it.".to_owned(),
        AssessmentError::Execution(inner) => format!("Code execution failed: {inner}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use assess_core::model::{AttemptId, AttemptOutcome, AttemptResult, ViolationKind};
    use assess_core::time::fixed_now;
    use assess_core::variant::{Mcq, Paragraph};

    fn snapshot<R>(status: SessionStatus, test_type: TestType) -> AssessmentSnapshot<R> {
        AssessmentSnapshot {
            session: SessionSnapshot {
                attempt_id: AttemptId::generate(),
                test_type,
                status,
                pause_reason: None,
                budget_secs: 1800,
                remaining_secs: 1795,
                current_index: 1,
                total_items: 3,
                answered: 1,
                skipped: vec![0],
                violation_count: 0,
                fullscreen_required: true,
                fullscreen_active: true,
                load_error: None,
            },
            responses: HashMap::new(),
            grades: HashMap::new(),
            warning: None,
            submission: SubmissionState::NotSubmitted,
            result: None,
        }
    }

    #[test]
    fn running_frame_shows_timer_and_progress() {
        let vm = FrameVm::new::<Mcq>(&snapshot(SessionStatus::Running, TestType::Mcq));
        assert_eq!(vm.phase, FramePhase::Running);
        assert_eq!(vm.title, "Multiple choice test");
        assert_eq!(vm.timer_label, "29:55");
        assert_eq!(vm.timer_class, "timer");
        assert_eq!(vm.progress_label, "Question 2 of 3");
        assert_eq!(vm.answered_label, "1 answered, 1 skipped");
        assert_eq!(vm.strikes_label.as_deref(), Some("Warnings: 0 of 2"));
        assert_eq!(vm.budget_label, "30 minutes");
        assert!(vm.overlay.is_none());
    }

    #[test]
    fn paused_by_violation_names_the_kind() {
        let mut snap = snapshot(SessionStatus::Paused, TestType::Mcq);
        snap.session.pause_reason = Some(PauseReason::Violation);
        snap.session.violation_count = 1;
        snap.warning = Some(Violation::new(ViolationKind::TabSwitch, fixed_now()));

        let vm = FrameVm::new::<Mcq>(&snap);
        assert_eq!(vm.phase, FramePhase::Paused);
        match vm.overlay {
            Some(OverlayVm::Warning { message, .. }) => {
                assert!(message.starts_with("You switched to another tab."));
            }
            other => panic!("unexpected overlay {other:?}"),
        }
        assert_eq!(vm.strikes_label.as_deref(), Some("Warnings: 1 of 2"));
    }

    #[test]
    fn fullscreen_pause_has_its_own_overlay() {
        let mut snap = snapshot(SessionStatus::Paused, TestType::Mcq);
        snap.session.pause_reason = Some(PauseReason::FullscreenExit);
        let vm = FrameVm::new::<Mcq>(&snap);
        assert!(matches!(vm.overlay, Some(OverlayVm::FullscreenExit { .. })));
    }

    #[test]
    fn unproctored_frame_hides_strikes_and_guard_rules() {
        let mut snap = snapshot(SessionStatus::NotStarted, TestType::Paragraph);
        snap.session.fullscreen_required = false;
        snap.session.budget_secs = 1500;
        let vm = FrameVm::new::<Paragraph>(&snap);
        assert_eq!(vm.phase, FramePhase::Intro);
        assert!(vm.strikes_label.is_none());
        assert_eq!(vm.budget_label, "25 minutes");
        assert_eq!(vm.progress_label, "Prompt 2 of 3");
        assert!(!vm.rules.iter().any(|rule| rule.contains("violation")));
    }

    #[test]
    fn load_error_wins_over_status() {
        let mut snap = snapshot(SessionStatus::NotStarted, TestType::Mcq);
        snap.session.load_error = Some("could not load items".into());
        snap.session.total_items = 0;
        let vm = FrameVm::new::<Mcq>(&snap);
        assert_eq!(vm.phase, FramePhase::Unavailable("could not load items".into()));
        assert_eq!(vm.progress_label, "No items");
    }

    #[test]
    fn finished_frame_carries_result_and_retry() {
        let mut snap = snapshot(SessionStatus::Completed, TestType::Mcq);
        snap.submission = SubmissionState::Failed {
            message: "offline".into(),
        };
        snap.result = Some(AttemptResult {
            attempt_id: snap.session.attempt_id,
            test_type: TestType::Mcq,
            score: 67,
            total_items: 3,
            answered: 2,
            skipped: 1,
            violation_count: 0,
            outcome: AttemptOutcome::Submitted,
            elapsed_secs: 5,
            started_at: fixed_now(),
            finished_at: fixed_now(),
        });

        let vm = FrameVm::new::<Mcq>(&snap);
        assert_eq!(vm.phase, FramePhase::Finished);
        assert!(vm.can_retry);
        assert_eq!(
            vm.submission_label.as_deref(),
            Some("Your result could not be saved: offline")
        );
        assert_eq!(vm.result.map(|r| r.score_label).as_deref(), Some("67%"));
    }

    #[test]
    fn error_notices_are_readable() {
        assert!(error_notice(&AssessmentError::FullscreenDenied).starts_with("Fullscreen is required"));
        assert_eq!(
            error_notice(&AssessmentError::Unavailable("no items".into())),
            "The test is unavailable: no items"
        );
    }

    #[test]
    fn budget_labels() {
        assert_eq!(budget_label(45), "45 seconds");
        assert_eq!(budget_label(60), "1 minute");
        assert_eq!(budget_label(2700), "45 minutes");
        assert_eq!(budget_label(90), "1 min 30 s");
    }

    #[test]
    fn timer_turns_critical_in_the_last_minute() {
        let mut snap = snapshot(SessionStatus::Running, TestType::Mcq);
        snap.session.remaining_secs = 42;
        let vm = FrameVm::new::<Mcq>(&snap);
        assert_eq!(vm.timer_label, "00:42");
        assert_eq!(vm.timer_class, "timer timer-critical");
    }
}
