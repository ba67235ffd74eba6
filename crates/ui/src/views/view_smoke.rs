use assess_core::model::{AttemptId, AttemptOutcome, AttemptResult, TestType};
use assess_core::time::fixed_now;
use services::config::BudgetConfig;

use super::test_harness::{ViewKind, setup_view_harness};

fn result(test_type: TestType, score: u8, outcome: AttemptOutcome) -> AttemptResult {
    AttemptResult {
        attempt_id: AttemptId::generate(),
        test_type,
        score,
        total_items: 3,
        answered: 3,
        skipped: 0,
        violation_count: 0,
        outcome,
        elapsed_secs: 90,
        started_at: fixed_now(),
        finished_at: fixed_now(),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_lists_tests_with_budgets() {
    let budgets = BudgetConfig {
        mcq_secs: 600,
        ..BudgetConfig::default()
    };
    let mut harness = setup_view_harness(ViewKind::Home, budgets);
    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("Multiple choice"), "{html}");
    assert!(html.contains("Time limit: 10 minutes"));
    assert!(html.contains("Time limit: 45 minutes"));
    assert!(html.contains("Time limit: 25 minutes"));
    assert_eq!(html.matches("Proctored").count(), 2);
    assert!(html.contains("No attempts yet."));
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_renders_stored_attempts() {
    let mut harness = setup_view_harness(ViewKind::Results, BudgetConfig::default());
    harness
        .storage
        .results
        .append_result(&result(TestType::Mcq, 67, AttemptOutcome::Submitted))
        .await
        .expect("append result");
    harness
        .storage
        .results
        .append_result(&result(TestType::Coding, 40, AttemptOutcome::TimedOut))
        .await
        .expect("append result");

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("67%"), "{html}");
    assert!(html.contains("40%"));
    assert!(html.contains("Time ran out"));
    let coding = html.find("40%").expect("coding row");
    let mcq = html.find("67%").expect("mcq row");
    assert!(coding < mcq, "newest attempt first");
}
