use std::collections::BTreeMap;

use assess_core::model::{
    AssessmentItem, AttemptId, AttemptOutcome, AttemptResult, CodingProblem, ItemId, Language,
    McqOption, McqQuestion, ParagraphPrompt, TestCase, TestType,
};
use assess_core::time::fixed_now;
use chrono::Duration;
use storage::demo;
use storage::repository::{ItemRepository, ResultRepository, Storage};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn result(test_type: TestType, score: u8, minutes_ago: i64) -> AttemptResult {
    let finished_at = fixed_now() - Duration::minutes(minutes_ago);
    AttemptResult {
        attempt_id: AttemptId::generate(),
        test_type,
        score,
        total_items: 4,
        answered: 3,
        skipped: 1,
        violation_count: 1,
        outcome: AttemptOutcome::ForcedByViolations,
        elapsed_secs: 600,
        started_at: finished_at - Duration::minutes(10),
        finished_at,
    }
}

#[tokio::test]
async fn sqlite_round_trips_all_item_kinds() {
    let repo = connect("memdb_items").await;

    let question = McqQuestion::new(
        ItemId::new(10),
        "Pick B",
        ["a".into(), "b".into(), "c".into(), "d".into()],
        McqOption::B,
    )
    .unwrap();
    repo.upsert_mcq(&question).await.unwrap();

    let mut starter = BTreeMap::new();
    starter.insert(Language::Python, "print()".to_string());
    starter.insert(Language::C, "int main(void) { return 0; }".to_string());
    let problem = CodingProblem::new(
        ItemId::new(3),
        "Echo",
        "Print the input",
        starter,
        vec![
            TestCase {
                input: "x".into(),
                expected_output: "x".into(),
                hidden: false,
            },
            TestCase {
                input: "y".into(),
                expected_output: "y".into(),
                hidden: true,
            },
        ],
    )
    .unwrap();
    repo.upsert_coding(&problem).await.unwrap();

    let prompt = ParagraphPrompt::new(ItemId::new(1), "Write about Rust", 150).unwrap();
    repo.upsert_paragraph(&prompt).await.unwrap();

    assert_eq!(repo.mcq_questions().await.unwrap(), vec![question]);
    assert_eq!(repo.coding_problems().await.unwrap(), vec![problem]);
    assert_eq!(repo.paragraph_prompts().await.unwrap(), vec![prompt]);
}

#[tokio::test]
async fn sqlite_upsert_replaces_and_orders_by_id() {
    let repo = connect("memdb_upsert").await;
    for (id, text) in [(2, "second"), (1, "first"), (2, "second again")] {
        let question = McqQuestion::new(
            ItemId::new(id),
            text,
            ["a".into(), "b".into(), "c".into(), "d".into()],
            McqOption::A,
        )
        .unwrap();
        repo.upsert_mcq(&question).await.unwrap();
    }

    let listed = repo.mcq_questions().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id(), ItemId::new(1));
    assert_eq!(listed[1].question(), "second again");
}

#[tokio::test]
async fn sqlite_results_append_once_and_filter() {
    let repo = connect("memdb_results").await;

    let old = result(TestType::Mcq, 40, 30);
    let coding = result(TestType::Coding, 75, 20);
    let recent = result(TestType::Mcq, 90, 10);

    let first_id = repo.append_result(&old).await.unwrap();
    assert_eq!(repo.append_result(&old).await.unwrap(), first_id);
    repo.append_result(&coding).await.unwrap();
    repo.append_result(&recent).await.unwrap();

    let all = repo.list_results(None, 10).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0], recent);

    let mcq = repo.list_results(Some(TestType::Mcq), 10).await.unwrap();
    assert_eq!(mcq, vec![recent.clone(), old.clone()]);

    assert_eq!(repo.get_result(coding.attempt_id).await.unwrap(), Some(coding));
    assert_eq!(repo.get_result(AttemptId::generate()).await.unwrap(), None);
}

#[tokio::test]
async fn demo_seed_fills_sqlite_storage() {
    let storage = Storage::sqlite("sqlite:file:memdb_seed?mode=memory&cache=shared")
        .await
        .expect("storage");

    let report = demo::seed_if_empty(&storage).await.unwrap();
    assert!(!report.is_empty());

    let problems = storage.items.coding_problems().await.unwrap();
    assert_eq!(problems.len(), report.coding);
    assert!(problems[0].test_cases().iter().any(|case| case.hidden));

    assert!(demo::seed_if_empty(&storage).await.unwrap().is_empty());
}
