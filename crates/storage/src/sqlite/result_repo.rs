use assess_core::model::{AttemptId, AttemptResult, TestType};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, map_result_row, ser};
use crate::repository::{ResultRepository, StorageError};

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn append_result(&self, result: &AttemptResult) -> Result<i64, StorageError> {
        let attempt_id = result.attempt_id.to_string();

        sqlx::query(
            r"
            INSERT INTO attempt_results (
                attempt_id, test_type, score, total_items, answered, skipped,
                violation_count, outcome, elapsed_secs, started_at, finished_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(attempt_id) DO NOTHING
            ",
        )
        .bind(&attempt_id)
        .bind(result.test_type.as_str())
        .bind(i64::from(result.score))
        .bind(i64::from(result.total_items))
        .bind(i64::from(result.answered))
        .bind(i64::from(result.skipped))
        .bind(i64::from(result.violation_count))
        .bind(result.outcome.as_str())
        .bind(i64::from(result.elapsed_secs))
        .bind(result.started_at)
        .bind(result.finished_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let row = sqlx::query("SELECT id FROM attempt_results WHERE attempt_id = ?1")
            .bind(&attempt_id)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        row.try_get("id").map_err(ser)
    }

    async fn get_result(&self, attempt: AttemptId) -> Result<Option<AttemptResult>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT attempt_id, test_type, score, total_items, answered, skipped,
                   violation_count, outcome, elapsed_secs, started_at, finished_at
            FROM attempt_results
            WHERE attempt_id = ?1
            ",
        )
        .bind(attempt.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_result_row).transpose()
    }

    async fn list_results(
        &self,
        test_type: Option<TestType>,
        limit: u32,
    ) -> Result<Vec<AttemptResult>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT attempt_id, test_type, score, total_items, answered, skipped,
                   violation_count, outcome, elapsed_secs, started_at, finished_at
            FROM attempt_results
            WHERE ?1 IS NULL OR test_type = ?1
            ORDER BY finished_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(test_type.map(TestType::as_str))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}
