use assess_core::model::{AssessmentItem, CodingProblem, McqQuestion, McqOption, ParagraphPrompt};

use super::SqliteRepository;
use super::mapping::{
    conn, item_id_to_i64, map_coding_row, map_mcq_row, map_paragraph_row, starter_code_to_json,
    test_cases_to_json,
};
use crate::repository::{ItemRepository, StorageError};

#[async_trait::async_trait]
impl ItemRepository for SqliteRepository {
    async fn upsert_mcq(&self, question: &McqQuestion) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO mcq_questions (id, question, option_a, option_b, option_c, option_d, correct_answer)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                question = excluded.question,
                option_a = excluded.option_a,
                option_b = excluded.option_b,
                option_c = excluded.option_c,
                option_d = excluded.option_d,
                correct_answer = excluded.correct_answer
            ",
        )
        .bind(item_id_to_i64(question.id())?)
        .bind(question.question())
        .bind(question.option(McqOption::A))
        .bind(question.option(McqOption::B))
        .bind(question.option(McqOption::C))
        .bind(question.option(McqOption::D))
        .bind(question.correct().letter())
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn upsert_coding(&self, problem: &CodingProblem) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO coding_problems (id, title, prompt, starter_code, test_cases)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                prompt = excluded.prompt,
                starter_code = excluded.starter_code,
                test_cases = excluded.test_cases
            ",
        )
        .bind(item_id_to_i64(problem.id())?)
        .bind(problem.title())
        .bind(problem.prompt())
        .bind(starter_code_to_json(problem.starter_code())?)
        .bind(test_cases_to_json(problem.test_cases())?)
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn upsert_paragraph(&self, prompt: &ParagraphPrompt) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO paragraph_prompts (id, prompt, word_limit)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                prompt = excluded.prompt,
                word_limit = excluded.word_limit
            ",
        )
        .bind(item_id_to_i64(prompt.id())?)
        .bind(prompt.prompt())
        .bind(i64::from(prompt.word_limit()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }

    async fn mcq_questions(&self) -> Result<Vec<McqQuestion>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, question, option_a, option_b, option_c, option_d, correct_answer
            FROM mcq_questions
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_mcq_row).collect()
    }

    async fn coding_problems(&self) -> Result<Vec<CodingProblem>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, prompt, starter_code, test_cases
            FROM coding_problems
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_coding_row).collect()
    }

    async fn paragraph_prompts(&self) -> Result<Vec<ParagraphPrompt>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, prompt, word_limit
            FROM paragraph_prompts
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_paragraph_row).collect()
    }
}
