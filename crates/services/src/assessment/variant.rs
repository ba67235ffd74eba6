//! Per-variant service hooks: where items come from and how a deferred
//! score is computed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use assess_core::model::{AssessmentItem, CodeDraft, ItemId};
use assess_core::variant::{Coding, Mcq, Paragraph, Variant, average_grade, percent};
use storage::repository::{ItemRepository, StorageError};

use crate::execution::{CodeExecutor, GradeRequest};
use crate::text_grading::{HeuristicTextGrader, TextGrader};

/// External graders a deferred score may call.
#[derive(Clone)]
pub struct Graders {
    pub text: Arc<dyn TextGrader>,
    pub code: Arc<dyn CodeExecutor>,
}

#[async_trait]
pub trait AssessmentVariant: Variant + Default {
    /// # Errors
    ///
    /// Returns `StorageError` when the item source fails.
    async fn load_items(items: &dyn ItemRepository) -> Result<Vec<Self::Item>, StorageError>;

    /// Score for variants whose session score is `Score::Deferred`.
    /// `grades` holds the percentages recorded during the attempt.
    async fn deferred_score(
        _items: &[Self::Item],
        _responses: &HashMap<ItemId, Self::Response>,
        _grades: &HashMap<ItemId, u8>,
        _graders: &Graders,
    ) -> u8 {
        0
    }
}

#[async_trait]
impl AssessmentVariant for Mcq {
    async fn load_items(items: &dyn ItemRepository) -> Result<Vec<Self::Item>, StorageError> {
        items.mcq_questions().await
    }
}

#[async_trait]
impl AssessmentVariant for Coding {
    async fn load_items(items: &dyn ItemRepository) -> Result<Vec<Self::Item>, StorageError> {
        items.coding_problems().await
    }

    /// Grades every recorded draft that has no grade yet, then averages.
    /// A blank draft or a failing grader scores zero for that problem.
    async fn deferred_score(
        items: &[Self::Item],
        responses: &HashMap<ItemId, CodeDraft>,
        grades: &HashMap<ItemId, u8>,
        graders: &Graders,
    ) -> u8 {
        let mut grades = grades.clone();
        for problem in items {
            let id = problem.id();
            if grades.contains_key(&id) {
                continue;
            }
            let Some(draft) = responses.get(&id) else {
                continue;
            };
            if draft.source.trim().is_empty() {
                continue;
            }
            match graders.code.grade(&GradeRequest::new(id, draft)).await {
                Ok(report) => {
                    grades.insert(id, report.score.min(100));
                }
                Err(err) => {
                    warn!(item = %id, error = %err, "grading a recorded draft failed");
                }
            }
        }
        average_grade(items, &grades)
    }
}

#[async_trait]
impl AssessmentVariant for Paragraph {
    async fn load_items(items: &dyn ItemRepository) -> Result<Vec<Self::Item>, StorageError> {
        items.paragraph_prompts().await
    }

    /// Mean of per-prompt grades. Blank answers score zero without a grader
    /// call; a failing grader falls back to the offline heuristic.
    async fn deferred_score(
        items: &[Self::Item],
        responses: &HashMap<ItemId, String>,
        _grades: &HashMap<ItemId, u8>,
        graders: &Graders,
    ) -> u8 {
        let mut total = 0_u64;
        for prompt in items {
            let text = responses.get(&prompt.id()).map_or("", String::as_str);
            if text.trim().is_empty() {
                continue;
            }
            let score = match graders.text.grade(prompt, text).await {
                Ok(grade) => grade.score.min(100),
                Err(err) => {
                    warn!(item = %prompt.id(), error = %err, "text grader failed; using heuristic");
                    HeuristicTextGrader::score(prompt, text)
                }
            };
            total += u64::from(score);
        }
        percent(total, 100 * items.len() as u64)
    }
}
