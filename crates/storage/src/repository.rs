use async_trait::async_trait;
use assess_core::model::{
    AssessmentItem, AttemptId, AttemptResult, CodingProblem, ItemId, McqQuestion, ParagraphPrompt,
    TestType,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Source of assessment items. Every listing is ordered by item id.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist or replace a multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_mcq(&self, question: &McqQuestion) -> Result<(), StorageError>;

    /// Persist or replace a coding problem.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the problem cannot be stored.
    async fn upsert_coding(&self, problem: &CodingProblem) -> Result<(), StorageError>;

    /// Persist or replace a paragraph prompt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the prompt cannot be stored.
    async fn upsert_paragraph(&self, prompt: &ParagraphPrompt) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failure.
    async fn mcq_questions(&self) -> Result<Vec<McqQuestion>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failure.
    async fn coding_problems(&self) -> Result<Vec<CodingProblem>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failure.
    async fn paragraph_prompts(&self) -> Result<Vec<ParagraphPrompt>, StorageError>;
}

/// Append-only store of finished attempts.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Store a finished attempt and return its row id.
    ///
    /// Appending the same attempt twice returns the id of the first row and
    /// leaves it untouched, so a retried submission is never duplicated.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the result cannot be stored.
    async fn append_result(&self, result: &AttemptResult) -> Result<i64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failure.
    async fn get_result(&self, attempt: AttemptId) -> Result<Option<AttemptResult>, StorageError>;

    /// Most recent results first, optionally filtered by test type.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failure.
    async fn list_results(
        &self,
        test_type: Option<TestType>,
        limit: u32,
    ) -> Result<Vec<AttemptResult>, StorageError>;
}

#[derive(Default)]
struct Items {
    mcq: BTreeMap<ItemId, McqQuestion>,
    coding: BTreeMap<ItemId, CodingProblem>,
    paragraph: BTreeMap<ItemId, ParagraphPrompt>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    items: Arc<Mutex<Items>>,
    results: Arc<Mutex<Vec<AttemptResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> Result<std::sync::MutexGuard<'_, Items>, StorageError> {
        self.items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ItemRepository for InMemoryRepository {
    async fn upsert_mcq(&self, question: &McqQuestion) -> Result<(), StorageError> {
        self.items()?.mcq.insert(question.id(), question.clone());
        Ok(())
    }

    async fn upsert_coding(&self, problem: &CodingProblem) -> Result<(), StorageError> {
        self.items()?.coding.insert(problem.id(), problem.clone());
        Ok(())
    }

    async fn upsert_paragraph(&self, prompt: &ParagraphPrompt) -> Result<(), StorageError> {
        self.items()?.paragraph.insert(prompt.id(), prompt.clone());
        Ok(())
    }

    async fn mcq_questions(&self) -> Result<Vec<McqQuestion>, StorageError> {
        Ok(self.items()?.mcq.values().cloned().collect())
    }

    async fn coding_problems(&self) -> Result<Vec<CodingProblem>, StorageError> {
        Ok(self.items()?.coding.values().cloned().collect())
    }

    async fn paragraph_prompts(&self) -> Result<Vec<ParagraphPrompt>, StorageError> {
        Ok(self.items()?.paragraph.values().cloned().collect())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &AttemptResult) -> Result<i64, StorageError> {
        let mut guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let position = match guard
            .iter()
            .position(|stored| stored.attempt_id == result.attempt_id)
        {
            Some(existing) => existing,
            None => {
                guard.push(result.clone());
                guard.len() - 1
            }
        };
        i64::try_from(position + 1).map_err(|_| StorageError::Serialization("id overflow".into()))
    }

    async fn get_result(&self, attempt: AttemptId) -> Result<Option<AttemptResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().find(|r| r.attempt_id == attempt).cloned())
    }

    async fn list_results(
        &self,
        test_type: Option<TestType>,
        limit: u32,
    ) -> Result<Vec<AttemptResult>, StorageError> {
        let guard = self
            .results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(guard
            .iter()
            .rev()
            .filter(|r| test_type.is_none_or(|t| r.test_type == t))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Aggregates item and result repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub items: Arc<dyn ItemRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let items: Arc<dyn ItemRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self { items, results }
    }
}
