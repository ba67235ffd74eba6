use std::sync::Arc;

use tracing::info;

use assess_core::guard::{GuardHost, GuardPolicy};
use assess_core::model::{AttemptResult, TestType};
use storage::demo;
use storage::repository::{Storage, StorageError};

use crate::Clock;
use crate::assessment::{AssessmentHandle, AssessmentOptions, AssessmentVariant, Collaborators};
use crate::config::BudgetConfig;
use crate::error::AppServicesError;
use crate::execution::{CodeExecutor, HttpCodeExecutor};
use crate::fullscreen::FullscreenControl;
use crate::text_grading::{TextGrader, text_grader_from_env};

/// Assembles storage and external collaborators and opens assessments
/// against them.
#[derive(Clone)]
pub struct AssessmentServices {
    storage: Storage,
    executor: Arc<dyn CodeExecutor>,
    text_grader: Arc<dyn TextGrader>,
    budgets: BudgetConfig,
    policy: GuardPolicy,
    clock: Clock,
}

impl AssessmentServices {
    /// Build services backed by `SQLite` storage, with collaborators and
    /// budgets read from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or demo seeding fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        seed_demo: bool,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        if seed_demo {
            let report = demo::seed_if_empty(&storage).await?;
            if !report.is_empty() {
                info!(
                    mcq = report.mcq,
                    coding = report.coding,
                    paragraph = report.paragraph,
                    "seeded demo items"
                );
            }
        }

        let executor = HttpCodeExecutor::from_env();
        if !executor.enabled() {
            info!("code execution is not configured; run and submit are disabled");
        }

        Ok(Self::new(
            storage,
            Arc::new(executor),
            text_grader_from_env(),
            BudgetConfig::from_env(),
            clock,
        ))
    }

    #[must_use]
    pub fn new(
        storage: Storage,
        executor: Arc<dyn CodeExecutor>,
        text_grader: Arc<dyn TextGrader>,
        budgets: BudgetConfig,
        clock: Clock,
    ) -> Self {
        Self {
            storage,
            executor,
            text_grader,
            budgets,
            policy: GuardPolicy::default(),
            clock,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: GuardPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn budgets(&self) -> BudgetConfig {
        self.budgets
    }

    #[must_use]
    pub fn collaborators(&self, fullscreen: Arc<dyn FullscreenControl>) -> Collaborators {
        Collaborators {
            items: Arc::clone(&self.storage.items),
            results: Arc::clone(&self.storage.results),
            executor: Arc::clone(&self.executor),
            text_grader: Arc::clone(&self.text_grader),
            fullscreen,
        }
    }

    /// Load items for `V` and spawn its controller with the configured budget.
    pub async fn open<V: AssessmentVariant>(
        &self,
        host: Box<dyn GuardHost + Send>,
        fullscreen: Arc<dyn FullscreenControl>,
        fullscreen_required: bool,
    ) -> AssessmentHandle<V> {
        let options = AssessmentOptions {
            budget_secs: Some(self.budgets.for_test_type(V::TEST_TYPE)),
            fullscreen_required,
            policy: self.policy,
            clock: self.clock,
        };
        AssessmentHandle::open(host, &self.collaborators(fullscreen), options).await
    }

    /// Most recent attempts first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if results cannot be read.
    pub async fn recent_results(
        &self,
        test_type: Option<TestType>,
        limit: u32,
    ) -> Result<Vec<AttemptResult>, StorageError> {
        self.storage.results.list_results(test_type, limit).await
    }
}
