//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::ItemId;
use storage::demo::SeedError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the code-execution client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecutionError {
    #[error("code execution is not configured")]
    Disabled,
    #[error("code execution returned an empty response")]
    EmptyResponse,
    #[error("code execution request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("code execution returned an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the text-quality grader.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TextGradingError {
    #[error("text grading request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors surfaced by a running assessment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment is unavailable: {0}")]
    Unavailable(String),
    #[error("fullscreen was denied; the test cannot start")]
    FullscreenDenied,
    #[error("assessment is not running")]
    NotRunning,
    #[error("assessment controller has shut down")]
    Closed,
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    #[error("no response recorded for item {0}")]
    NoResponse(ItemId),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Seed(#[from] SeedError),
}
