#![forbid(unsafe_code)]

pub mod app_services;
pub mod assessment;
pub mod config;
pub mod error;
pub mod execution;
pub mod fullscreen;
pub mod text_grading;
pub mod timer;

pub use assess_core::Clock;

pub use app_services::AssessmentServices;
pub use assessment::{
    AssessmentHandle, AssessmentOptions, AssessmentSnapshot, AssessmentVariant, Collaborators,
    SubmissionState,
};
pub use error::{AppServicesError, AssessmentError, ExecutionError, TextGradingError};
