//! Running assessments: a controller task per attempt, a cloneable handle
//! to drive it, and the per-variant service hooks.

mod controller;
mod handle;
mod variant;

pub use controller::{AssessmentSnapshot, SubmissionState};
pub use handle::{AssessmentHandle, AssessmentOptions, Collaborators};
pub use variant::{AssessmentVariant, Graders};
