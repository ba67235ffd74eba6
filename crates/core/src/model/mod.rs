mod attempt;
mod ids;
mod item;
mod response;
mod violation;

pub use attempt::{AttemptOutcome, AttemptResult, TestType};
pub use ids::{AttemptId, ItemId, ParseIdError};
pub use item::{
    AssessmentItem, CodingProblem, ItemError, Language, McqOption, McqQuestion, ParagraphPrompt,
    TestCase,
};
pub use response::{CodeDraft, TextStats};
pub use violation::{Violation, ViolationKind};
