mod coding_vm;
mod frame_vm;
mod item_vm;
mod results_vm;
mod time_fmt;

pub use coding_vm::{CaseVm, GradeVm, RunOutputVm, language_options};
pub use frame_vm::{
    FramePhase, FrameVm, OverlayVm, budget_label, error_notice, item_noun, submission_label,
};
pub use item_vm::{NavEntryVm, NavState, WordCountVm, nav_palette};
pub use results_vm::{ResultVm, map_result_rows, outcome_label, test_type_label};
pub use time_fmt::{TimerTone, format_countdown, format_datetime, format_duration};
