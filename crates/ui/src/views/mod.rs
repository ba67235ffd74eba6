mod coding;
mod home;
mod mcq;
mod paragraph;
mod results;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use coding::CodingView;
pub use home::{HomeView, ResultList};
pub use mcq::{McqCard, McqView};
pub use paragraph::{ParagraphEditor, ParagraphView};
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
