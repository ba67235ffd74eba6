use assess_core::model::{AssessmentItem, TextStats};
use services::AssessmentSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    Current,
    Answered,
    Skipped,
    Open,
}

impl NavState {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Current => "nav-item current",
            Self::Answered => "nav-item answered",
            Self::Skipped => "nav-item skipped",
            Self::Open => "nav-item",
        }
    }
}

/// One button in the question palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavEntryVm {
    pub index: usize,
    pub label: String,
    pub state: NavState,
}

/// The current item wins over answered, answered wins over skipped.
#[must_use]
pub fn nav_palette<I: AssessmentItem, R>(
    items: &[I],
    snapshot: &AssessmentSnapshot<R>,
) -> Vec<NavEntryVm> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let state = if index == snapshot.session.current_index {
                NavState::Current
            } else if snapshot.responses.contains_key(&item.id()) {
                NavState::Answered
            } else if snapshot.session.skipped.contains(&index) {
                NavState::Skipped
            } else {
                NavState::Open
            };
            NavEntryVm {
                index,
                label: (index + 1).to_string(),
                state,
            }
        })
        .collect()
}

/// Live feedback under a paragraph answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordCountVm {
    pub label: String,
    pub over_limit: bool,
}

impl WordCountVm {
    #[must_use]
    pub fn new(text: &str, word_limit: u32) -> Self {
        let stats = TextStats::of(text);
        Self {
            label: format!(
                "{} / {word_limit} words, {} characters",
                stats.words, stats.characters
            ),
            over_limit: stats.over_limit(word_limit),
        }
    }

    #[must_use]
    pub fn class(&self) -> &'static str {
        if self.over_limit {
            "word-count over-limit"
        } else {
            "word-count"
        }
    }
}
