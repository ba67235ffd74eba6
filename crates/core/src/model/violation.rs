use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ways of leaving the assessment context that count toward escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Document visibility became hidden.
    TabSwitch,
    /// The window lost focus.
    WindowBlur,
    /// The pointer left the document with no related target.
    MouseLeave,
}

impl ViolationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TabSwitch => "tab_switch",
            Self::WindowBlur => "window_blur",
            Self::MouseLeave => "mouse_leave",
        }
    }

    /// Text shown in the blocking warning.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::TabSwitch => "You switched to another tab.",
            Self::WindowBlur => "The test window lost focus.",
            Self::MouseLeave => "Your pointer left the test window.",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single detected integrity violation. Counted, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub at: DateTime<Utc>,
}

impl Violation {
    #[must_use]
    pub fn new(kind: ViolationKind, at: DateTime<Utc>) -> Self {
        Self { kind, at }
    }
}
