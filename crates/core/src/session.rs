//! Test session state machine.
//!
//! A [`Session`] is advanced only through [`Session::apply`], which maps
//! `(state, event)` to a new state plus a list of [`SessionEffect`]s for the
//! owner to carry out (start/stop the countdown, hand off the result).
//! Nothing here touches a clock, a timer or the network.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AssessmentItem, AttemptId, AttemptOutcome, ItemId, TestType, Violation};
use crate::variant::{Score, Variant};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    NotStarted,
    Running,
    Paused,
    Completed,
    Expired,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseReason {
    Violation,
    FullscreenExit,
}

/// Events the session reacts to. `R` is the variant's response type.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent<R> {
    Start,
    /// The countdown reported a new remaining value.
    Tick { remaining: u32 },
    /// The countdown reached zero.
    Expire,
    FirstViolation(Violation),
    SecondViolation(Violation),
    FocusReturned,
    /// The candidate dismissed the blocking warning.
    Acknowledge,
    FullscreenChanged { active: bool },
    Submit,
    Next,
    Previous,
    Skip,
    Jump(usize),
    Record { item: ItemId, response: R },
    /// An external grader scored one item, as a percentage.
    Grade { item: ItemId, percent: u8 },
}

impl<R> SessionEvent<R> {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Tick { .. } => "tick",
            Self::Expire => "expire",
            Self::FirstViolation(_) => "first_violation",
            Self::SecondViolation(_) => "second_violation",
            Self::FocusReturned => "focus_returned",
            Self::Acknowledge => "acknowledge",
            Self::FullscreenChanged { .. } => "fullscreen_changed",
            Self::Submit => "submit",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Skip => "skip",
            Self::Jump(_) => "jump",
            Self::Record { .. } => "record",
            Self::Grade { .. } => "grade",
        }
    }
}

/// Work the session owner must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect<R> {
    StartTimer { seconds: u32 },
    StopTimer,
    Finalize(Box<Finalization<R>>),
}

/// Everything needed to score and hand off a terminated attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Finalization<R> {
    pub attempt_id: AttemptId,
    pub test_type: TestType,
    pub outcome: AttemptOutcome,
    pub score: Score,
    pub responses: HashMap<ItemId, R>,
    pub total_items: u32,
    pub answered: u32,
    pub skipped: u32,
    pub violation_count: u8,
    pub elapsed_secs: u32,
}

/// Read-only view of a session for rendering and assertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub attempt_id: AttemptId,
    pub test_type: TestType,
    pub status: SessionStatus,
    pub pause_reason: Option<PauseReason>,
    pub budget_secs: u32,
    pub remaining_secs: u32,
    pub current_index: usize,
    pub total_items: usize,
    pub answered: usize,
    pub skipped: Vec<usize>,
    pub violation_count: u8,
    pub fullscreen_required: bool,
    pub fullscreen_active: bool,
    pub load_error: Option<String>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

pub struct Session<V: Variant> {
    id: AttemptId,
    variant: V,
    status: SessionStatus,
    pause_reason: Option<PauseReason>,
    budget: u32,
    remaining: u32,
    items: Vec<V::Item>,
    current: usize,
    responses: HashMap<ItemId, V::Response>,
    skipped: BTreeSet<usize>,
    grades: HashMap<ItemId, u8>,
    violation_count: u8,
    fullscreen_required: bool,
    fullscreen_active: bool,
    load_error: Option<String>,
}

impl<V: Variant> Session<V> {
    /// An empty session with the variant's default budget.
    #[must_use]
    pub fn new(variant: V) -> Self {
        Self {
            id: AttemptId::generate(),
            variant,
            status: SessionStatus::NotStarted,
            pause_reason: None,
            budget: V::BUDGET_SECS,
            remaining: V::BUDGET_SECS,
            items: Vec::new(),
            current: 0,
            responses: HashMap::new(),
            skipped: BTreeSet::new(),
            grades: HashMap::new(),
            violation_count: 0,
            fullscreen_required: false,
            fullscreen_active: false,
            load_error: None,
        }
    }

    /// Override the time budget. Ignored once the session has started.
    #[must_use]
    pub fn with_budget(mut self, seconds: u32) -> Self {
        if self.status == SessionStatus::NotStarted {
            self.budget = seconds;
            self.remaining = seconds;
        }
        self
    }

    /// Require fullscreen before starting and while running. Only proctored
    /// variants honor it.
    #[must_use]
    pub fn with_fullscreen_required(mut self, required: bool) -> Self {
        self.fullscreen_required = required && V::PROCTORED;
        self
    }

    /// Populate items fetched by the item collaborator. An empty list is
    /// recorded as a load error and blocks `Start`.
    pub fn load_items(&mut self, items: Vec<V::Item>) {
        if self.status != SessionStatus::NotStarted {
            return;
        }
        if items.is_empty() {
            self.load_error = Some("no items available for this test".to_string());
        } else {
            self.load_error = None;
        }
        self.items = items;
        self.current = 0;
    }

    /// Record that the item collaborator failed.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        if self.status == SessionStatus::NotStarted {
            self.load_error = Some(message.into());
        }
    }

    //
    // ─── ACCESSORS ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn variant(&self) -> &V {
        &self.variant
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn pause_reason(&self) -> Option<PauseReason> {
        self.pause_reason
    }

    #[must_use]
    pub fn budget_secs(&self) -> u32 {
        self.budget
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    /// Seconds spent running. Paused time is never included.
    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.budget.saturating_sub(self.remaining)
    }

    #[must_use]
    pub fn items(&self) -> &[V::Item] {
        &self.items
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_item(&self) -> Option<&V::Item> {
        self.items.get(self.current)
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&V::Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn response(&self, id: ItemId) -> Option<&V::Response> {
        self.responses.get(&id)
    }

    #[must_use]
    pub fn responses(&self) -> &HashMap<ItemId, V::Response> {
        &self.responses
    }

    #[must_use]
    pub fn grade(&self, id: ItemId) -> Option<u8> {
        self.grades.get(&id).copied()
    }

    #[must_use]
    pub fn grades(&self) -> &HashMap<ItemId, u8> {
        &self.grades
    }

    #[must_use]
    pub fn skipped(&self) -> &BTreeSet<usize> {
        &self.skipped
    }

    #[must_use]
    pub fn violation_count(&self) -> u8 {
        self.violation_count
    }

    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    #[must_use]
    pub fn can_start(&self) -> bool {
        self.status == SessionStatus::NotStarted
            && !self.items.is_empty()
            && self.load_error.is_none()
            && self.fullscreen_gate_open()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            attempt_id: self.id,
            test_type: V::TEST_TYPE,
            status: self.status,
            pause_reason: self.pause_reason,
            budget_secs: self.budget,
            remaining_secs: self.remaining,
            current_index: self.current,
            total_items: self.items.len(),
            answered: self.responses.len(),
            skipped: self.skipped.iter().copied().collect(),
            violation_count: self.violation_count,
            fullscreen_required: self.fullscreen_required,
            fullscreen_active: self.fullscreen_active,
            load_error: self.load_error.clone(),
        }
    }

    //
    // ─── REDUCER ──────────────────────────────────────────────────────────────
    //

    /// Apply one event. Events that are invalid in the current state are
    /// ignored and produce no effects; terminal sessions ignore everything.
    pub fn apply(&mut self, event: SessionEvent<V::Response>) -> Vec<SessionEffect<V::Response>> {
        if self.status.is_terminal() {
            return Vec::new();
        }

        match event {
            SessionEvent::Start => self.start(),
            SessionEvent::Tick { remaining } => {
                if self.status == SessionStatus::Running {
                    self.remaining = self.remaining.min(remaining);
                }
                Vec::new()
            }
            SessionEvent::Expire => self.expire(),
            SessionEvent::FirstViolation(_) => self.first_violation(),
            SessionEvent::SecondViolation(_) => self.second_violation(),
            SessionEvent::FocusReturned | SessionEvent::Acknowledge => self.resume(),
            SessionEvent::FullscreenChanged { active } => self.fullscreen_changed(active),
            SessionEvent::Submit => {
                if self.status == SessionStatus::Running {
                    self.finish(SessionStatus::Completed, AttemptOutcome::Submitted)
                } else {
                    Vec::new()
                }
            }
            SessionEvent::Next => {
                if self.status == SessionStatus::Running {
                    self.step_forward();
                }
                Vec::new()
            }
            SessionEvent::Previous => {
                if self.status == SessionStatus::Running {
                    self.current = self.current.saturating_sub(1);
                }
                Vec::new()
            }
            SessionEvent::Skip => {
                if self.status == SessionStatus::Running {
                    self.skipped.insert(self.current);
                    self.step_forward();
                }
                Vec::new()
            }
            SessionEvent::Jump(index) => {
                if self.status == SessionStatus::Running && index < self.items.len() {
                    self.current = index;
                }
                Vec::new()
            }
            SessionEvent::Record { item, response } => {
                if self.status == SessionStatus::Running && self.item(item).is_some() {
                    if self.responses.get(&item) != Some(&response) {
                        self.grades.remove(&item);
                    }
                    self.responses.insert(item, response);
                }
                Vec::new()
            }
            SessionEvent::Grade { item, percent } => {
                if self.status.is_active() && self.item(item).is_some() {
                    self.grades.insert(item, percent.min(100));
                }
                Vec::new()
            }
        }
    }

    fn fullscreen_gate_open(&self) -> bool {
        !self.fullscreen_required || self.fullscreen_active
    }

    fn step_forward(&mut self) {
        if self.current + 1 < self.items.len() {
            self.current += 1;
        }
    }

    fn start(&mut self) -> Vec<SessionEffect<V::Response>> {
        if !self.can_start() {
            return Vec::new();
        }
        self.status = SessionStatus::Running;
        self.remaining = self.budget;
        vec![SessionEffect::StartTimer {
            seconds: self.remaining,
        }]
    }

    fn expire(&mut self) -> Vec<SessionEffect<V::Response>> {
        if self.status != SessionStatus::Running {
            return Vec::new();
        }
        self.remaining = 0;
        self.finish(SessionStatus::Expired, AttemptOutcome::TimedOut)
    }

    fn first_violation(&mut self) -> Vec<SessionEffect<V::Response>> {
        if !V::PROCTORED || !self.status.is_active() {
            return Vec::new();
        }
        self.violation_count = self.violation_count.max(1);
        if self.status == SessionStatus::Paused {
            self.pause_reason = Some(PauseReason::Violation);
            return Vec::new();
        }
        self.pause(PauseReason::Violation)
    }

    fn second_violation(&mut self) -> Vec<SessionEffect<V::Response>> {
        if !V::PROCTORED || !self.status.is_active() {
            return Vec::new();
        }
        self.violation_count = 2;
        self.finish(SessionStatus::Completed, AttemptOutcome::ForcedByViolations)
    }

    fn fullscreen_changed(&mut self, active: bool) -> Vec<SessionEffect<V::Response>> {
        self.fullscreen_active = active;
        if !self.fullscreen_required {
            return Vec::new();
        }
        if active {
            self.resume()
        } else {
            self.pause(PauseReason::FullscreenExit)
        }
    }

    fn pause(&mut self, reason: PauseReason) -> Vec<SessionEffect<V::Response>> {
        if self.status != SessionStatus::Running {
            return Vec::new();
        }
        self.status = SessionStatus::Paused;
        self.pause_reason = Some(reason);
        vec![SessionEffect::StopTimer]
    }

    fn resume(&mut self) -> Vec<SessionEffect<V::Response>> {
        if self.status != SessionStatus::Paused {
            return Vec::new();
        }
        if !self.fullscreen_gate_open() {
            self.pause_reason = Some(PauseReason::FullscreenExit);
            return Vec::new();
        }
        self.status = SessionStatus::Running;
        self.pause_reason = None;
        vec![SessionEffect::StartTimer {
            seconds: self.remaining,
        }]
    }

    fn finish(
        &mut self,
        terminal: SessionStatus,
        outcome: AttemptOutcome,
    ) -> Vec<SessionEffect<V::Response>> {
        self.status = terminal;
        self.pause_reason = None;
        let score = self
            .variant
            .score(&self.items, &self.responses, &self.grades);
        let finalization = Finalization {
            attempt_id: self.id,
            test_type: V::TEST_TYPE,
            outcome,
            score,
            responses: self.responses.clone(),
            total_items: count_u32(self.items.len()),
            answered: count_u32(self.responses.len()),
            skipped: count_u32(self.skipped.len()),
            violation_count: self.violation_count,
            elapsed_secs: self.elapsed_secs(),
        };
        vec![
            SessionEffect::StopTimer,
            SessionEffect::Finalize(Box::new(finalization)),
        ]
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl<V: Variant> fmt::Debug for Session<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("variant", &self.variant)
            .field("status", &self.status)
            .field("remaining", &self.remaining)
            .field("items_len", &self.items.len())
            .field("current", &self.current)
            .field("responses_len", &self.responses.len())
            .field("violation_count", &self.violation_count)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
