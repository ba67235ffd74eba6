//! Integrity guard: classifies host events into suppressions and violations
//! and runs the two-strike escalation.
//!
//! The guard knows nothing about test content. It talks to the outside world
//! through a [`GuardHost`] (listener wiring, selection style, the blocking
//! warning, the unload prompt) and through the callbacks in [`GuardConfig`].

use crate::Clock;
use crate::model::{Violation, ViolationKind};

//
// ─── HOST EVENTS ───────────────────────────────────────────────────────────────
//

/// A key press as reported by the host, before any default action runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyPress {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    #[must_use]
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    #[must_use]
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Raw events the host forwards while the guard is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    ContextMenu,
    Copy,
    Cut,
    Paste,
    SelectStart,
    KeyDown(KeyPress),
    VisibilityChanged { hidden: bool },
    WindowBlur,
    WindowFocus,
    PointerLeave { has_related_target: bool },
    PointerEnter,
    BeforeUnload,
}

/// What the host should do with the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Allow,
    PreventDefault,
    /// Ask the host for its native "leave this page?" confirmation.
    ConfirmUnload,
}

/// Keys blocked together with Ctrl or Cmd.
pub const BLOCKED_WITH_MODIFIER: [&str; 7] = ["c", "v", "x", "s", "u", "p", "a"];
/// Keys blocked together with Ctrl/Cmd and Shift (devtools shortcuts).
pub const BLOCKED_WITH_MODIFIER_SHIFT: [&str; 2] = ["i", "j"];
/// Keys blocked on their own.
pub const BLOCKED_BARE: [&str; 1] = ["F12"];

/// Returns true if the key combo is on the suppression blocklist.
#[must_use]
pub fn is_blocked_key(press: &KeyPress) -> bool {
    if BLOCKED_BARE.contains(&press.key.as_str()) {
        return true;
    }
    if !(press.ctrl || press.meta) {
        return false;
    }
    let key = press.key.to_ascii_lowercase();
    BLOCKED_WITH_MODIFIER.contains(&key.as_str())
        || (press.shift && BLOCKED_WITH_MODIFIER_SHIFT.contains(&key.as_str()))
}

//
// ─── HOST + CONFIG ─────────────────────────────────────────────────────────────
//

/// Side of the guard that touches the real UI.
pub trait GuardHost {
    /// Start forwarding [`HostEvent`]s.
    fn attach(&mut self);
    /// Stop forwarding events.
    fn detach(&mut self);
    fn set_text_selection(&mut self, enabled: bool);
    fn set_unload_prompt(&mut self, enabled: bool);
    /// Show the blocking warning for the first violation.
    fn show_warning(&mut self, violation: &Violation);
}

impl<H: GuardHost + ?Sized> GuardHost for Box<H> {
    fn attach(&mut self) {
        (**self).attach();
    }

    fn detach(&mut self) {
        (**self).detach();
    }

    fn set_text_selection(&mut self, enabled: bool) {
        (**self).set_text_selection(enabled);
    }

    fn set_unload_prompt(&mut self, enabled: bool) {
        (**self).set_unload_prompt(enabled);
    }

    fn show_warning(&mut self, violation: &Violation) {
        (**self).show_warning(violation);
    }
}

pub type ViolationCallback = Box<dyn FnMut(&Violation) + Send>;
pub type FocusCallback = Box<dyn FnMut() + Send>;

/// Tunables for what counts as a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Treat the pointer leaving the document as a violation. This can
    /// false-positive on native pickers, so it can be turned off.
    pub count_mouse_leave: bool,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            count_mouse_leave: true,
        }
    }
}

pub struct GuardConfig {
    pub enabled: bool,
    pub policy: GuardPolicy,
    pub on_first_violation: ViolationCallback,
    pub on_second_violation: ViolationCallback,
    pub on_focus_return: FocusCallback,
}

impl GuardConfig {
    #[must_use]
    pub fn new(
        on_first_violation: impl FnMut(&Violation) + Send + 'static,
        on_second_violation: impl FnMut(&Violation) + Send + 'static,
        on_focus_return: impl FnMut() + Send + 'static,
    ) -> Self {
        Self {
            enabled: true,
            policy: GuardPolicy::default(),
            on_first_violation: Box::new(on_first_violation),
            on_second_violation: Box::new(on_second_violation),
            on_focus_return: Box::new(on_focus_return),
        }
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: GuardPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl std::fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardConfig")
            .field("enabled", &self.enabled)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

//
// ─── GUARD ─────────────────────────────────────────────────────────────────────
//

/// Escalation track. Focus return is orthogonal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strike {
    Clean,
    Warned,
    Escalated,
}

impl Strike {
    #[must_use]
    pub fn count(self) -> u8 {
        match self {
            Strike::Clean => 0,
            Strike::Warned => 1,
            Strike::Escalated => 2,
        }
    }
}

struct Armed {
    config: GuardConfig,
    strike: Strike,
    /// Kind that opened the current episode; cleared when focus returns.
    episode: Option<ViolationKind>,
}

pub struct IntegrityGuard<H: GuardHost> {
    host: H,
    clock: Clock,
    armed: Option<Armed>,
}

impl<H: GuardHost> IntegrityGuard<H> {
    #[must_use]
    pub fn new(host: H, clock: Clock) -> Self {
        Self {
            host,
            clock,
            armed: None,
        }
    }

    /// Begin observing. A disabled config leaves the guard inert.
    ///
    /// Re-activating drops the previous listeners and restarts the strike
    /// track at `Clean`.
    pub fn activate(&mut self, config: GuardConfig) {
        self.deactivate();
        if !config.enabled {
            return;
        }
        self.host.attach();
        self.host.set_text_selection(false);
        self.host.set_unload_prompt(true);
        self.armed = Some(Armed {
            config,
            strike: Strike::Clean,
            episode: None,
        });
    }

    /// Detach and restore host state. Safe to call any number of times.
    pub fn deactivate(&mut self) {
        if self.armed.take().is_some() {
            self.host.detach();
            self.host.set_text_selection(true);
            self.host.set_unload_prompt(false);
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.armed.is_some()
    }

    #[must_use]
    pub fn strike(&self) -> Strike {
        self.armed.as_ref().map_or(Strike::Clean, |armed| armed.strike)
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Classify one host event. Never fails; inactive guards allow everything.
    pub fn handle(&mut self, event: &HostEvent) -> GuardAction {
        let count_mouse_leave = match self.armed.as_ref() {
            Some(armed) => armed.config.policy.count_mouse_leave,
            None => return GuardAction::Allow,
        };

        match event {
            HostEvent::ContextMenu
            | HostEvent::Copy
            | HostEvent::Cut
            | HostEvent::Paste
            | HostEvent::SelectStart => GuardAction::PreventDefault,
            HostEvent::KeyDown(press) if is_blocked_key(press) => GuardAction::PreventDefault,
            HostEvent::KeyDown(_) => GuardAction::Allow,
            HostEvent::VisibilityChanged { hidden: true } => {
                self.violation(ViolationKind::TabSwitch)
            }
            HostEvent::WindowBlur => self.violation(ViolationKind::WindowBlur),
            HostEvent::PointerLeave {
                has_related_target: false,
            } if count_mouse_leave => {
                self.violation(ViolationKind::MouseLeave)
            }
            HostEvent::PointerLeave { .. } => GuardAction::Allow,
            HostEvent::VisibilityChanged { hidden: false } | HostEvent::WindowFocus => {
                self.focus_returned();
                GuardAction::Allow
            }
            HostEvent::PointerEnter => {
                if let Some(armed) = self.armed.as_mut() {
                    if armed.episode == Some(ViolationKind::MouseLeave) {
                        armed.episode = None;
                    }
                }
                GuardAction::Allow
            }
            HostEvent::BeforeUnload => GuardAction::ConfirmUnload,
        }
    }

    fn violation(&mut self, kind: ViolationKind) -> GuardAction {
        let Some(armed) = self.armed.as_mut() else {
            return GuardAction::Allow;
        };
        if armed.episode.is_some() {
            return GuardAction::Allow;
        }
        armed.episode = Some(kind);

        let violation = Violation::new(kind, self.clock.now());
        match armed.strike {
            Strike::Clean => {
                armed.strike = Strike::Warned;
                self.host.show_warning(&violation);
                (armed.config.on_first_violation)(&violation);
            }
            Strike::Warned => {
                armed.strike = Strike::Escalated;
                (armed.config.on_second_violation)(&violation);
            }
            Strike::Escalated => {}
        }
        GuardAction::Allow
    }

    fn focus_returned(&mut self) {
        if let Some(armed) = self.armed.as_mut() {
            armed.episode = None;
            (armed.config.on_focus_return)();
        }
    }
}

impl<H: GuardHost> Drop for IntegrityGuard<H> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
