//! Messages posted by the guard listener script.

use serde::Deserialize;

use assess_core::guard::{HostEvent, KeyPress};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardMessage {
    ContextMenu,
    Copy,
    Cut,
    Paste,
    SelectStart,
    KeyDown {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        meta: bool,
        #[serde(default)]
        shift: bool,
    },
    Visibility {
        hidden: bool,
    },
    Blur,
    Focus,
    PointerLeave {
        #[serde(default)]
        has_related_target: bool,
    },
    PointerEnter,
    BeforeUnload,
    Fullscreen {
        active: bool,
    },
}

/// Where a listener message goes: the integrity guard or the fullscreen gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Forwarded {
    Host(HostEvent),
    Fullscreen { active: bool },
}

impl From<GuardMessage> for Forwarded {
    fn from(message: GuardMessage) -> Self {
        let event = match message {
            GuardMessage::Fullscreen { active } => return Forwarded::Fullscreen { active },
            GuardMessage::ContextMenu => HostEvent::ContextMenu,
            GuardMessage::Copy => HostEvent::Copy,
            GuardMessage::Cut => HostEvent::Cut,
            GuardMessage::Paste => HostEvent::Paste,
            GuardMessage::SelectStart => HostEvent::SelectStart,
            GuardMessage::KeyDown {
                key,
                ctrl,
                meta,
                shift,
            } => HostEvent::KeyDown(KeyPress {
                key,
                ctrl,
                meta,
                shift,
            }),
            GuardMessage::Visibility { hidden } => HostEvent::VisibilityChanged { hidden },
            GuardMessage::Blur => HostEvent::WindowBlur,
            GuardMessage::Focus => HostEvent::WindowFocus,
            GuardMessage::PointerLeave { has_related_target } => {
                HostEvent::PointerLeave { has_related_target }
            }
            GuardMessage::PointerEnter => HostEvent::PointerEnter,
            GuardMessage::BeforeUnload => HostEvent::BeforeUnload,
        };
        Forwarded::Host(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Forwarded {
        serde_json::from_str::<GuardMessage>(json).unwrap().into()
    }

    #[test]
    fn visibility_and_focus_map_to_host_events() {
        assert_eq!(
            parse(r#"{"type":"visibility","hidden":true}"#),
            Forwarded::Host(HostEvent::VisibilityChanged { hidden: true })
        );
        assert_eq!(
            parse(r#"{"type":"blur"}"#),
            Forwarded::Host(HostEvent::WindowBlur)
        );
        assert_eq!(
            parse(r#"{"type":"focus"}"#),
            Forwarded::Host(HostEvent::WindowFocus)
        );
    }

    #[test]
    fn key_modifiers_default_to_false() {
        assert_eq!(
            parse(r#"{"type":"key_down","key":"c","ctrl":true}"#),
            Forwarded::Host(HostEvent::KeyDown(KeyPress::new("c").ctrl()))
        );
    }

    #[test]
    fn pointer_leave_keeps_related_target_flag() {
        assert_eq!(
            parse(r#"{"type":"pointer_leave","has_related_target":false}"#),
            Forwarded::Host(HostEvent::PointerLeave {
                has_related_target: false
            })
        );
    }

    #[test]
    fn fullscreen_changes_bypass_the_guard() {
        assert_eq!(
            parse(r#"{"type":"fullscreen","active":false}"#),
            Forwarded::Fullscreen { active: false }
        );
    }

    #[test]
    fn unknown_messages_are_rejected() {
        assert!(serde_json::from_str::<GuardMessage>(r#"{"type":"scroll"}"#).is_err());
    }
}
