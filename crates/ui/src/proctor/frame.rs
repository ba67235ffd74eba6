use dioxus::prelude::*;

use crate::vm::{FramePhase, FrameVm, NavEntryVm, OverlayVm, ResultVm};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAction {
    Start,
    Acknowledge,
    Fullscreen,
    Submit,
    Retry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavAction {
    Previous,
    Next,
    Skip,
    Jump(usize),
}

/// Timer bar, intro, blocking overlays and the result panel around the
/// variant's own item view, which is passed as `children`.
#[component]
pub fn ProctorFrame(
    vm: FrameVm,
    #[props(!optional)] notice: Option<String>,
    on_action: EventHandler<FrameAction>,
    children: Element,
) -> Element {
    let body = match &vm.phase {
        FramePhase::Unavailable(message) => rsx! {
            section { class: "panel unavailable",
                h3 { "This test is unavailable" }
                p { "{message}" }
            }
        },
        FramePhase::Intro => rsx! {
            section { class: "panel intro",
                p { class: "budget", "Time limit: {vm.budget_label}" }
                ul { class: "rules",
                    for rule in vm.rules.iter() {
                        li { "{rule}" }
                    }
                }
                button {
                    id: "proctor-start",
                    class: "btn primary",
                    onclick: move |_| on_action.call(FrameAction::Start),
                    "Start test"
                }
            }
        },
        FramePhase::Running | FramePhase::Paused => {
            let paused = vm.phase == FramePhase::Paused;
            let body_class = if paused { "proctor-body paused" } else { "proctor-body" };
            rsx! {
                section { class: body_class, "aria-hidden": paused.to_string(),
                    div { class: "progress",
                        span { "{vm.progress_label}" }
                        span { class: "answered", "{vm.answered_label}" }
                    }
                    {children}
                    div { class: "submit-row",
                        button {
                            id: "proctor-submit",
                            class: "btn primary",
                            disabled: paused,
                            onclick: move |_| on_action.call(FrameAction::Submit),
                            "Submit test"
                        }
                    }
                }
                if let Some(overlay) = vm.overlay.clone() {
                    Overlay { overlay, on_action }
                }
            }
        }
        FramePhase::Finished => rsx! {
            section { class: "panel finished",
                if let Some(result) = vm.result.clone() {
                    ResultPanel { result }
                } else {
                    p { class: "scoring", "Scoring your answers..." }
                }
                if let Some(label) = &vm.submission_label {
                    p { class: "submission", "{label}" }
                }
                if vm.can_retry {
                    button {
                        id: "proctor-retry",
                        class: "btn",
                        onclick: move |_| on_action.call(FrameAction::Retry),
                        "Try saving again"
                    }
                }
            }
        },
    };

    rsx! {
        div { class: "proctor",
            header { class: "proctor-bar",
                h2 { "{vm.title}" }
                if let Some(strikes) = &vm.strikes_label {
                    span { class: "strikes", "{strikes}" }
                }
                span { class: vm.timer_class, role: "timer", "{vm.timer_label}" }
            }
            if let Some(message) = notice {
                div { class: "notice", role: "alert", "{message}" }
            }
            {body}
        }
    }
}

#[component]
fn Overlay(overlay: OverlayVm, on_action: EventHandler<FrameAction>) -> Element {
    match overlay {
        OverlayVm::Warning { title, message } => rsx! {
            div { class: "overlay", role: "alertdialog", "aria-modal": "true",
                div { class: "overlay-card warning",
                    h3 { "{title}" }
                    p { "{message}" }
                    button {
                        id: "proctor-acknowledge",
                        class: "btn primary",
                        onclick: move |_| on_action.call(FrameAction::Acknowledge),
                        "I understand, continue"
                    }
                }
            }
        },
        OverlayVm::FullscreenExit { message } => rsx! {
            div { class: "overlay", role: "alertdialog", "aria-modal": "true",
                div { class: "overlay-card",
                    h3 { "Fullscreen required" }
                    p { "{message}" }
                    button {
                        id: "proctor-fullscreen",
                        class: "btn primary",
                        onclick: move |_| on_action.call(FrameAction::Fullscreen),
                        "Return to fullscreen"
                    }
                }
            }
        },
    }
}

#[component]
pub fn ResultPanel(result: ResultVm) -> Element {
    rsx! {
        div { class: "result",
            p { class: "score", "{result.score_label}" }
            p { class: "outcome", "{result.outcome_label}" }
            ul { class: "result-facts",
                li { "{result.answered_label}" }
                li { "{result.elapsed_label}" }
                li { "{result.violations_label}" }
            }
        }
    }
}

/// Previous / palette / skip / next controls under the current item.
#[component]
pub fn QuestionNav(
    entries: Vec<NavEntryVm>,
    current: usize,
    on_nav: EventHandler<NavAction>,
) -> Element {
    let last = entries.len().saturating_sub(1);
    rsx! {
        nav { class: "question-nav",
            button {
                class: "btn",
                disabled: current == 0,
                onclick: move |_| on_nav.call(NavAction::Previous),
                "Previous"
            }
            div { class: "palette",
                for entry in entries {
                    button {
                        key: "{entry.index}",
                        class: entry.state.class(),
                        onclick: move |_| on_nav.call(NavAction::Jump(entry.index)),
                        "{entry.label}"
                    }
                }
            }
            button {
                class: "btn",
                onclick: move |_| on_nav.call(NavAction::Skip),
                "Skip"
            }
            button {
                class: "btn",
                disabled: current >= last,
                onclick: move |_| on_nav.call(NavAction::Next),
                "Next"
            }
        }
    }
}
