use dioxus::prelude::*;

use assess_core::model::{AssessmentItem, ItemId, McqOption, McqQuestion};
use assess_core::variant::Mcq;

use crate::proctor::{ProctorFrame, QuestionNav, use_assessment};
use crate::vm::{FrameVm, nav_palette};

#[component]
pub fn McqView() -> Element {
    let assessment = use_assessment::<Mcq>();
    let Some(snapshot) = assessment.snapshot() else {
        return rsx! { p { class: "muted", "Preparing the test..." } };
    };
    let vm = FrameVm::new::<Mcq>(&snapshot);
    let items = assessment.items();
    let current = snapshot.session.current_index;
    let question = items.get(current).cloned();
    let selected = question
        .as_ref()
        .and_then(|question| snapshot.responses.get(&question.id()).copied());
    let entries = nav_palette(&items[..], &snapshot);

    rsx! {
        ProctorFrame {
            vm,
            notice: assessment.notice(),
            on_action: move |action| assessment.frame_action(action),
            if let Some(question) = question {
                McqCard {
                    question,
                    selected,
                    on_select: move |(item, option)| assessment.record(item, option),
                }
            }
            QuestionNav {
                entries,
                current,
                on_nav: move |action| assessment.navigate(action),
            }
        }
    }
}

fn option_class(selected: Option<McqOption>, option: McqOption) -> &'static str {
    if selected == Some(option) {
        "option selected"
    } else {
        "option"
    }
}

#[component]
pub fn McqCard(
    question: McqQuestion,
    #[props(!optional)] selected: Option<McqOption>,
    on_select: EventHandler<(ItemId, McqOption)>,
) -> Element {
    let id = question.id();
    rsx! {
        div { class: "mcq",
            p { class: "question", "{question.question()}" }
            ul { class: "options", role: "radiogroup",
                for option in McqOption::ALL {
                    li { key: "{option.letter()}",
                        label { class: option_class(selected, option),
                            input {
                                r#type: "radio",
                                name: "mcq-{id}",
                                checked: selected == Some(option),
                                onchange: move |_| on_select.call((id, option)),
                            }
                            span { class: "letter", "{option.letter()}" }
                            span { "{question.option(option)}" }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> McqQuestion {
        McqQuestion::new(
            ItemId::new(7),
            "Which keyword declares an immutable binding?",
            ["let".into(), "mut".into(), "var".into(), "static mut".into()],
            McqOption::A,
        )
        .unwrap()
    }

    #[component]
    fn Harness(#[props(!optional)] selected: Option<McqOption>) -> Element {
        rsx! { McqCard { question: question(), selected, on_select: |_| {} } }
    }

    #[test]
    fn card_marks_the_selected_option() {
        let mut dom = VirtualDom::new_with_props(
            Harness,
            HarnessProps {
                selected: Some(McqOption::C),
            },
        );
        dom.rebuild_in_place();
        let html = dioxus_ssr::render(&dom);
        assert!(html.contains("Which keyword declares an immutable binding?"), "{html}");
        assert_eq!(html.matches("option selected").count(), 1);
        assert!(html.contains("static mut"));
        assert!(html.contains("mcq-7"));
    }
}
