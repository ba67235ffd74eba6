use dioxus::prelude::*;

use assess_core::model::{AssessmentItem, ItemId, ParagraphPrompt};
use assess_core::variant::Paragraph;

use crate::proctor::{ProctorFrame, QuestionNav, use_assessment};
use crate::vm::{FrameVm, WordCountVm, nav_palette};

#[component]
pub fn ParagraphView() -> Element {
    let assessment = use_assessment::<Paragraph>();
    let Some(snapshot) = assessment.snapshot() else {
        return rsx! { p { class: "muted", "Preparing the test..." } };
    };
    let vm = FrameVm::new::<Paragraph>(&snapshot);
    let items = assessment.items();
    let current = snapshot.session.current_index;
    let entries = nav_palette(&items[..], &snapshot);
    let prompt = items.get(current).cloned();
    let text = prompt
        .as_ref()
        .and_then(|prompt| snapshot.responses.get(&prompt.id()).cloned())
        .unwrap_or_default();

    rsx! {
        ProctorFrame {
            vm,
            notice: assessment.notice(),
            on_action: move |action| assessment.frame_action(action),
            if let Some(prompt) = prompt {
                ParagraphEditor {
                    prompt,
                    text,
                    on_input: move |(item, text)| assessment.record(item, text),
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

#[component]
pub fn ParagraphEditor(
    prompt: ParagraphPrompt,
    text: String,
    on_input: EventHandler<(ItemId, String)>,
) -> Element {
    let id = prompt.id();
    let count = WordCountVm::new(&text, prompt.word_limit());
    rsx! {
        div { class: "paragraph",
            p { class: "prompt", "{prompt.prompt()}" }
            textarea {
                class: "answer",
                rows: "12",
                value: "{text}",
                oninput: move |evt| on_input.call((id, evt.value())),
            }
            p { class: count.class(), "{count.label}" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[component]
    fn Harness(text: String) -> Element {
        let prompt = ParagraphPrompt::new(ItemId::new(1), "Describe your last project.", 3).unwrap();
        rsx! { ParagraphEditor { prompt, text, on_input: |_| {} } }
    }

    fn render(text: &str) -> String {
        let mut dom = VirtualDom::new_with_props(
            Harness,
            HarnessProps {
                text: text.to_owned(),
            },
        );
        dom.rebuild_in_place();
        dioxus_ssr::render(&dom)
    }

    #[test]
    fn editor_shows_prompt_and_counts() {
        let html = render("a small tool");
        assert!(html.contains("Describe your last project."), "{html}");
        assert!(html.contains("3 / 3 words, 12 characters"));
        assert!(!html.contains("over-limit"));
    }

    #[test]
    fn editor_flags_answers_over_the_limit() {
        let html = render("one two three four");
        assert!(html.contains("over-limit"), "{html}");
    }
}
