use std::collections::HashMap;

use dioxus::prelude::*;

use assess_core::model::{AssessmentItem, CodeDraft, CodingProblem, ItemId, Language};
use assess_core::variant::Coding;

use crate::proctor::{Assessment, ProctorFrame, QuestionNav, use_assessment};
use crate::vm::{FrameVm, GradeVm, RunOutputVm, error_notice, language_options, nav_palette};

/// The candidate's draft, or the starter code of the first language.
fn draft_for(problem: &CodingProblem, drafts: &HashMap<ItemId, CodeDraft>) -> CodeDraft {
    drafts.get(&problem.id()).cloned().unwrap_or_else(|| {
        let language = Language::ALL[0];
        CodeDraft::new(language, problem.starter_for(language))
    })
}

#[component]
pub fn CodingView() -> Element {
    let assessment = use_assessment::<Coding>();
    let mut stdin = use_signal(String::new);
    let mut run_output = use_signal(|| None::<RunOutputVm>);
    let mut reports = use_signal(HashMap::<ItemId, GradeVm>::new);
    let mut busy = use_signal(|| false);

    let Some(snapshot) = assessment.snapshot() else {
        return rsx! { p { class: "muted", "Preparing the test..." } };
    };
    let vm = FrameVm::new::<Coding>(&snapshot);
    let items = assessment.items();
    let current = snapshot.session.current_index;
    let entries = nav_palette(&items[..], &snapshot);
    let Some(problem) = items.get(current).cloned() else {
        return rsx! {
            ProctorFrame {
                vm,
                notice: assessment.notice(),
                on_action: move |action| assessment.frame_action(action),
                p { class: "muted", "No problems are available." }
            }
        };
    };

    let id = problem.id();
    let statement = problem.clone();
    let draft = draft_for(&problem, &snapshot.responses);
    let language = draft.language;
    let recorded = snapshot.grades.get(&id).copied();
    let report = reports.read().get(&id).cloned();
    // Starter code is shown before anything is recorded; run and grade need it stored.
    let seed = (!snapshot.responses.contains_key(&id)).then(|| draft.clone());
    let grade_seed = seed.clone();

    let on_run = move |_| {
        let Some(handle) = assessment.handle() else {
            return;
        };
        let input = stdin.read().clone();
        let seed = seed.clone();
        busy.set(true);
        spawn(async move {
            let recorded = match seed {
                Some(draft) => handle.record(id, draft).await,
                None => Ok(()),
            };
            let outcome = match recorded {
                Ok(()) => handle.run_code(id, &input).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(output) => {
                    run_output.set(Some(RunOutputVm::new(&output)));
                    assessment.set_notice(None);
                }
                Err(err) => assessment.set_notice(Some(error_notice(&err))),
            }
            busy.set(false);
        });
    };

    let on_grade = move |_| {
        let Some(handle) = assessment.handle() else {
            return;
        };
        let seed = grade_seed.clone();
        busy.set(true);
        spawn(async move {
            let recorded = match seed {
                Some(draft) => handle.record(id, draft).await,
                None => Ok(()),
            };
            let outcome = match recorded {
                Ok(()) => handle.submit_problem(id).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(report) => {
                    reports.write().insert(id, GradeVm::new(&report));
                    assessment.set_notice(None);
                }
                Err(err) => assessment.set_notice(Some(error_notice(&err))),
            }
            busy.set(false);
        });
    };

    rsx! {
        ProctorFrame {
            vm,
            notice: assessment.notice(),
            on_action: move |action| assessment.frame_action(action),
            ProblemStatement { problem: statement }
            div { class: "editor",
                label { class: "field",
                    span { "Language" }
                    select {
                        value: language.slug(),
                        onchange: move |evt| {
                            if let Ok(next) = Language::from_slug(&evt.value()) {
                                switch_language(assessment, &problem, next);
                            }
                        },
                        for (slug, label) in language_options() {
                            option { key: "{slug}", value: slug, selected: slug == language.slug(), "{label}" }
                        }
                    }
                }
                textarea {
                    class: "code",
                    spellcheck: "false",
                    rows: "18",
                    value: "{draft.source}",
                    oninput: move |evt| assessment.record(id, CodeDraft::new(language, evt.value())),
                }
                label { class: "field",
                    span { "Custom input" }
                    textarea {
                        class: "stdin",
                        rows: "3",
                        value: "{stdin}",
                        oninput: move |evt| stdin.set(evt.value()),
                    }
                }
                div { class: "editor-actions",
                    button { class: "btn", disabled: busy(), onclick: on_run, "Run" }
                    button { class: "btn primary", disabled: busy(), onclick: on_grade, "Submit problem" }
                    if let Some(score) = recorded {
                        span { class: "recorded", "Recorded score: {score}%" }
                    }
                }
            }
            if let Some(output) = run_output() {
                RunOutputPanel { output }
            }
            if let Some(report) = report {
                GradePanel { report }
            }
            QuestionNav {
                entries,
                current,
                on_nav: move |action| {
                    run_output.set(None);
                    assessment.navigate(action);
                },
            }
        }
    }
}

fn switch_language(assessment: Assessment<Coding>, problem: &CodingProblem, language: Language) {
    let draft = CodeDraft::new(language, problem.starter_for(language));
    assessment.record(problem.id(), draft);
}

#[component]
fn ProblemStatement(problem: CodingProblem) -> Element {
    rsx! {
        div { class: "problem",
            h3 { "{problem.title()}" }
            p { class: "prompt", "{problem.prompt()}" }
            for (index, case) in problem.sample_cases().enumerate() {
                div { class: "sample", key: "{index}",
                    h4 { "Example {index + 1}" }
                    pre { class: "sample-input", "{case.input}" }
                    pre { class: "sample-output", "{case.expected_output}" }
                }
            }
        }
    }
}

#[component]
fn RunOutputPanel(output: RunOutputVm) -> Element {
    rsx! {
        section { class: "run-output",
            h4 { "Output" }
            pre { class: "stdout", "{output.stdout}" }
            if let Some(compile) = &output.compile_output {
                h4 { "Compiler" }
                pre { class: "compile", "{compile}" }
            }
            if let Some(stderr) = &output.stderr {
                h4 { "Errors" }
                pre { class: "stderr", "{stderr}" }
            }
            if let Some(stats) = &output.stats_label {
                p { class: "muted", "{stats}" }
            }
        }
    }
}

fn case_class(passed: bool) -> &'static str {
    if passed { "case passed" } else { "case failed" }
}

#[component]
fn GradePanel(report: GradeVm) -> Element {
    rsx! {
        section { class: "grade-report",
            h4 { "{report.summary}" }
            ul {
                for case in report.cases {
                    li { class: case_class(case.passed),
                        span { "{case.label}: " }
                        if case.passed { "passed" } else { "failed" }
                        if let Some(actual) = case.actual {
                            pre { "{actual}" }
                        }
                    }
                }
            }
        }
    }
}
