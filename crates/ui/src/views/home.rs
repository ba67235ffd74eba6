use dioxus::prelude::*;
use dioxus_router::Link;

use assess_core::model::TestType;
use assess_core::variant::{Coding, Mcq, Paragraph, Variant};
use services::config::BudgetConfig;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ResultVm, budget_label, map_result_rows, test_type_label};

const RECENT_LIMIT: u32 = 5;

#[derive(Clone, PartialEq)]
struct TestCardVm {
    route: Route,
    title: &'static str,
    blurb: &'static str,
    budget: String,
    proctored: bool,
}

fn test_cards(budgets: BudgetConfig) -> Vec<TestCardVm> {
    vec![
        TestCardVm {
            route: Route::Mcq {},
            title: test_type_label(TestType::Mcq),
            blurb: "Pick one answer for each question.",
            budget: budget_label(budgets.for_test_type(TestType::Mcq)),
            proctored: Mcq::PROCTORED,
        },
        TestCardVm {
            route: Route::Coding {},
            title: test_type_label(TestType::Coding),
            blurb: "Solve programming problems and check them against test cases.",
            budget: budget_label(budgets.for_test_type(TestType::Coding)),
            proctored: Coding::PROCTORED,
        },
        TestCardVm {
            route: Route::Paragraph {},
            title: test_type_label(TestType::Paragraph),
            blurb: "Answer each prompt in your own words.",
            budget: budget_label(budgets.for_test_type(TestType::Paragraph)),
            proctored: Paragraph::PROCTORED,
        },
    ]
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let cards = test_cards(ctx.services().budgets());

    let resource = use_resource(move || {
        let services = ctx.services();
        async move {
            let results = services
                .recent_results(None, RECENT_LIMIT)
                .await
                .map_err(|_| ViewError::Storage)?;
            Ok::<_, ViewError>(map_result_rows(&results))
        }
    });

    let recent = match view_state_from_resource(resource) {
        ViewState::Idle | ViewState::Loading => rsx! { p { class: "muted", "Loading results..." } },
        ViewState::Error(err) => rsx! { p { class: "error", "{err.message()}" } },
        ViewState::Ready(rows) if rows.is_empty() => {
            rsx! { p { class: "muted", "No attempts yet." } }
        }
        ViewState::Ready(rows) => rsx! { ResultList { rows } },
    };

    rsx! {
        div { class: "page",
            h2 { "Tests" }
            div { class: "test-cards",
                for card in cards {
                    article { class: "test-card", key: "{card.title}",
                        h3 { "{card.title}" }
                        p { "{card.blurb}" }
                        p { class: "budget", "Time limit: {card.budget}" }
                        if card.proctored {
                            span { class: "badge", "Proctored" }
                        }
                        Link { class: "btn primary", to: card.route, "Open" }
                    }
                }
            }
            h3 { "Recent results" }
            {recent}
        }
    }
}

#[component]
pub fn ResultList(rows: Vec<ResultVm>) -> Element {
    rsx! {
        table { class: "results",
            thead {
                tr {
                    th { "Test" }
                    th { "Score" }
                    th { "Outcome" }
                    th { "Answered" }
                    th { "Warnings" }
                    th { "Finished" }
                }
            }
            tbody {
                for row in rows {
                    tr {
                        td { "{row.test_label}" }
                        td { class: "score", "{row.score_label}" }
                        td { "{row.outcome_label}" }
                        td { "{row.answered_label}" }
                        td { "{row.violations_label}" }
                        td { "{row.finished_label}" }
                    }
                }
            }
        }
    }
}
