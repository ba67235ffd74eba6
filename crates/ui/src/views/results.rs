use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::home::ResultList;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::map_result_rows;

const HISTORY_LIMIT: u32 = 50;

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    let resource = use_resource(move || {
        let services = ctx.services();
        async move {
            let results = services
                .recent_results(None, HISTORY_LIMIT)
                .await
                .map_err(|_| ViewError::Storage)?;
            Ok::<_, ViewError>(map_result_rows(&results))
        }
    });

    let body = match view_state_from_resource(resource) {
        ViewState::Idle | ViewState::Loading => rsx! { p { class: "muted", "Loading results..." } },
        ViewState::Error(err) => rsx! { p { class: "error", "{err.message()}" } },
        ViewState::Ready(rows) if rows.is_empty() => {
            rsx! { p { class: "muted", "No attempts yet." } }
        }
        ViewState::Ready(rows) => rsx! { ResultList { rows } },
    };

    rsx! {
        div { class: "page",
            h2 { "Results" }
            {body}
        }
    }
}
