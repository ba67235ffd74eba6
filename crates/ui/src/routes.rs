use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{CodingView, HomeView, McqView, ParagraphView, ResultsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/results", ResultsView)] Results {},
    #[end_layout]
    #[route("/test/mcq", McqView)] Mcq {},
    #[route("/test/coding", CodingView)] Coding {},
    #[route("/test/paragraph", ParagraphView)] Paragraph {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Assessments" }
            ul {
                li { Link { to: Route::Home {}, "Tests" } }
                li { Link { to: Route::Results {}, "Results" } }
            }
        }
    }
}
