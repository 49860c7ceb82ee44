use crate::app::{AppState, ServerState};
use dioxus::prelude::*;

#[component]
pub fn StatusBar() -> Element {
    let app_state = use_context::<AppState>();
    let status = app_state.status.read().clone();

    let (dot_class, server_label) = match &*app_state.server_state.read() {
        ServerState::Stopped => ("dot", "Stopped".to_string()),
        ServerState::Background { pid, started_at } => (
            "dot running",
            match pid {
                Some(pid) => format!("Background, PID {pid}, since {started_at}"),
                None => format!("Background, since {started_at}"),
            },
        ),
        ServerState::Terminal(terminal) => ("dot external", format!("In {terminal}")),
    };

    rsx! {
        footer {
            class: "status-bar",
            span { class: "status-text", "{status}" }
            span {
                class: "server-state",
                div { class: "{dot_class}" }
                "{server_label}"
            }
        }
    }
}
