//! Command preview and launch controls

pub mod controls;

use crate::app::AppState;
use crate::launcher::{command_line, preview};
use controls::Controls;
use dioxus::prelude::*;

#[component]
pub fn CommandPanel() -> Element {
    let app_state = use_context::<AppState>();
    let argv = app_state.argv();
    let preview_text = preview(&argv);
    let copy_text = command_line(&argv);
    let has_model = app_state.selected.read().is_some();
    let mut status = app_state.status;

    let handle_copy = move |_| {
        let text = copy_text.clone();
        spawn(async move {
            match copy_to_clipboard(&text).await {
                Ok(()) => status.set("Command copied to clipboard".to_string()),
                Err(e) => {
                    tracing::warn!("Clipboard write failed: {}", e);
                    status.set(format!("Could not copy command: {}", e));
                }
            }
        });
    };

    rsx! {
        div {
            class: "command-panel",

            div {
                class: "section-header",
                span { class: "section-label", "Command Preview" }
                button {
                    class: "btn-ghost small",
                    disabled: !has_model,
                    onclick: handle_copy,
                    "Copy"
                }
            }

            pre {
                class: "command-preview mono scrollbar-thin",
                "{preview_text}"
            }

            Controls {}
        }
    }
}

/// Put `text` on the system clipboard through the webview
pub async fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let literal = serde_json::to_string(text).map_err(|e| e.to_string())?;
    document::eval(&format!("await navigator.clipboard.writeText({literal}); return true;"))
        .await
        .map(|_| ())
        .map_err(|e| e.to_string())
}
