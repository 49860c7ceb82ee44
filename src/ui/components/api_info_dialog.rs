//! Endpoint summary shown after a launch

use crate::app::AppState;
use crate::ui::command::copy_to_clipboard;
use dioxus::prelude::*;

#[component]
pub fn ApiInfoDialog() -> Element {
    let app_state = use_context::<AppState>();
    let mut api_info = app_state.api_info;
    let mut status = app_state.status;

    let Some(info) = api_info.read().clone() else {
        return rsx! {};
    };

    let base_url = info.openai_base_url();
    let text = info.render();

    let handle_copy_url = move |_| {
        let url = base_url.clone();
        spawn(async move {
            match copy_to_clipboard(&url).await {
                Ok(()) => status.set(format!("Copied {}", url)),
                Err(e) => status.set(format!("Could not copy URL: {}", e)),
            }
        });
    };

    rsx! {
        div {
            class: "backdrop",
            onclick: move |_| api_info.set(None),

            div {
                class: "dialog wide",
                onclick: move |e| e.stop_propagation(),

                div {
                    class: "dialog-header",
                    h2 { class: "dialog-title", "Server API Information" }
                }

                pre { class: "api-info mono scrollbar-thin", "{text}" }

                div {
                    class: "dialog-footer",
                    button {
                        class: "btn-ghost",
                        onclick: handle_copy_url,
                        "Copy Base URL"
                    }
                    button {
                        class: "btn-primary",
                        onclick: move |_| api_info.set(None),
                        "Close"
                    }
                }
            }
        }
    }
}
