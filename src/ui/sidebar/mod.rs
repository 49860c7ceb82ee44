//! Sidebar: server executable, model directory and model details

pub mod metadata_panel;
pub mod model_picker;

use crate::app::AppState;
use dioxus::prelude::*;
use metadata_panel::MetadataPanel;
use model_picker::ModelPicker;
use std::path::PathBuf;

#[component]
pub fn Sidebar() -> Element {
    rsx! {
        aside {
            class: "sidebar",
            ServerPathField {}
            ModelPicker {}
            MetadataPanel {}
        }
    }
}

/// Path to the llama-server executable, saved when the field loses focus
#[component]
fn ServerPathField() -> Element {
    let app_state = use_context::<AppState>();
    let server_path = app_state.settings.read().server_path.to_string_lossy().into_owned();
    let mut app_state_input = app_state.clone();
    let mut app_state_blur = app_state.clone();
    let app_state_browse = app_state.clone();

    rsx! {
        div {
            class: "section",
            span { class: "section-label", "llama-server" }
            div {
                class: "input-row",
                input {
                    r#type: "text",
                    class: "text-input mono",
                    value: "{server_path}",
                    placeholder: "~/llama.cpp/llama-server",
                    spellcheck: false,
                    oninput: move |e| {
                        app_state_input.settings.write().server_path = PathBuf::from(e.value());
                    },
                    onblur: move |_| {
                        app_state_blur.settings.write().validate();
                        app_state_blur.persist_settings();
                    },
                }
                button {
                    class: "btn-ghost small",
                    onclick: move |_| {
                        let app_state = app_state_browse.clone();
                        spawn(async move {
                            app_state.browse_server_path().await;
                        });
                    },
                    "Browse..."
                }
            }
        }
    }
}
