use dioxus::prelude::*;
use crate::app::AppState;
use crate::storage::models::filter_models;
use std::path::PathBuf;

#[component]
pub fn ModelPicker() -> Element {
    let app_state = use_context::<AppState>();
    let models_directory = app_state
        .settings
        .read()
        .models_directory
        .as_ref()
        .map(|d| d.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut app_state_dir = app_state.clone();
    let handle_dir_input = move |e: FormEvent| {
        let value = e.value();
        app_state_dir.settings.write().models_directory = if value.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(value.trim()))
        };
    };

    let mut app_state_scan = app_state.clone();
    let handle_scan = move |_| {
        app_state_scan.persist_settings();
        app_state_scan.refresh_models();
    };

    let app_state_browse = app_state.clone();
    let handle_browse = move |_| {
        let app_state = app_state_browse.clone();
        spawn(async move {
            app_state.browse_models_directory().await;
        });
    };

    let mut app_state_refresh = app_state.clone();
    let handle_refresh = move |_| app_state_refresh.refresh_models();

    let mut search = app_state.search;
    let query = search.read().clone();
    let models = app_state.models.read().clone();
    let visible: Vec<_> = filter_models(&models, &query).into_iter().cloned().collect();
    let selected_path = app_state.selected.read().as_ref().map(|m| m.path.clone());

    rsx! {
        div {
            class: "section",

            // Header with Refresh
            div {
                class: "section-header",
                span { class: "section-label", "Models" }
                button {
                    onclick: handle_refresh,
                    class: "icon-button",
                    title: "Rescan models",
                    svg {
                        class: "icon-sm",
                        view_box: "0 0 24 24",
                        fill: "none",
                        stroke: "currentColor",
                        stroke_width: "2",
                        stroke_linecap: "round",
                        stroke_linejoin: "round",
                        path { d: "M23 4v6h-6" }
                        path { d: "M1 20v-6h6" }
                        path { d: "M3.51 9a9 9 0 0 1 14.85-3.36L23 10M1 14l4.64 4.36A9 9 0 0 0 20.49 15" }
                    }
                }
            }

            div {
                class: "input-row",
                input {
                    r#type: "text",
                    class: "text-input mono",
                    value: "{models_directory}",
                    placeholder: "Directory containing .gguf files",
                    spellcheck: false,
                    oninput: handle_dir_input,
                    onchange: handle_scan,
                }
                button {
                    class: "btn-ghost small",
                    onclick: handle_browse,
                    "Browse..."
                }
            }

            input {
                r#type: "search",
                class: "text-input",
                value: "{query}",
                placeholder: "Filter models (all terms must match)",
                oninput: move |e| search.set(e.value()),
            }

            if models.is_empty() {
                div {
                    class: "empty-state",
                    span { class: "empty-title", "No models found" }
                    span { class: "empty-hint", "Enter a directory containing .gguf files" }
                }
            } else {
                if !query.trim().is_empty() {
                    span {
                        class: "hint",
                        "Showing {visible.len()} of {models.len()} model(s)"
                    }
                }

                div {
                    class: "model-list scrollbar-thin",
                    {visible.into_iter().map(|model| {
                        let is_selected = selected_path.as_ref() == Some(&model.path);
                        let row_class = if is_selected { "model-row selected" } else { "model-row" };
                        let mut app_state = app_state.clone();
                        let entry = model.clone();
                        rsx! {
                            div {
                                key: "{model.path.to_string_lossy()}",
                                class: "{row_class}",
                                title: "{model.path.to_string_lossy()}",
                                onclick: move |_| app_state.select_model(entry.clone()),
                                span { class: "model-name", "{model.filename}" }
                                span { class: "badge mono", "{model.size_string()}" }
                            }
                        }
                    })}
                }
            }
        }
    }
}
