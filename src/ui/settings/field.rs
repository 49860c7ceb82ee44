use crate::app::AppState;
use crate::launcher::options::{OptionKind, OptionSpec};
use crate::system::dialogs::{self, Filter};
use crate::types::config::OptionValue;
use dioxus::prelude::*;

/// One form input bound to a `LaunchConfig` key
#[component]
pub fn OptionField(spec: &'static OptionSpec) -> Element {
    let app_state = use_context::<AppState>();
    let mut app_state_edit = app_state.clone();

    if spec.kind == OptionKind::Flag {
        let checked = app_state.form.read().flag(spec.key);
        return rsx! {
            label {
                class: "flag-row",
                input {
                    r#type: "checkbox",
                    checked: checked,
                    onchange: move |e| app_state_edit.set_option(spec.key, OptionValue::Bool(e.checked())),
                }
                span { "{spec.label}" }
            }
        };
    }

    let value = app_state
        .form
        .read()
        .get(spec.key)
        .map(OptionValue::display_text)
        .unwrap_or_default();
    let wide = spec.kind == OptionKind::Raw || spec.key == "chat_template";
    let picker = file_picker(spec.key);
    let app_state_browse = app_state.clone();

    rsx! {
        div {
            class: if wide { "field wide" } else { "field" },
            label { class: "field-label", "{spec.label}" }
            div {
                class: "input-row",
                input {
                    r#type: "text",
                    class: "text-input",
                    spellcheck: false,
                    value: "{value}",
                    placeholder: "{spec.hint}",
                    title: "{spec.hint}",
                    oninput: move |e| {
                        app_state_edit.set_option(spec.key, OptionValue::from_input(spec.kind, &e.value()));
                    },
                }
                if let Some((title, filter)) = picker {
                    button {
                        class: "btn-ghost small",
                        onclick: move |_| {
                            let app_state = app_state_browse.clone();
                            spawn(async move {
                                app_state.browse_option_file(spec.key, title, filter).await;
                            });
                        },
                        "Browse..."
                    }
                }
            }
        }
    }
}

/// Options whose value is a file path get a picker
fn file_picker(key: &str) -> Option<(&'static str, Filter)> {
    match key {
        "mmproj" => Some(("Select multimodal projector", dialogs::GGUF_FILTER)),
        "chat_template_file" => Some(("Select chat template", dialogs::TEMPLATE_FILTER)),
        _ => None,
    }
}
