//! Header details for the selected model

use crate::app::{AppState, MetadataState};
use crate::types::model::ModelMetadata;
use dioxus::prelude::*;

#[component]
pub fn MetadataPanel() -> Element {
    let app_state = use_context::<AppState>();
    let state = app_state.metadata.read().clone();

    rsx! {
        div {
            class: "section",
            span { class: "section-label", "Model Info" }

            match state {
                MetadataState::Idle => rsx! {
                    span { class: "hint", "Select a model to see its details" }
                },
                MetadataState::Loading => rsx! {
                    span { class: "hint", "Reading header..." }
                },
                MetadataState::Failed(ref msg) => rsx! {
                    div { class: "error-box", "{msg}" }
                },
                MetadataState::Ready(ref meta) => rsx! {
                    MetadataTable { metadata: meta.clone() }
                },
            }
        }
    }
}

#[component]
fn MetadataTable(metadata: ModelMetadata) -> Element {
    let unknown = || "unknown".to_string();
    let rows = [
        ("Name", metadata.name.clone().unwrap_or_else(unknown)),
        ("Architecture", metadata.architecture.clone().unwrap_or_else(unknown)),
        ("Layers", metadata.layer_count.map(|v| v.to_string()).unwrap_or_else(unknown)),
        (
            "Context",
            metadata.context_length.map(|v| v.to_string()).unwrap_or_else(unknown),
        ),
        ("Quantization", metadata.quantization.clone().unwrap_or_else(unknown)),
        (
            "GGUF version",
            metadata.format_version.map(|v| v.to_string()).unwrap_or_else(unknown),
        ),
        ("Size", metadata.size_string()),
    ];

    rsx! {
        dl {
            class: "metadata-grid",
            for (label, value) in rows {
                dt { key: "{label}", "{label}" }
                dd { class: if value == "unknown" { "muted" } else { "" }, "{value}" }
            }
        }
    }
}
