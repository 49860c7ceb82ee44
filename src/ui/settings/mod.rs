#![allow(non_snake_case)]

pub mod field;

use crate::launcher::options::{in_group, OptionGroup};
use crate::ui::settings::field::OptionField;
use dioxus::prelude::*;

/// Groups shown as tabs. The model path comes from the sidebar selection.
const TABS: [OptionGroup; 6] = [
    OptionGroup::Network,
    OptionGroup::Performance,
    OptionGroup::Sampling,
    OptionGroup::Api,
    OptionGroup::Flags,
    OptionGroup::Custom,
];

/// Option form generated from the option table
#[component]
pub fn OptionsForm() -> Element {
    let mut active_tab = use_signal(|| OptionGroup::Network);

    rsx! {
        div {
            class: "options-panel",

            div {
                class: "tab-strip",
                for group in TABS {
                    TabButton {
                        key: "{group.title()}",
                        active: active_tab() == group,
                        onclick: move |_| active_tab.set(group),
                        label: group.title(),
                    }
                }
            }

            div {
                class: if active_tab() == OptionGroup::Flags { "field-grid flags" } else { "field-grid" },
                for spec in in_group(active_tab()) {
                    OptionField { key: "{spec.key}", spec: spec }
                }
            }
        }
    }
}

#[component]
fn TabButton(active: bool, onclick: EventHandler<MouseEvent>, label: String) -> Element {
    let classes = if active { "tab active" } else { "tab" };

    rsx! {
        button {
            class: "{classes}",
            onclick: onclick,
            "{label}"
        }
    }
}
