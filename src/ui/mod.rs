//! UI components for the launcher
//!
//! This module contains all user interface components built with Dioxus.

#![allow(non_snake_case)]

pub mod command;
pub mod components;
pub mod settings;
pub mod sidebar;

use crate::ui::command::CommandPanel;
use crate::ui::components::api_info_dialog::ApiInfoDialog;
use crate::ui::components::status_bar::StatusBar;
use crate::ui::settings::OptionsForm;
use crate::ui::sidebar::Sidebar;
use dioxus::prelude::*;

/// Window layout: model selection on the left, options and command on the right
#[component]
pub fn Layout() -> Element {
    rsx! {
        div {
            class: "app-shell",

            div {
                class: "app-body",
                Sidebar {}

                main {
                    class: "app-main",
                    OptionsForm {}
                    CommandPanel {}
                }
            }

            StatusBar {}
            ApiInfoDialog {}
        }
    }
}
