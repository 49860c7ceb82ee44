//! Confirmation dialog UI component
//!
//! Asks before destructive actions such as killing every server process

use dioxus::prelude::*;

#[component]
pub fn ConfirmDialog(
    title: String,
    message: String,
    confirm_label: String,
    on_cancel: EventHandler<MouseEvent>,
    on_confirm: EventHandler<MouseEvent>,
) -> Element {
    rsx! {
        // Backdrop
        div {
            class: "backdrop",

            div {
                class: "dialog",

                // Header with warning icon
                div {
                    class: "dialog-header",
                    div {
                        class: "warning-icon",
                        svg {
                            class: "icon",
                            view_box: "0 0 24 24",
                            fill: "none",
                            stroke: "currentColor",
                            stroke_width: "2",
                            stroke_linecap: "round",
                            stroke_linejoin: "round",
                            path { d: "M10.29 3.86L1.82 18a2 2 0 0 0 1.71 3h16.94a2 2 0 0 0 1.71-3L13.71 3.86a2 2 0 0 0-3.42 0z" }
                            line { x1: "12", y1: "9", x2: "12", y2: "13" }
                            line { x1: "12", y1: "17", x2: "12.01", y2: "17" }
                        }
                    }
                    h2 { class: "dialog-title", "{title}" }
                }

                p { class: "dialog-message", "{message}" }

                div {
                    class: "dialog-footer",
                    button {
                        class: "btn-ghost",
                        onclick: move |e| on_cancel.call(e),
                        "Cancel"
                    }
                    button {
                        class: "btn-danger",
                        onclick: move |e| on_confirm.call(e),
                        "{confirm_label}"
                    }
                }
            }
        }
    }
}
