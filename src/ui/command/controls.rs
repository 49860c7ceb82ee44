use crate::app::{AppState, ServerState};
use crate::types::config::RunMode;
use crate::ui::components::confirm_dialog::ConfirmDialog;
use dioxus::prelude::*;

/// Run mode toggle and the Launch / Kill / Save buttons
#[component]
pub fn Controls() -> Element {
    let app_state = use_context::<AppState>();
    let mut run_mode = app_state.run_mode;
    let mut busy = use_signal(|| false);
    let mut confirm_kill_all = use_signal(|| false);

    let has_model = app_state.selected.read().is_some();
    let background_running = matches!(
        *app_state.server_state.read(),
        ServerState::Background { .. }
    );

    let app_state_launch = app_state.clone();
    let handle_launch = move |_| {
        let app_state = app_state_launch.clone();
        busy.set(true);
        spawn(async move {
            app_state.launch().await;
            busy.set(false);
        });
    };

    let app_state_kill = app_state.clone();
    let handle_kill = move |_| {
        let app_state = app_state_kill.clone();
        busy.set(true);
        spawn(async move {
            if !app_state.stop_server().await {
                confirm_kill_all.set(true);
            }
            busy.set(false);
        });
    };

    let app_state_kill_all = app_state.clone();
    let handle_kill_all = move |_| {
        let app_state = app_state_kill_all.clone();
        confirm_kill_all.set(false);
        spawn(async move {
            app_state.kill_all().await;
        });
    };

    let mut app_state_save = app_state.clone();
    let handle_save = move |_| app_state_save.save_current();

    rsx! {
        div {
            class: "controls",

            div {
                class: "run-mode",
                label {
                    input {
                        r#type: "radio",
                        name: "run-mode",
                        checked: *run_mode.read() == RunMode::Terminal,
                        onchange: move |_| run_mode.set(RunMode::Terminal),
                    }
                    "Run in Terminal"
                }
                label {
                    input {
                        r#type: "radio",
                        name: "run-mode",
                        checked: *run_mode.read() == RunMode::Background,
                        onchange: move |_| run_mode.set(RunMode::Background),
                    }
                    "Run in Background"
                }
            }

            div {
                class: "button-row",
                button {
                    class: "btn-primary",
                    disabled: !has_model || busy(),
                    onclick: handle_launch,
                    "Launch Server"
                }
                button {
                    class: if background_running { "btn-danger" } else { "btn-ghost" },
                    disabled: busy(),
                    onclick: handle_kill,
                    "Kill Server"
                }
                button {
                    class: "btn-ghost",
                    disabled: !has_model,
                    onclick: handle_save,
                    "Save Settings"
                }
            }

            if confirm_kill_all() {
                ConfirmDialog {
                    title: "Kill llama-server",
                    message: "No background server found. Do you want to kill ALL running llama-server processes?\n\nThis runs 'pkill -f llama-server'.",
                    confirm_label: "Kill All",
                    on_cancel: move |_| confirm_kill_all.set(false),
                    on_confirm: handle_kill_all,
                }
            }
        }
    }
}
