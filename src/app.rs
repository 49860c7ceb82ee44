//! Root Dioxus application component
//!
//! This module contains the main App component that serves as the root of the UI tree,
//! plus the state and actions the components share.

use crate::gguf::read_metadata;
use crate::launcher::api_info::ApiInfo;
use crate::launcher::build_arguments;
use crate::storage::models::{default_alias, scan_models_directory};
use crate::storage::server_log_path;
use crate::storage::settings::{load_settings, save_settings, LauncherSettings, ModelSettings};
use crate::system::dialogs::{self, Filter};
use crate::system::process::{kill_all_by_name, validate_launch, ServerProcess, StopOutcome};
use crate::system::terminal::launch_in_terminal;
use crate::types::config::{LaunchConfig, OptionValue, RunMode};
use crate::types::model::{ModelEntry, ModelMetadata};
use crate::ui::Layout;
use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::use_wry_event_handler;
use dioxus::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const STYLE: Asset = asset!("/assets/launcher.css");

/// Header information for the selected model
#[derive(Clone, PartialEq, Debug)]
pub enum MetadataState {
    Idle,
    Loading,
    Ready(ModelMetadata),
    Failed(String),
}

/// What the launcher last started
#[derive(Clone, PartialEq, Debug)]
pub enum ServerState {
    Stopped,
    Background { pid: Option<u32>, started_at: String },
    /// Running in a terminal window; not tracked
    Terminal(String),
}

/// Global application state shared across components
#[derive(Clone)]
pub struct AppState {
    pub settings: Signal<LauncherSettings>,
    pub models: Signal<Vec<ModelEntry>>,
    pub search: Signal<String>,
    pub selected: Signal<Option<ModelEntry>>,
    /// Option values currently in the form
    pub form: Signal<LaunchConfig>,
    pub run_mode: Signal<RunMode>,
    pub metadata: Signal<MetadataState>,
    pub server_state: Signal<ServerState>,
    /// Status bar text
    pub status: Signal<String>,
    /// Endpoint summary shown after a successful launch
    pub api_info: Signal<Option<ApiInfo>>,
    /// Background server, if one was started
    pub server: Arc<Mutex<Option<ServerProcess>>>,
}

impl AppState {
    pub fn new() -> Self {
        tracing::info!("AppState initialized");
        Self {
            settings: Signal::new(load_settings()),
            models: Signal::new(Vec::new()),
            search: Signal::new(String::new()),
            selected: Signal::new(None),
            form: Signal::new(LaunchConfig::form_defaults()),
            run_mode: Signal::new(RunMode::default()),
            metadata: Signal::new(MetadataState::Idle),
            server_state: Signal::new(ServerState::Stopped),
            status: Signal::new("Ready".to_string()),
            api_info: Signal::new(None),
            server: Arc::new(Mutex::new(None)),
        }
    }

    /// Argument list for the current form and selection
    pub fn argv(&self) -> Vec<String> {
        launch_arguments(
            &self.settings.read(),
            self.selected.read().as_ref(),
            &self.form.read(),
        )
    }

    /// Write settings to disk, reporting failures in the status bar
    pub fn persist_settings(&mut self) {
        if let Err(e) = save_settings(&self.settings.read()) {
            tracing::error!("Failed to save settings: {}", e);
            self.status.set(format!("Failed to save settings: {}", e));
        }
    }

    /// Rescan the models directory
    pub fn refresh_models(&mut self) {
        let Some(dir) = self.settings.read().models_directory.clone() else {
            self.models.set(Vec::new());
            return;
        };

        match scan_models_directory(&dir) {
            Ok(found) => {
                let status = if found.is_empty() {
                    "No GGUF files found in directory".to_string()
                } else {
                    format!("Found {} GGUF file(s)", found.len())
                };
                self.status.set(status);
                self.models.set(found);
            }
            Err(e) => {
                tracing::error!("Failed to scan {:?}: {}", dir, e);
                self.status.set(format!("Failed to scan models directory: {}", e));
                self.models.set(Vec::new());
            }
        }
    }

    /// Reopen the directory and model from the previous run
    pub fn restore_session(&mut self) {
        self.refresh_models();
        let last = self.settings.read().last_selected_model.clone();
        let entry = last.and_then(|name| {
            self.models
                .read()
                .iter()
                .find(|m| m.filename == name)
                .cloned()
        });
        if let Some(entry) = entry {
            self.select_model(entry);
        }
    }

    /// Make `entry` the selected model, load its stored options and read
    /// its header in the background
    pub fn select_model(&mut self, entry: ModelEntry) {
        let (stored, known) = {
            let settings = self.settings.read();
            (
                settings.settings_for(&entry.path),
                settings.has_settings_for(&entry.path),
            )
        };
        let ModelSettings { mut options, run_mode } = stored;

        if options.value_token("model_alias").is_none() {
            if let Err(e) = options.insert("model_alias", default_alias(&entry.filename)) {
                tracing::warn!("Could not default the alias: {}", e);
            }
        }

        self.form.set(options);
        self.run_mode.set(run_mode);
        self.settings.write().last_selected_model = Some(entry.filename.clone());
        self.persist_settings();

        self.status.set(if known {
            format!("Loaded settings for {}", entry.filename)
        } else {
            format!("Using default settings for {}", entry.filename)
        });
        tracing::info!("Selected model {}", entry.filename);

        let path = entry.path.clone();
        self.selected.set(Some(entry));
        self.load_metadata(path);
    }

    fn load_metadata(&mut self, path: PathBuf) {
        let mut metadata = self.metadata;
        let selected = self.selected;
        metadata.set(MetadataState::Loading);

        spawn(async move {
            let target = path.clone();
            let result = tokio::task::spawn_blocking(move || read_metadata(&target)).await;

            // A newer selection owns the panel now
            if selected.read().as_ref().map(|m| &m.path) != Some(&path) {
                return;
            }

            match result {
                Ok(Ok(meta)) => metadata.set(MetadataState::Ready(meta)),
                Ok(Err(e)) => {
                    tracing::warn!("Could not read metadata: {}", e);
                    metadata.set(MetadataState::Failed(e.to_string()));
                }
                Err(e) => {
                    tracing::error!("Metadata task failed: {}", e);
                    metadata.set(MetadataState::Failed(e.to_string()));
                }
            }
        });
    }

    /// Change one form value
    pub fn set_option(&mut self, key: &str, value: OptionValue) {
        if let Err(e) = self.form.write().insert(key, value) {
            tracing::warn!("Rejected form value: {}", e);
        }
    }

    /// Store the form for the selected model
    pub fn save_current(&mut self) {
        let Some(entry) = self.selected.read().clone() else {
            self.status.set("No model selected to save settings for".to_string());
            return;
        };

        let record = ModelSettings {
            options: self.form.read().clone(),
            run_mode: *self.run_mode.read(),
        };
        self.settings.write().remember(&entry.path, record);

        match save_settings(&self.settings.read()) {
            Ok(()) => self
                .status
                .set(format!("Settings saved for {}", entry.filename)),
            Err(e) => {
                tracing::error!("Failed to save settings: {}", e);
                self.status.set(format!("Failed to save settings: {}", e));
            }
        }
    }

    /// Validate, save and start the server in the selected run mode
    pub async fn launch(mut self) {
        let Some(entry) = self.selected.read().clone() else {
            self.status.set("Please select a GGUF model file".to_string());
            return;
        };
        let server_path = self.settings.read().server_path.clone();

        if let Err(e) = validate_launch(&server_path, &entry.path) {
            tracing::error!("Launch rejected: {}", e);
            self.status.set(e.to_string());
            return;
        }

        self.save_current();
        let argv = self.argv();
        let info = ApiInfo::from_config(&self.form.read());
        let run_mode = *self.run_mode.read();

        match run_mode {
            RunMode::Terminal => match launch_in_terminal(&argv) {
                Ok(terminal) => {
                    self.server_state.set(ServerState::Terminal(terminal.clone()));
                    self.status.set(format!("Server launched in {}", terminal));
                    self.api_info.set(Some(info));
                }
                Err(e) => {
                    tracing::error!("Failed to launch server: {}", e);
                    self.status.set(format!("Failed to launch server: {}", e));
                }
            },
            RunMode::Background => {
                let mut guard = self.server.lock().await;
                if let Some(running) = guard.as_mut() {
                    if matches!(running.try_status(), Ok(None)) {
                        self.status.set(format!(
                            "A background server is already running (PID: {})",
                            running.pid().map_or("?".to_string(), |p| p.to_string())
                        ));
                        return;
                    }
                }

                let spawned = server_log_path()
                    .map_err(|e| e.to_string())
                    .and_then(|log| ServerProcess::spawn(&argv, &log).map_err(|e| e.to_string()));
                match spawned {
                    Ok(process) => {
                        let pid = process.pid();
                        self.server_state.set(ServerState::Background {
                            pid,
                            started_at: process.started_at().format("%H:%M:%S").to_string(),
                        });
                        self.status.set(format!(
                            "Server launched in background (PID: {}), output in {}",
                            pid.map_or("?".to_string(), |p| p.to_string()),
                            process.log_path().display()
                        ));
                        *guard = Some(process);
                        self.api_info.set(Some(info));
                    }
                    Err(e) => {
                        tracing::error!("Failed to launch server: {}", e);
                        self.status.set(format!("Failed to launch server: {}", e));
                    }
                }
            }
        }
    }

    /// Stop the tracked background server.
    ///
    /// Returns `false` when there was none, so the caller can offer the
    /// kill-by-name fallback.
    pub async fn stop_server(mut self) -> bool {
        let mut guard = self.server.lock().await;
        let Some(mut process) = guard.take() else {
            return false;
        };

        let message = match process.stop().await {
            Ok(StopOutcome::Terminated) => "Background server stopped".to_string(),
            Ok(StopOutcome::Killed) => "Background server killed".to_string(),
            Ok(StopOutcome::AlreadyExited) => "Background server had already exited".to_string(),
            Err(e) => {
                tracing::error!("Error stopping server: {}", e);
                format!("Error stopping server: {}", e)
            }
        };
        self.server_state.set(ServerState::Stopped);
        self.status.set(message);
        true
    }

    /// Kill every llama-server on the machine
    pub async fn kill_all(mut self) {
        match kill_all_by_name("llama-server").await {
            Ok(true) => self
                .status
                .set("Sent kill signal to all llama-server processes".to_string()),
            Ok(false) => self.status.set("No llama-server processes found".to_string()),
            Err(e) => {
                tracing::error!("Failed to kill processes: {}", e);
                self.status.set(format!("Failed to kill processes: {}", e));
            }
        }
        self.server_state.set(ServerState::Stopped);
    }

    /// Pick the llama-server executable
    pub async fn browse_server_path(mut self) {
        let current = self.settings.read().server_path.clone();
        if let Some(path) = dialogs::pick_file("Select llama-server", &current, None).await {
            self.settings.write().server_path = path;
            self.persist_settings();
        }
    }

    /// Pick the models directory and rescan it
    pub async fn browse_models_directory(mut self) {
        let current = self.settings.read().models_directory.clone().unwrap_or_default();
        if let Some(dir) = dialogs::pick_folder("Select GGUF directory", &current).await {
            self.settings.write().models_directory = Some(dir);
            self.persist_settings();
            self.refresh_models();
        }
    }

    /// Pick a file for a path-valued option such as `mmproj`
    pub async fn browse_option_file(
        mut self,
        key: &'static str,
        title: &'static str,
        filter: Filter,
    ) {
        let current = self
            .form
            .read()
            .value_token(key)
            .map(PathBuf::from)
            .or_else(|| self.settings.read().models_directory.clone())
            .unwrap_or_default();
        if let Some(path) = dialogs::pick_file(title, &current, Some(filter)).await {
            self.set_option(key, OptionValue::from(path.to_string_lossy().into_owned()));
        }
    }

    /// Save settings and settle the background server as the window closes.
    ///
    /// Runs on the window event loop, so nothing here may await.
    pub fn close(mut self) {
        if self.selected.peek().is_some() {
            self.save_current();
        } else {
            self.persist_settings();
        }

        let Ok(mut guard) = self.server.try_lock() else {
            tracing::warn!("Server handle busy at close, leaving it running");
            return;
        };
        let Some(process) = guard.as_mut() else {
            return;
        };
        if !matches!(process.try_status(), Ok(None)) {
            return;
        }

        let pid = process.pid().map_or("?".to_string(), |p| p.to_string());
        let message = format!(
            "llama-server (PID: {}) is still running in the background.\nStop it before closing?",
            pid
        );
        if dialogs::confirm("Background server running", &message) {
            match process.terminate() {
                Ok(()) => tracing::info!("Sent stop signal to background server {}", pid),
                Err(e) => tracing::error!("Failed to stop background server: {}", e),
            }
            *guard = None;
        } else {
            tracing::info!(
                "Leaving background server {} running, output in {}",
                pid,
                process.log_path().display()
            );
        }
    }

    /// Notice when the background server exits on its own
    async fn poll_server(mut self) {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            let mut guard = self.server.lock().await;
            let Some(process) = guard.as_mut() else {
                continue;
            };
            match process.try_status() {
                Ok(Some(status)) => {
                    tracing::info!("Background server exited with {}", status);
                    *guard = None;
                    self.server_state.set(ServerState::Stopped);
                    self.status.set(format!("Server exited ({})", status));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Could not poll server: {}", e),
            }
        }
    }
}

/// The argv for `form` with the selected model filled in.
///
/// Without a model only the executable is returned.
pub fn launch_arguments(
    settings: &LauncherSettings,
    model: Option<&ModelEntry>,
    form: &LaunchConfig,
) -> Vec<String> {
    let Some(model) = model else {
        return vec![settings.server_path.to_string_lossy().into_owned()];
    };

    let mut config = form.clone();
    if let Err(e) = config.insert("model", model.path.to_string_lossy().into_owned()) {
        tracing::warn!("Could not set model path: {}", e);
    }
    build_arguments(&config, &settings.server_path)
}

#[component]
pub fn App() -> Element {
    let app_state = use_context_provider(AppState::new);

    {
        let mut app_state = app_state.clone();
        use_hook(move || app_state.restore_session());
    }

    {
        let app_state = app_state.clone();
        use_future(move || app_state.clone().poll_server());
    }

    {
        let app_state = app_state.clone();
        use_wry_event_handler(move |event, _| {
            if let Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } = event
            {
                app_state.clone().close();
            }
        });
    }

    rsx! {
        document::Link { rel: "stylesheet", href: STYLE }
        Layout {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings() -> LauncherSettings {
        LauncherSettings {
            server_path: PathBuf::from("/opt/llama/llama-server"),
            ..LauncherSettings::default()
        }
    }

    #[test]
    fn test_no_model_gives_executable_only() {
        let argv = launch_arguments(&settings(), None, &LaunchConfig::form_defaults());
        assert_eq!(argv, vec!["/opt/llama/llama-server"]);
    }

    #[test]
    fn test_model_path_follows_executable() {
        let entry = ModelEntry {
            filename: "a.gguf".to_string(),
            path: PathBuf::from("/models/a.gguf"),
            size_bytes: 1,
        };
        let form = LaunchConfig::new().with("port", 9000).unwrap();
        let argv = launch_arguments(&settings(), Some(&entry), &form);
        assert_eq!(
            argv,
            vec!["/opt/llama/llama-server", "-m", "/models/a.gguf", "--port", "9000"]
        );
    }
}
