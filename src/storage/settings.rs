//! Settings storage
//!
//! Persists the launcher's own settings and one option set per model file.

use crate::storage::{get_data_dir, StorageError};
use crate::types::config::{LaunchConfig, OptionValue, RunMode};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Options remembered for one model file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Form values for the server command
    #[serde(default)]
    pub options: LaunchConfig,
    /// Terminal window or detached background process
    #[serde(default)]
    pub run_mode: RunMode,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            options: LaunchConfig::form_defaults(),
            run_mode: RunMode::default(),
        }
    }
}

/// Launcher settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LauncherSettings {
    /// Path to the llama-server executable
    #[serde(default = "default_server_path")]
    pub server_path: PathBuf,
    /// Directory scanned for .gguf files
    #[serde(default)]
    pub models_directory: Option<PathBuf>,
    /// File name of the model selected when the launcher last closed
    #[serde(default)]
    pub last_selected_model: Option<String>,
    /// Saved options keyed by full model path
    #[serde(default, deserialize_with = "deserialize_model_settings")]
    pub model_settings: BTreeMap<String, ModelSettings>,
}

impl ModelSettings {
    /// Recover what is usable from an entry that failed to deserialize.
    ///
    /// Options with a value of the wrong type are dropped one by one; the
    /// rest of the entry is kept.
    fn salvage(model_path: &str, raw: &Value) -> Self {
        let mut settings = Self {
            options: LaunchConfig::new(),
            run_mode: raw
                .get("run_mode")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
        };

        let Some(options) = raw.get("options").and_then(Value::as_object) else {
            return Self {
                run_mode: settings.run_mode,
                ..Self::default()
            };
        };

        for (key, value) in options {
            let result = serde_json::from_value::<OptionValue>(value.clone())
                .map_err(|e| e.to_string())
                .and_then(|v| settings.options.insert(key.as_str(), v).map_err(|e| e.to_string()));
            if let Err(e) = result {
                tracing::warn!("Dropping saved option '{}' for {}: {}", key, model_path, e);
            }
        }
        settings
    }
}

/// Per-model entries are read one at a time so a bad value only costs that value.
fn deserialize_model_settings<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ModelSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(path, value)| {
            let settings = match ModelSettings::deserialize(&value) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Saved settings for {} are invalid: {}", path, e);
                    ModelSettings::salvage(&path, &value)
                }
            };
            (path, settings)
        })
        .collect())
}

fn default_server_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join("llama.cpp").join("llama-server"))
        .unwrap_or_else(|| PathBuf::from("llama-server"))
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            server_path: default_server_path(),
            models_directory: None,
            last_selected_model: None,
            model_settings: BTreeMap::new(),
        }
    }
}

impl LauncherSettings {
    /// Normalise values that would break the form
    pub fn validate(&mut self) {
        if self.server_path.as_os_str().is_empty() {
            self.server_path = default_server_path();
        }

        if self
            .models_directory
            .as_ref()
            .is_some_and(|d| d.as_os_str().is_empty())
        {
            self.models_directory = None;
        }

        if self
            .last_selected_model
            .as_ref()
            .is_some_and(|m| m.trim().is_empty())
        {
            self.last_selected_model = None;
        }
    }

    /// Stored settings for a model, or fresh defaults
    pub fn settings_for(&self, model_path: &Path) -> ModelSettings {
        self.model_settings
            .get(model_path.to_string_lossy().as_ref())
            .cloned()
            .unwrap_or_default()
    }

    /// Whether anything was saved for this model
    pub fn has_settings_for(&self, model_path: &Path) -> bool {
        self.model_settings
            .contains_key(model_path.to_string_lossy().as_ref())
    }

    /// Record the settings for a model, replacing any previous entry
    pub fn remember(&mut self, model_path: &Path, settings: ModelSettings) {
        self.model_settings
            .insert(model_path.to_string_lossy().into_owned(), settings);
    }
}

/// Get the settings file path
fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("launcher.json"))
}

/// Load settings from disk
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> LauncherSettings {
    match get_settings_path() {
        Ok(path) => load_settings_or_default(&path),
        Err(e) => {
            tracing::warn!("Failed to locate settings, using defaults: {}", e);
            LauncherSettings::default()
        }
    }
}

fn load_settings_or_default(path: &Path) -> LauncherSettings {
    match load_settings_from(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            if path.exists() {
                backup_unreadable(path);
            }
            LauncherSettings::default()
        }
    }
}

/// Keep a copy of a settings file that could not be read, before the next
/// save replaces it.
fn backup_unreadable(path: &Path) {
    let backup = backup_path(path);
    match fs::copy(path, &backup) {
        Ok(_) => tracing::warn!("Kept unreadable settings as {}", backup.display()),
        Err(e) => tracing::error!("Failed to back up {}: {}", path.display(), e),
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Load settings from an explicit path, with error propagation
pub fn load_settings_from(path: &Path) -> Result<LauncherSettings, StorageError> {
    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(LauncherSettings::default());
    }

    let json = fs::read_to_string(path)?;
    let mut settings: LauncherSettings = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!(
        "Loaded settings for {} model(s) from disk",
        settings.model_settings.len()
    );
    Ok(settings)
}

/// Save settings to disk
pub fn save_settings(settings: &LauncherSettings) -> Result<(), StorageError> {
    save_settings_to(&get_settings_path()?, settings)
}

/// Save settings to an explicit path
pub fn save_settings_to(path: &Path, settings: &LauncherSettings) -> Result<(), StorageError> {
    // Ensure the parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;

    tracing::debug!("Saved settings to disk");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LauncherSettings::default();
        assert!(settings.server_path.ends_with("llama-server"));
        assert!(settings.models_directory.is_none());
        assert!(settings.model_settings.is_empty());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = LauncherSettings {
            server_path: PathBuf::new(),
            models_directory: Some(PathBuf::new()),
            last_selected_model: Some("  ".to_string()),
            model_settings: BTreeMap::new(),
        };
        settings.validate();
        assert!(settings.server_path.ends_with("llama-server"));
        assert!(settings.models_directory.is_none());
        assert!(settings.last_selected_model.is_none());
    }

    #[test]
    fn test_unknown_model_gets_defaults() {
        let settings = LauncherSettings::default();
        let model = settings.settings_for(Path::new("/models/a.gguf"));
        assert_eq!(model, ModelSettings::default());
        assert_eq!(model.run_mode, RunMode::Terminal);
        assert_eq!(model.options.get("ctx_size"), Some(&OptionValue::Int(8192)));
    }

    #[test]
    fn test_remember_and_recall() {
        let mut settings = LauncherSettings::default();
        let path = Path::new("/models/a.gguf");
        let mut model = ModelSettings::default();
        model.options.insert("ctx_size", 32768).unwrap();
        model.run_mode = RunMode::Background;

        settings.remember(path, model.clone());
        assert!(settings.has_settings_for(path));
        assert_eq!(settings.settings_for(path), model);
        assert!(!settings.has_settings_for(Path::new("/models/b.gguf")));
    }

    #[test]
    fn test_settings_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("launcher.json");

        let mut settings = LauncherSettings::default();
        settings.models_directory = Some(dir.path().to_path_buf());
        settings.last_selected_model = Some("a.gguf".to_string());
        let mut model = ModelSettings::default();
        model.options.insert("api_key", "secret").unwrap();
        model.options.insert("flash_attn", true).unwrap();
        settings.remember(&dir.path().join("a.gguf"), model);

        save_settings_to(&path, &settings).unwrap();
        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_settings_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, LauncherSettings::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings_from(&path), Err(StorageError::Json(_))));
        assert_eq!(load_settings_or_default(&path), LauncherSettings::default());

        // The unreadable file is kept next to the original
        let backup = dir.path().join("launcher.json.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{ not json");
    }

    #[test]
    fn test_bad_model_entry_does_not_lose_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.json");
        fs::write(
            &path,
            r#"{"model_settings": {
                "/m/good.gguf": {"options": {"port": 9000, "ctx_size": 32768}},
                "/m/bad.gguf": {"options": {"mlock": "true", "ngl": 20}, "run_mode": "background"}
            }}"#,
        )
        .unwrap();

        let loaded = load_settings_or_default(&path);
        let good = loaded.settings_for(Path::new("/m/good.gguf"));
        assert!(loaded.has_settings_for(Path::new("/m/good.gguf")));
        assert_eq!(good.options.get("port"), Some(&OptionValue::Int(9000)));
        assert_eq!(good.options.get("ctx_size"), Some(&OptionValue::Int(32768)));

        let bad = loaded.settings_for(Path::new("/m/bad.gguf"));
        assert_eq!(bad.options.get("mlock"), None);
        assert_eq!(bad.options.get("ngl"), Some(&OptionValue::Int(20)));
        assert_eq!(bad.run_mode, RunMode::Background);
        assert!(!dir.path().join("launcher.json.bak").exists());
    }

    #[test]
    fn test_entry_without_options_object_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.json");
        fs::write(&path, r#"{"model_settings": {"/m/x.gguf": {"options": 5}}}"#).unwrap();
        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(
            loaded.settings_for(Path::new("/m/x.gguf")),
            ModelSettings::default()
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launcher.json");
        fs::write(
            &path,
            r#"{"model_settings": {"/m/x.gguf": {"options": {"port": 9000}}}}"#,
        )
        .unwrap();
        let loaded = load_settings_from(&path).unwrap();
        assert!(loaded.server_path.ends_with("llama-server"));
        let model = loaded.settings_for(Path::new("/m/x.gguf"));
        assert_eq!(model.options.get("port"), Some(&OptionValue::Int(9000)));
        assert_eq!(model.run_mode, RunMode::Terminal);
    }
}
