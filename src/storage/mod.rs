//! Persistent storage
//!
//! Launcher settings on disk and discovery of model files.

pub mod models;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing launcher data
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine a data directory for this platform")]
    NoDataDir,
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Per-user data directory for the launcher (settings, server log)
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    directories::ProjectDirs::from("com", "LlamaLauncher", "LlamaLauncher")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}

/// Where background server output is appended
pub fn server_log_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("server.log"))
}
