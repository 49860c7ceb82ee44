//! Native file pickers and confirmations

use rfd::{AsyncFileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use std::path::{Path, PathBuf};

/// File type filter for a picker: a name and extensions without dots
pub type Filter = (&'static str, &'static [&'static str]);

pub const GGUF_FILTER: Filter = ("GGUF models", &["gguf"]);
pub const TEMPLATE_FILTER: Filter = ("Jinja templates", &["jinja", "j2", "txt"]);

/// Directory a picker should open in for the current field value.
///
/// A directory opens as itself, a file in its parent. Paths that do not
/// exist give `None` and the picker uses its own default.
pub fn start_directory(current: &Path) -> Option<PathBuf> {
    if current.as_os_str().is_empty() {
        return None;
    }
    if current.is_dir() {
        return Some(current.to_path_buf());
    }
    current
        .parent()
        .filter(|p| p.is_dir())
        .map(Path::to_path_buf)
}

/// Ask for a single file; `None` when cancelled
pub async fn pick_file(title: &str, current: &Path, filter: Option<Filter>) -> Option<PathBuf> {
    let mut dialog = AsyncFileDialog::new().set_title(title);
    if let Some(dir) = start_directory(current) {
        dialog = dialog.set_directory(dir);
    }
    if let Some((name, extensions)) = filter {
        dialog = dialog.add_filter(name, extensions).add_filter("All files", &["*"]);
    }

    let picked = dialog.pick_file().await.map(|handle| handle.path().to_path_buf());
    match &picked {
        Some(path) => tracing::debug!("Picked file {}", path.display()),
        None => tracing::debug!("File selection canceled"),
    }
    picked
}

/// Ask for a directory; `None` when cancelled
pub async fn pick_folder(title: &str, current: &Path) -> Option<PathBuf> {
    let mut dialog = AsyncFileDialog::new().set_title(title);
    if let Some(dir) = start_directory(current) {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_folder().await.map(|handle| handle.path().to_path_buf())
}

/// Blocking yes/no question
pub fn confirm(title: &str, message: &str) -> bool {
    let answer = MessageDialog::new()
        .set_title(title)
        .set_description(message)
        .set_level(MessageLevel::Warning)
        .set_buttons(MessageButtons::YesNo)
        .show();
    matches!(answer, MessageDialogResult::Yes)
}
