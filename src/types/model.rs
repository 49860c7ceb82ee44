//! Model types
//!
//! Header-derived metadata and directory listing entries for GGUF files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Informational fields read from a model file header.
///
/// Every optional field is `None` when the header could not be parsed;
/// only the file size is always known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Architecture identifier (`general.architecture`)
    pub architecture: Option<String>,
    /// Human readable model name (`general.name`)
    pub name: Option<String>,
    /// Number of transformer blocks
    pub layer_count: Option<u64>,
    /// Training context length in tokens
    pub context_length: Option<u64>,
    /// Quantization label derived from `general.file_type`
    pub quantization: Option<String>,
    /// GGUF format version, when the magic was valid
    pub format_version: Option<u32>,
    /// Size of the file on disk
    pub file_size_bytes: u64,
}

impl ModelMetadata {
    /// Metadata with only the file size known
    pub fn unknown(file_size_bytes: u64) -> Self {
        Self {
            file_size_bytes,
            ..Self::default()
        }
    }

    pub fn size_string(&self) -> String {
        format_bytes(self.file_size_bytes)
    }
}

/// A `.gguf` file found in the models directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// File name including extension
    pub filename: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Model size in bytes
    pub size_bytes: u64,
}

impl ModelEntry {
    pub fn size_string(&self) -> String {
        format_bytes(self.size_bytes)
    }
}

/// Format bytes as a human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const GB: u64 = 1_073_741_824;
    const MB: u64 = 1_048_576;
    const KB: u64 = 1_024;

    if bytes >= GB {
        format!("{:.1} GiB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MiB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KiB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_metadata() {
        let meta = ModelMetadata::unknown(42);
        assert_eq!(meta.file_size_bytes, 42);
        assert!(meta.architecture.is_none());
        assert!(meta.layer_count.is_none());
        assert!(meta.context_length.is_none());
        assert!(meta.quantization.is_none());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1_048_576), "1.0 MiB");
        assert_eq!(format_bytes(4_294_967_296), "4.0 GiB");
    }
}
