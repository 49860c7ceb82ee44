//! Model discovery
//!
//! Lists the `.gguf` files in the models directory and filters them by the
//! search box text.

use crate::storage::StorageError;
use crate::types::model::ModelEntry;
use glob::{glob_with, MatchOptions, Pattern};
use std::path::Path;

/// List `.gguf` files (any case) directly inside `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn scan_models_directory(dir: &Path) -> Result<Vec<ModelEntry>, StorageError> {
    if !dir.is_dir() {
        tracing::debug!("Models directory {:?} does not exist", dir);
        return Ok(Vec::new());
    }

    let escaped = Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped).join("*.gguf");
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut models = Vec::new();
    for entry in glob_with(&pattern.to_string_lossy(), options)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let Ok(meta) = path.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Some(filename) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        models.push(ModelEntry {
            filename,
            path,
            size_bytes: meta.len(),
        });
    }

    models.sort_by(|a, b| a.filename.cmp(&b.filename));
    tracing::info!("Found {} GGUF file(s) in {:?}", models.len(), dir);
    Ok(models)
}

/// Models whose file name contains every whitespace-separated term of
/// `query`, ignoring case. An empty query matches everything.
pub fn filter_models<'a>(models: &'a [ModelEntry], query: &str) -> Vec<&'a ModelEntry> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    models
        .iter()
        .filter(|m| {
            let name = m.filename.to_lowercase();
            terms.iter().all(|term| name.contains(term.as_str()))
        })
        .collect()
}

/// Default server alias for a model: its file name without `.gguf`
pub fn default_alias(filename: &str) -> &str {
    let len = filename.len();
    if len >= 5 && filename.is_char_boundary(len - 5) && filename[len - 5..].eq_ignore_ascii_case(".gguf") {
        &filename[..len - 5]
    } else {
        filename
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn entry(name: &str) -> ModelEntry {
        ModelEntry {
            filename: name.to_string(),
            path: Path::new("/models").join(name),
            size_bytes: 0,
        }
    }

    #[test]
    fn test_scan_finds_gguf_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-model.gguf"), b"GGUF").unwrap();
        fs::write(dir.path().join("A-model.GGUF"), b"GGUF1234").unwrap();
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        fs::create_dir(dir.path().join("folder.gguf")).unwrap();

        let models = scan_models_directory(dir.path()).unwrap();
        let names: Vec<_> = models.iter().map(|m| m.filename.as_str()).collect();
        assert_eq!(names, vec!["A-model.GGUF", "b-model.gguf"]);
        assert_eq!(models[0].size_bytes, 8);
    }

    #[test]
    fn test_scan_directory_with_glob_characters() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("models [v2]");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("x.gguf"), b"").unwrap();

        let models = scan_models_directory(&nested).unwrap();
        assert_eq!(models.len(), 1);
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let models = scan_models_directory(&dir.path().join("nope")).unwrap();
        assert!(models.is_empty());
    }

    #[test]
    fn test_filter_requires_all_terms() {
        let models = vec![
            entry("Llama-3-8B-Instruct-Q4_K_M.gguf"),
            entry("Llama-3-70B-Q8_0.gguf"),
            entry("qwen2.5-7b-q4_k_m.gguf"),
        ];
        let hits: Vec<_> = filter_models(&models, "llama q4")
            .into_iter()
            .map(|m| m.filename.as_str())
            .collect();
        assert_eq!(hits, vec!["Llama-3-8B-Instruct-Q4_K_M.gguf"]);

        assert_eq!(filter_models(&models, "  ").len(), 3);
        assert!(filter_models(&models, "mistral").is_empty());
    }

    #[test]
    fn test_default_alias() {
        assert_eq!(default_alias("model.gguf"), "model");
        assert_eq!(default_alias("Model.GGUF"), "Model");
        assert_eq!(default_alias("model.bin"), "model.bin");
        assert_eq!(default_alias(".gguf"), "");
    }
}
