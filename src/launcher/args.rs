//! Argument assembly
//!
//! Turns a `LaunchConfig` into the argv handed to the process spawner.

use crate::launcher::options::{OptionKind, OPTIONS};
use crate::types::config::LaunchConfig;
use std::path::Path;

/// Build the ordered token list for one invocation.
///
/// The executable is always the first token. Options follow in the order of
/// [`OPTIONS`]; unset values and switched-off flags produce no tokens, which
/// leaves the server's own defaults in effect.
pub fn build_arguments(config: &LaunchConfig, executable: impl AsRef<Path>) -> Vec<String> {
    let mut tokens = vec![executable.as_ref().to_string_lossy().into_owned()];

    for spec in OPTIONS {
        match spec.kind {
            OptionKind::Flag => {
                if config.flag(spec.key) {
                    tokens.push(spec.flag.to_string());
                }
            }
            OptionKind::Raw => {
                if let Some(raw) = config.value_token(spec.key) {
                    tokens.extend(split_custom_args(&raw));
                }
            }
            OptionKind::Text | OptionKind::Integer | OptionKind::Float => {
                if let Some(value) = config.value_token(spec.key) {
                    tokens.push(spec.flag.to_string());
                    tokens.push(value);
                }
            }
        }
    }

    tokens
}

/// Split user-supplied extra arguments with POSIX shell rules.
///
/// Unbalanced quotes fall back to whitespace splitting so a half-typed field
/// still previews something sensible.
pub fn split_custom_args(raw: &str) -> Vec<String> {
    match shlex::split(raw) {
        Some(parts) => parts,
        None => {
            tracing::debug!("Unbalanced quotes in custom arguments, splitting on whitespace");
            raw.split_whitespace().map(str::to_string).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXE: &str = "/opt/llama.cpp/llama-server";

    #[test]
    fn test_empty_config_is_executable_only() {
        let tokens = build_arguments(&LaunchConfig::new(), EXE);
        assert_eq!(tokens, vec![EXE.to_string()]);
    }

    #[test]
    fn test_mixed_values_and_flags() {
        let config = LaunchConfig::new()
            .with("threads", -1)
            .unwrap()
            .with("ctx_size", 4096)
            .unwrap()
            .with("flash_attn", true)
            .unwrap()
            .with("api_key", "")
            .unwrap();

        let tokens = build_arguments(&config, EXE);
        assert_eq!(
            tokens,
            vec![EXE, "--threads", "-1", "--ctx-size", "4096", "-fa"]
        );
        assert!(!tokens.iter().any(|t| t == "--api-key"));
    }

    #[test]
    fn test_false_flags_are_omitted() {
        let config = LaunchConfig::new()
            .with("mlock", false)
            .unwrap()
            .with("metrics", true)
            .unwrap();
        assert_eq!(build_arguments(&config, EXE), vec![EXE, "--metrics"]);
    }

    #[test]
    fn test_form_defaults_order() {
        let config = LaunchConfig::form_defaults()
            .with("model", "/models/llama 3.gguf")
            .unwrap();
        let tokens = build_arguments(&config, EXE);
        assert_eq!(
            tokens,
            vec![
                EXE,
                "-m",
                "/models/llama 3.gguf",
                "--host",
                "0.0.0.0",
                "--port",
                "8033",
                "-ngl",
                "99",
                "--threads",
                "-1",
                "--ctx-size",
                "8192",
                "--temp",
                "0.7",
                "--min-p",
                "0.0",
                "--top-p",
                "0.9",
                "--top-k",
                "40",
                "--presence-penalty",
                "0.0",
                "--jinja",
                "-cb",
            ]
        );
    }

    #[test]
    fn test_text_values_are_trimmed_single_tokens() {
        let config = LaunchConfig::new()
            .with("model_alias", "  my model  ")
            .unwrap();
        assert_eq!(build_arguments(&config, EXE), vec![EXE, "--alias", "my model"]);
    }

    #[test]
    fn test_custom_args_come_last() {
        let config = LaunchConfig::new()
            .with("custom_args", "--slot-save-path '/tmp/my slots' -v")
            .unwrap()
            .with("verbose", true)
            .unwrap()
            .with("port", 9000)
            .unwrap();
        assert_eq!(
            build_arguments(&config, EXE),
            vec![
                EXE,
                "--port",
                "9000",
                "--verbose",
                "--slot-save-path",
                "/tmp/my slots",
                "-v"
            ]
        );
    }

    #[test]
    fn test_unbalanced_custom_args_fall_back() {
        assert_eq!(split_custom_args("--foo 'bar baz"), vec!["--foo", "'bar", "baz"]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = LaunchConfig::new().with("future_option", "1").unwrap();
        assert_eq!(build_arguments(&config, EXE), vec![EXE]);
    }

    #[test]
    fn test_stored_whole_float_renders_as_integer() {
        let config: LaunchConfig = serde_json::from_str(r#"{"ctx_size": 8192.0}"#).unwrap();
        assert_eq!(build_arguments(&config, "srv"), vec!["srv", "--ctx-size", "8192"]);
    }

    #[test]
    fn test_deterministic() {
        let config = LaunchConfig::form_defaults()
            .with("custom_args", "--a 1 --b")
            .unwrap();
        assert_eq!(build_arguments(&config, EXE), build_arguments(&config, EXE));
    }
}
