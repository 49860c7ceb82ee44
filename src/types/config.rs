//! Launch configuration types
//!
//! A `LaunchConfig` is the flat option-name to value mapping collected from
//! the form for one invocation of the inference server.

use crate::launcher::options::{lookup, OptionKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Value of a single launch option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Boolean payload, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render as a single argv token.
    ///
    /// Returns `None` when the value counts as unset: empty or
    /// whitespace-only text, non-finite floats, and booleans (which are
    /// flags and never carry a value token).
    pub fn to_token(&self) -> Option<String> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Int(v) => Some(v.to_string()),
            OptionValue::Float(v) if v.is_finite() => Some(format_float(*v)),
            OptionValue::Float(_) => None,
            OptionValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    /// Text shown in a form input for this value
    pub fn display_text(&self) -> String {
        match self {
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Text(s) => s.clone(),
            other => other.to_token().unwrap_or_default(),
        }
    }
}

impl OptionValue {
    /// Interpret text typed into a form field for an option of `kind`.
    ///
    /// Numbers are stored typed only when that does not change what the
    /// user typed; anything else is kept as text and passed through verbatim.
    pub fn from_input(kind: OptionKind, text: &str) -> Self {
        let trimmed = text.trim();
        match kind {
            OptionKind::Integer => match trimmed.parse::<i64>() {
                Ok(v) if v.to_string() == trimmed => OptionValue::Int(v),
                _ => OptionValue::Text(text.to_string()),
            },
            OptionKind::Float => match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() && format_float(v) == trimmed => OptionValue::Float(v),
                _ => OptionValue::Text(text.to_string()),
            },
            OptionKind::Flag => OptionValue::Bool(matches!(trimmed, "true" | "1" | "on")),
            OptionKind::Text | OptionKind::Raw => OptionValue::Text(text.to_string()),
        }
    }
}

/// Whole floats keep one decimal so `1.0` does not read as an integer flag value.
fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(i64::from(v))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

/// Rejected option assignments
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("option '{0}' is a flag and takes a boolean")]
    ExpectedFlag(String),
    #[error("option '{0}' takes a value, not a boolean")]
    ExpectedValue(String),
    #[error("option '{0}' takes an integer")]
    ExpectedInteger(String),
}

/// One fully specified invocation of the inference server.
///
/// Keys the launcher knows are type-checked on insert. Unknown keys are
/// kept as-is so settings written by other versions survive a round trip,
/// but the argument assembler ignores them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, OptionValue>",
    into = "BTreeMap<String, OptionValue>"
)]
pub struct LaunchConfig {
    values: BTreeMap<String, OptionValue>,
}

impl LaunchConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Values a freshly selected model starts with
    pub fn form_defaults() -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in [
            ("host", OptionValue::from("0.0.0.0")),
            ("port", OptionValue::from(8033)),
            ("ngl", OptionValue::from(99)),
            ("threads", OptionValue::from(-1)),
            ("ctx_size", OptionValue::from(8192)),
            ("temp", OptionValue::from(0.7)),
            ("min_p", OptionValue::from(0.0)),
            ("top_p", OptionValue::from(0.9)),
            ("top_k", OptionValue::from(40)),
            ("presence_penalty", OptionValue::from(0.0)),
            ("jinja", OptionValue::from(true)),
            ("cont_batching", OptionValue::from(true)),
        ] {
            values.insert(key.to_string(), value);
        }
        Self { values }
    }

    /// Set an option, checking its type against the option table
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Result<(), ConfigError> {
        let key = key.into();
        let value = check_type(&key, value.into())?;
        self.values.insert(key, value);
        Ok(())
    }

    /// Builder-style `insert`
    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Result<Self, ConfigError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// Token form of a valued option, `None` when absent or unset
    pub fn value_token(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(OptionValue::to_token)
    }

    /// Whether a flag option is switched on
    pub fn flag(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(OptionValue::as_bool)
            .unwrap_or(false)
    }
}

/// Check a value against the option table.
///
/// Whole floats given for an integer option come back as `Int`, so a stored
/// `8192.0` still renders as `8192`.
fn check_type(key: &str, value: OptionValue) -> Result<OptionValue, ConfigError> {
    let Some(spec) = lookup(key) else {
        return Ok(value);
    };
    match (spec.kind, value) {
        (OptionKind::Flag, value @ OptionValue::Bool(_)) => Ok(value),
        (OptionKind::Flag, _) => Err(ConfigError::ExpectedFlag(key.to_string())),
        (_, OptionValue::Bool(_)) => Err(ConfigError::ExpectedValue(key.to_string())),
        (OptionKind::Integer, OptionValue::Float(v)) => {
            if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                Ok(OptionValue::Int(v as i64))
            } else {
                Err(ConfigError::ExpectedInteger(key.to_string()))
            }
        }
        (_, value) => Ok(value),
    }
}

impl TryFrom<BTreeMap<String, OptionValue>> for LaunchConfig {
    type Error = ConfigError;

    fn try_from(values: BTreeMap<String, OptionValue>) -> Result<Self, Self::Error> {
        let values = values
            .into_iter()
            .map(|(key, value)| {
                let value = check_type(&key, value)?;
                Ok((key, value))
            })
            .collect::<Result<_, ConfigError>>()?;
        Ok(Self { values })
    }
}

impl From<LaunchConfig> for BTreeMap<String, OptionValue> {
    fn from(config: LaunchConfig) -> Self {
        config.values
    }
}

/// How the server process is started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// In a terminal emulator window, output visible to the user
    #[default]
    Terminal,
    /// Detached, tracked by pid, output appended to the server log
    Background,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_unset() {
        assert_eq!(OptionValue::from("").to_token(), None);
        assert_eq!(OptionValue::from("   ").to_token(), None);
        assert_eq!(OptionValue::from(" 8080 ").to_token().as_deref(), Some("8080"));
    }

    #[test]
    fn test_float_tokens() {
        assert_eq!(OptionValue::from(0.7).to_token().as_deref(), Some("0.7"));
        assert_eq!(OptionValue::from(1.0).to_token().as_deref(), Some("1.0"));
        assert_eq!(OptionValue::from(f64::NAN).to_token(), None);
    }

    #[test]
    fn test_flag_type_checked() {
        let mut config = LaunchConfig::new();
        assert_eq!(
            config.insert("flash_attn", "yes"),
            Err(ConfigError::ExpectedFlag("flash_attn".to_string()))
        );
        assert_eq!(
            config.insert("ctx_size", true),
            Err(ConfigError::ExpectedValue("ctx_size".to_string()))
        );
        assert_eq!(
            config.insert("top_k", 2.5),
            Err(ConfigError::ExpectedInteger("top_k".to_string()))
        );
        assert!(config.insert("flash_attn", true).is_ok());
        assert!(config.insert("ctx_size", "4096").is_ok());
        assert!(config.insert("something_new", true).is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = LaunchConfig::form_defaults()
            .with("api_key", "secret")
            .unwrap();
        let json = serde_json::to_string(&config).expect("Failed to serialize");
        let deserialized: LaunchConfig =
            serde_json::from_str(&json).expect("Failed to deserialize");
        assert_eq!(config, deserialized);
        assert_eq!(deserialized.get("port"), Some(&OptionValue::Int(8033)));
        assert!(deserialized.flag("jinja"));
    }

    #[test]
    fn test_deserialize_rejects_mistyped_flag() {
        let result: Result<LaunchConfig, _> = serde_json::from_str(r#"{"mlock": "on"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_whole_float_for_integer_option_becomes_int() {
        let config: LaunchConfig = serde_json::from_str(r#"{"ctx_size": 8192.0}"#).unwrap();
        assert_eq!(config.get("ctx_size"), Some(&OptionValue::Int(8192)));
        assert_eq!(config.value_token("ctx_size").as_deref(), Some("8192"));

        let mut config = LaunchConfig::new();
        config.insert("ngl", 99.0).unwrap();
        assert_eq!(config.get("ngl"), Some(&OptionValue::Int(99)));
        // Float options keep their decimal
        config.insert("temp", 1.0).unwrap();
        assert_eq!(config.value_token("temp").as_deref(), Some("1.0"));
        assert_eq!(
            config.insert("port", f64::INFINITY),
            Err(ConfigError::ExpectedInteger("port".to_string()))
        );
    }

    #[test]
    fn test_run_mode_default() {
        assert_eq!(RunMode::default(), RunMode::Terminal);
        assert_eq!(
            serde_json::to_string(&RunMode::Background).unwrap(),
            "\"background\""
        );
    }

    #[test]
    fn test_form_input_keeps_what_was_typed() {
        assert_eq!(OptionValue::from_input(OptionKind::Integer, "4096"), OptionValue::Int(4096));
        assert_eq!(OptionValue::from_input(OptionKind::Integer, "-1"), OptionValue::Int(-1));
        assert_eq!(
            OptionValue::from_input(OptionKind::Integer, "4k"),
            OptionValue::Text("4k".to_string())
        );
        assert_eq!(OptionValue::from_input(OptionKind::Float, "0.7"), OptionValue::Float(0.7));
        // Half-typed numbers must survive re-rendering of the field
        assert_eq!(
            OptionValue::from_input(OptionKind::Float, "0."),
            OptionValue::Text("0.".to_string())
        );
        assert_eq!(
            OptionValue::from_input(OptionKind::Float, "1"),
            OptionValue::Text("1".to_string())
        );
        assert_eq!(OptionValue::from_input(OptionKind::Float, "1").to_token().as_deref(), Some("1"));
        assert_eq!(
            OptionValue::from_input(OptionKind::Text, " a b "),
            OptionValue::Text(" a b ".to_string())
        );
    }
}
