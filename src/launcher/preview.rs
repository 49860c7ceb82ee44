//! Human-readable command rendering
//!
//! The preview and the copyable command line are built from the exact argv
//! that gets spawned; the only difference is shell quoting.

use std::borrow::Cow;

/// Shown instead of a command when no model is selected
pub const NO_MODEL_PLACEHOLDER: &str = "# No model selected";

/// Quote a token for a POSIX shell if it needs it
pub fn quote(token: &str) -> Cow<'_, str> {
    match shlex::try_quote(token) {
        Ok(quoted) => quoted,
        // Interior nul bytes cannot reach an argv anyway
        Err(_) => Cow::Borrowed(token),
    }
}

/// Single-line, space-joined, shell-quoted form for copy/paste and
/// terminal launch.
pub fn command_line(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| quote(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-line preview with one option per line and ` \` continuations.
pub fn preview(tokens: &[String]) -> String {
    let Some((executable, rest)) = tokens.split_first() else {
        return NO_MODEL_PLACEHOLDER.to_string();
    };
    if rest.is_empty() {
        return NO_MODEL_PLACEHOLDER.to_string();
    }

    let mut lines = vec![quote(executable).into_owned()];
    let mut i = 0;
    while i < rest.len() {
        let token = &rest[i];
        let next = rest.get(i + 1);
        match next {
            Some(value) if is_flag(token) && !is_flag(value) => {
                lines.push(format!("  {} {}", quote(token), quote(value)));
                i += 2;
            }
            _ => {
                lines.push(format!("  {}", quote(token)));
                i += 1;
            }
        }
    }

    lines.join(" \\\n")
}

/// A token starting with `-` that is not a negative number
fn is_flag(token: &str) -> bool {
    token.starts_with('-') && token.parse::<f64>().is_err()
}
