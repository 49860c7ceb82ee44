//! Terminal launch
//!
//! Runs the server inside a terminal emulator window so its output stays
//! visible. The window waits for Enter after the server exits.

use crate::launcher::command_line;
use crate::system::process::LaunchError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// A supported terminal emulator and the arguments that precede the script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSpec {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

/// Emulators tried in order
pub const TERMINALS: &[TerminalSpec] = &[
    TerminalSpec {
        program: "gnome-terminal",
        args: &["--", "bash", "-c"],
    },
    TerminalSpec {
        program: "konsole",
        args: &["-e", "bash", "-c"],
    },
    TerminalSpec {
        program: "xfce4-terminal",
        args: &["-x", "bash", "-c"],
    },
    TerminalSpec {
        program: "xterm",
        args: &["-e", "bash", "-c"],
    },
];

/// First installed terminal from [`TERMINALS`]
pub fn detect_terminal() -> Option<(TerminalSpec, PathBuf)> {
    detect_terminal_with(|program| which::which(program).ok())
}

fn detect_terminal_with<F>(lookup: F) -> Option<(TerminalSpec, PathBuf)>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    TERMINALS
        .iter()
        .find_map(|spec| lookup(spec.program).map(|path| (*spec, path)))
}

/// Shell script run inside the terminal: the command, then a pause
pub fn terminal_script(argv: &[String]) -> String {
    format!(
        "{}; echo; echo 'Press Enter to close...'; read",
        command_line(argv)
    )
}

/// Full argv that opens `terminal` running `argv`
pub fn terminal_command(spec: &TerminalSpec, terminal: PathBuf, argv: &[String]) -> Vec<String> {
    let mut command = vec![terminal.to_string_lossy().into_owned()];
    command.extend(spec.args.iter().map(|a| a.to_string()));
    command.push(terminal_script(argv));
    command
}

/// Open a terminal window running `argv`. The window is not tracked.
pub fn launch_in_terminal(argv: &[String]) -> Result<String, LaunchError> {
    if argv.is_empty() {
        return Err(LaunchError::EmptyCommand);
    }
    if !cfg!(target_os = "linux") {
        return Err(LaunchError::NoTerminal);
    }

    let (spec, path) = detect_terminal().ok_or(LaunchError::NoTerminal)?;
    let command = terminal_command(&spec, path, argv);

    Command::new(&command[0])
        .args(&command[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            program: spec.program.to_string(),
            source,
        })?;

    tracing::info!("Launched server in {}", spec.program);
    Ok(spec.program.to_string())
}
