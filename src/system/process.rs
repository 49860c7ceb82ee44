//! Background server process
//!
//! Spawns llama-server detached from the launcher's terminal, tracks the
//! child and stops it gracefully.

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::{Child, Command};

/// How long a terminated server gets before it is killed
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Errors raised while starting or stopping the server
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("llama-server executable not found: {0}")]
    ExecutableNotFound(PathBuf),
    #[error("File is not executable: {0}")]
    NotExecutable(PathBuf),
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),
    #[error("No supported terminal emulator found")]
    NoTerminal,
    #[error("Command is empty")]
    EmptyCommand,
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check the executable and model before anything is spawned
pub fn validate_launch(executable: &Path, model: &Path) -> Result<(), LaunchError> {
    let meta = fs::metadata(executable)
        .map_err(|_| LaunchError::ExecutableNotFound(executable.to_path_buf()))?;
    if !meta.is_file() {
        return Err(LaunchError::ExecutableNotFound(executable.to_path_buf()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 == 0 {
            return Err(LaunchError::NotExecutable(executable.to_path_buf()));
        }
    }

    if !model.is_file() {
        return Err(LaunchError::ModelNotFound(model.to_path_buf()));
    }

    Ok(())
}

/// How a stop request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Exited within the grace period after SIGTERM
    Terminated,
    /// Had to be killed
    Killed,
    /// Was no longer running when the stop was requested
    AlreadyExited,
}

/// A llama-server started in background mode
#[derive(Debug)]
pub struct ServerProcess {
    child: Child,
    pid: Option<u32>,
    started_at: DateTime<Local>,
    log_path: PathBuf,
}

impl ServerProcess {
    /// Start `argv` in its own process group with output appended to `log_path`
    pub fn spawn(argv: &[String], log_path: &Path) -> Result<Self, LaunchError> {
        let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let stdout = OpenOptions::new().create(true).append(true).open(log_path)?;
        let stderr = stdout.try_clone()?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        tracing::info!("Started {} (pid {:?}), logging to {:?}", program, pid, log_path);

        Ok(Self {
            child,
            pid,
            started_at: Local::now(),
            log_path: log_path.to_path_buf(),
        })
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// File receiving the server's stdout and stderr
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Non-blocking check; `Some` once the child has exited
    pub fn try_status(&mut self) -> Result<Option<ExitStatus>, LaunchError> {
        Ok(self.child.try_wait()?)
    }

    /// SIGTERM, wait up to [`STOP_GRACE_PERIOD`], then kill
    pub async fn stop(&mut self) -> Result<StopOutcome, LaunchError> {
        if let Some(status) = self.child.try_wait()? {
            tracing::info!("Server already exited with {}", status);
            return Ok(StopOutcome::AlreadyExited);
        }

        self.terminate()?;

        match tokio::time::timeout(STOP_GRACE_PERIOD, self.child.wait()).await {
            Ok(status) => {
                tracing::info!("Server terminated with {}", status?);
                Ok(StopOutcome::Terminated)
            }
            Err(_) => {
                tracing::warn!(
                    "Server did not exit within {:?}, killing it",
                    STOP_GRACE_PERIOD
                );
                self.kill_group();
                self.child.kill().await?;
                Ok(StopOutcome::Killed)
            }
        }
    }

    /// Ask the server to exit without waiting for it
    #[cfg(unix)]
    pub fn terminate(&mut self) -> Result<(), LaunchError> {
        let Some(pid) = self.pid else {
            return Ok(());
        };
        // The child leads its own group, so the group id equals its pid
        let result = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGTERM) };
        if result == -1 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                return Err(err.into());
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn terminate(&mut self) -> Result<(), LaunchError> {
        self.child.start_kill()?;
        Ok(())
    }

    #[cfg(unix)]
    fn kill_group(&self) {
        let Some(pid) = self.pid else {
            return;
        };
        let result = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if result == -1 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::ESRCH) {
                tracing::warn!("Failed to kill process group {}: {}", pid, err);
            }
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}
}

/// Kill every process whose command line matches `name`.
///
/// Returns whether anything matched.
pub async fn kill_all_by_name(name: &str) -> Result<bool, LaunchError> {
    let status = Command::new("pkill")
        .arg("-f")
        .arg(name)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|source| LaunchError::Spawn {
            program: "pkill".to_string(),
            source,
        })?;

    let matched = status.success();
    tracing::info!("pkill -f {} matched: {}", name, matched);
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_missing_executable() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("m.gguf");
        fs::write(&model, b"GGUF").unwrap();

        let err = validate_launch(&dir.path().join("llama-server"), &model).unwrap_err();
        assert!(matches!(err, LaunchError::ExecutableNotFound(_)));

        // A directory is not an executable either
        let err = validate_launch(dir.path(), &model).unwrap_err();
        assert!(matches!(err, LaunchError::ExecutableNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_requires_execute_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("llama-server");
        let model = dir.path().join("m.gguf");
        fs::write(&exe, b"#!/bin/sh\n").unwrap();
        fs::write(&model, b"GGUF").unwrap();

        fs::set_permissions(&exe, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(
            validate_launch(&exe, &model),
            Err(LaunchError::NotExecutable(_))
        ));

        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(validate_launch(&exe, &model).is_ok());
        assert!(matches!(
            validate_launch(&exe, &dir.path().join("other.gguf")),
            Err(LaunchError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_spawn_empty_command() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerProcess::spawn(&[], &dir.path().join("server.log")).unwrap_err();
        assert!(matches!(err, LaunchError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let argv = vec![dir.path().join("nope").to_string_lossy().into_owned()];
        let err = ServerProcess::spawn(&argv, &dir.path().join("server.log")).unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_running_process() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs").join("server.log");
        let argv = vec!["sleep".to_string(), "30".to_string()];

        let mut server = ServerProcess::spawn(&argv, &log).unwrap();
        assert!(server.pid().is_some());
        assert!(log.exists());
        assert_eq!(server.log_path(), log.as_path());
        assert!(server.try_status().unwrap().is_none());

        assert_eq!(server.stop().await.unwrap(), StopOutcome::Terminated);
        assert!(server.try_status().unwrap().is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_exited_process() {
        let dir = tempfile::tempdir().unwrap();
        let argv = vec!["true".to_string()];

        let mut server = ServerProcess::spawn(&argv, &dir.path().join("server.log")).unwrap();
        for _ in 0..50 {
            if server.try_status().unwrap().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(server.stop().await.unwrap(), StopOutcome::AlreadyExited);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_goes_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("server.log");
        fs::write(&log, "previous run\n").unwrap();
        let argv = vec!["echo".to_string(), "listening".to_string()];

        let mut server = ServerProcess::spawn(&argv, &log).unwrap();
        server.child.wait().await.unwrap();

        let contents = fs::read_to_string(&log).unwrap();
        assert_eq!(contents, "previous run\nlistening\n");
    }
}
