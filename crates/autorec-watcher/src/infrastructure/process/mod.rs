//! Process control for the watcher: liveness checks, termination, and
//! launching the watcher in the background.
//!
//! Liveness and termination need Win32 handles; on other platforms a PID is
//! never reported alive and termination returns
//! [`ProcessError::UnsupportedPlatform`].

use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for process control.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{call} failed for PID {pid}: {message}")]
    Os {
        call: &'static str,
        pid: u32,
        message: String,
    },
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Returns `true` if a process with `pid` exists and has not exited.
pub fn is_process_alive(pid: u32) -> bool {
    #[cfg(target_os = "windows")]
    {
        windows::is_process_alive(pid)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = pid;
        false
    }
}

/// Forcibly terminates `pid`.
pub fn terminate_process(pid: u32) -> Result<(), ProcessError> {
    #[cfg(target_os = "windows")]
    {
        windows::terminate_process(pid)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = pid;
        Err(ProcessError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}

/// Launches `program` without a console window, appending its stdout and
/// stderr to `log_file`.  Returns the child's PID; the child is not waited on.
pub fn spawn_detached(program: &Path, args: &[String], log_file: &Path) -> Result<u32, ProcessError> {
    let log_err = |source| ProcessError::LogFile {
        path: log_file.to_path_buf(),
        source,
    };
    if let Some(dir) = log_file.parent() {
        std::fs::create_dir_all(dir).map_err(log_err)?;
    }
    let stdout = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(log_err)?;
    let stderr = stdout.try_clone().map_err(log_err)?;

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(windows::CREATE_NO_WINDOW);
    }

    let child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: program.display().to_string(),
        source,
    })?;
    debug!("spawned {} as PID {}", program.display(), child.id());
    Ok(child.id())
}
