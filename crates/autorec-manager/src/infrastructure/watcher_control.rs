//! Starting, stopping and observing the background watcher.
//!
//! The manager and the watcher never talk directly.  The watcher records its
//! PID in `watcher.pid` and its state in `game_state`; the manager reads both
//! files and uses the PID to check liveness or terminate the process.
//!
//! A PID file whose process is gone is stale (the watcher was killed or the
//! machine rebooted) and is removed the first time it is noticed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use autorec_core::WatcherState;
use autorec_watcher::infrastructure::process::{
    is_process_alive, spawn_detached, terminate_process, ProcessError,
};
use autorec_watcher::infrastructure::storage::runtime::{PidFile, StateFile};
use autorec_watcher::infrastructure::storage::{AppPaths, StorageError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How long `start_watcher` waits for the new watcher to write its PID file.
pub const START_TIMEOUT: Duration = Duration::from_secs(2);

const START_POLL: Duration = Duration::from_millis(100);

/// File name of the watcher executable for this platform.
pub fn watcher_file_name() -> String {
    format!("autorec-watcher{}", std::env::consts::EXE_SUFFIX)
}

/// Error type for watcher control.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("the watcher is already running (PID {0})")]
    AlreadyRunning(u32),

    #[error("the watcher is not running")]
    NotRunning,

    #[error("watcher executable not found at {0}")]
    WatcherBinaryMissing(PathBuf),

    #[error("the watcher did not start within {timeout:?}; see {log}")]
    StartTimeout { timeout: Duration, log: PathBuf },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Controls the watcher for one data directory.
#[derive(Debug, Clone)]
pub struct WatcherControl {
    paths: AppPaths,
    watcher_exe: PathBuf,
    pid_file: PidFile,
    state_file: StateFile,
}

impl WatcherControl {
    pub fn new(paths: AppPaths, watcher_exe: PathBuf) -> Self {
        let pid_file = PidFile::new(paths.pid_file());
        let state_file = StateFile::new(paths.state_file());
        Self {
            paths,
            watcher_exe,
            pid_file,
            state_file,
        }
    }

    /// Uses `explicit` if given, otherwise the watcher next to the running
    /// manager executable.
    pub fn locate_watcher(explicit: Option<PathBuf>) -> std::io::Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path),
            None => Ok(std::env::current_exe()?.with_file_name(watcher_file_name())),
        }
    }

    pub fn watcher_exe(&self) -> &Path {
        &self.watcher_exe
    }

    pub fn state_file(&self) -> &StateFile {
        &self.state_file
    }

    /// PID of the live watcher, or `None`.  Removes a stale or unreadable PID file.
    pub fn watcher_pid(&self) -> Result<Option<u32>, ControlError> {
        let pid = match self.pid_file.read() {
            Ok(Some(pid)) => pid,
            Ok(None) => return Ok(None),
            Err(StorageError::Corrupt { content, .. }) => {
                warn!("removing unreadable PID file (content '{content}')");
                self.pid_file.remove()?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if is_process_alive(pid) {
            Ok(Some(pid))
        } else {
            debug!("removing stale PID file for PID {pid}");
            self.pid_file.remove()?;
            Ok(None)
        }
    }

    /// Last state the watcher published; an unreadable file counts as none.
    pub fn current_state(&self) -> Option<WatcherState> {
        match self.state_file.read() {
            Ok(state) => state,
            Err(e) => {
                warn!("ignoring state file: {e}");
                None
            }
        }
    }

    /// Launches the watcher in the background and waits for it to come up.
    ///
    /// Returns the PID the watcher recorded.  Its output is appended to
    /// `watcher.log` in the data directory.
    pub async fn start_watcher(&self) -> Result<u32, ControlError> {
        if let Some(pid) = self.watcher_pid()? {
            return Err(ControlError::AlreadyRunning(pid));
        }
        if !self.watcher_exe.is_file() {
            return Err(ControlError::WatcherBinaryMissing(self.watcher_exe.clone()));
        }
        self.paths.ensure_root()?;

        let args = vec![
            "--data-dir".to_string(),
            self.paths.root().display().to_string(),
        ];
        let log = self.paths.log_file();
        let child = spawn_detached(&self.watcher_exe, &args, &log)?;
        info!("launched watcher as PID {child}");

        let deadline = tokio::time::Instant::now() + START_TIMEOUT;
        loop {
            if let Ok(Some(pid)) = self.pid_file.read() {
                return Ok(pid);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ControlError::StartTimeout {
                    timeout: START_TIMEOUT,
                    log,
                });
            }
            tokio::time::sleep(START_POLL).await;
        }
    }

    /// Terminates the watcher and removes its runtime files.
    ///
    /// A recording the watcher started keeps running in OBS.
    pub fn stop_watcher(&self) -> Result<u32, ControlError> {
        let pid = self.watcher_pid()?.ok_or(ControlError::NotRunning)?;
        terminate_process(pid)?;
        info!("terminated watcher PID {pid}");

        self.pid_file.remove()?;
        self.state_file.remove()?;
        Ok(pid)
    }
}

// ── State monitor ─────────────────────────────────────────────────────────────

/// Polls the state file every `period` and reports each change as
/// `[HH:MM:SS] <state>` until `shutdown` flips to `true`.
///
/// A missing file is reported once as `waiting for watcher`.
pub async fn monitor_state(
    state_file: &StateFile,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut report: impl FnMut(String),
) {
    let mut last: Option<Option<WatcherState>> = None;
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let state = match state_file.read() {
                    Ok(state) => state,
                    Err(e) => {
                        debug!("state file unreadable this poll: {e}");
                        continue;
                    }
                };
                if last.as_ref() != Some(&state) {
                    let text = match &state {
                        Some(state) => state.to_string(),
                        None => "waiting for watcher".to_string(),
                    };
                    report(format!("[{}] {text}", chrono::Local::now().format("%H:%M:%S")));
                    last = Some(state);
                }
            }
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
