//! `status`: one screen summarising the watcher and the games list.

use std::fmt;

use autorec_core::{GamesConfig, WatcherState};

/// Everything `status` prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// PID of a live watcher, `None` when it is not running.
    pub watcher_pid: Option<u32>,
    /// Last state the watcher published, if any.
    pub state: Option<WatcherState>,
    pub enabled: usize,
    pub total: usize,
}

impl StatusReport {
    pub fn new(watcher_pid: Option<u32>, state: Option<WatcherState>, games: &GamesConfig) -> Self {
        Self {
            watcher_pid,
            // A state file left behind by a dead watcher is stale.
            state: watcher_pid.and(state),
            enabled: games.enabled_count(),
            total: games.len(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.watcher_pid.is_some()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.watcher_pid {
            Some(pid) => writeln!(f, "Watcher: running (PID {pid})")?,
            None => writeln!(f, "Watcher: stopped")?,
        }
        if self.is_running() {
            match &self.state {
                Some(state) => writeln!(f, "State:   {}", describe_state(state))?,
                None => writeln!(f, "State:   starting")?,
            }
        }
        writeln!(f, "Games:   {} enabled of {}", self.enabled, self.total)
    }
}

/// Human-readable form of a state line.
pub fn describe_state(state: &WatcherState) -> String {
    match state {
        WatcherState::Idle => "idle, waiting for a game".to_string(),
        WatcherState::Recording { game } => format!("recording {game}"),
        WatcherState::Detected { game } => format!("{game} running, OBS was already recording"),
        WatcherState::HostUnavailable => "OBS is not reachable".to_string(),
    }
}
