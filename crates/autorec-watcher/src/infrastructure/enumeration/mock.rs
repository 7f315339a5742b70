//! Mock probe for tests and dry runs.
//!
//! Serves whatever snapshot was last set, so tests can open and close
//! "games" between watcher ticks.

use std::sync::{Arc, Mutex};

use autorec_core::{ProcessInfo, SystemSnapshot, WindowInfo};

use crate::application::record_games::{ProbeError, SystemProbe};

/// A [`SystemProbe`] backed by a settable snapshot.
#[derive(Clone, Default)]
pub struct MockProbe {
    snapshot: Arc<Mutex<SystemSnapshot>>,
    calls: Arc<Mutex<u32>>,
}

impl MockProbe {
    /// Creates a probe that reports an empty desktop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot served by later calls.
    pub fn set_snapshot(&self, snapshot: SystemSnapshot) {
        *self.snapshot.lock().expect("lock poisoned") = snapshot;
    }

    /// Shows one window owned by a process called `exe_name`.
    pub fn show_window(&self, title: &str, exe_name: &str) {
        let pid = 1000;
        self.set_snapshot(SystemSnapshot::new(
            vec![WindowInfo {
                title: title.to_string(),
                pid,
            }],
            vec![ProcessInfo {
                pid,
                exe_name: exe_name.to_string(),
            }],
        ));
    }

    /// Empties the desktop.
    pub fn clear(&self) {
        self.set_snapshot(SystemSnapshot::default());
    }

    /// Returns how many snapshots have been taken.
    pub fn snapshot_count(&self) -> u32 {
        *self.calls.lock().expect("lock poisoned")
    }
}

impl SystemProbe for MockProbe {
    fn snapshot(&self) -> Result<SystemSnapshot, ProbeError> {
        *self.calls.lock().expect("lock poisoned") += 1;
        Ok(self.snapshot.lock().expect("lock poisoned").clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_probe_serves_latest_snapshot() {
        // Arrange
        let probe = MockProbe::new();

        // Act
        probe.show_window("Hollow Knight", "hollow_knight.exe");
        let snap = probe.snapshot().unwrap();

        // Assert
        assert_eq!(snap.windows()[0].title, "Hollow Knight");
        assert_eq!(snap.process_name(1000), Some("hollow_knight.exe"));
        assert_eq!(probe.snapshot_count(), 1);
    }

    #[test]
    fn test_mock_probe_clear_empties_desktop() {
        let probe = MockProbe::new();
        probe.show_window("Hollow Knight", "hollow_knight.exe");
        probe.clear();
        assert!(probe.snapshot().unwrap().is_empty());
    }
}
