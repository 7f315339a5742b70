//! Point-in-time view of the desktop.
//!
//! The watcher builds a [`SystemSnapshot`] once per poll from two OS sources:
//! the visible top-level windows and the process table.  Everything downstream
//! (matching, search, the manager's window listing) works on this plain data,
//! so it can be tested without a desktop session.

use std::collections::HashMap;

/// A visible top-level window with a non-empty title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub title: String,
    /// Process that owns the window.
    pub pid: u32,
}

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Executable file name, e.g. `eldenring.exe`.
    pub exe_name: String,
}

/// Visible windows (in z-order) and running processes at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemSnapshot {
    windows: Vec<WindowInfo>,
    processes: Vec<ProcessInfo>,
    names: HashMap<u32, usize>,
}

impl SystemSnapshot {
    /// Builds a snapshot and indexes the process table by PID.
    ///
    /// If the process table lists a PID twice the first row wins.
    pub fn new(windows: Vec<WindowInfo>, processes: Vec<ProcessInfo>) -> Self {
        let mut names = HashMap::with_capacity(processes.len());
        for (i, p) in processes.iter().enumerate() {
            names.entry(p.pid).or_insert(i);
        }
        Self {
            windows,
            processes,
            names,
        }
    }

    pub fn windows(&self) -> &[WindowInfo] {
        &self.windows
    }

    pub fn processes(&self) -> &[ProcessInfo] {
        &self.processes
    }

    /// Returns the executable name of `pid`, if it is in the process table.
    pub fn process_name(&self, pid: u32) -> Option<&str> {
        self.names
            .get(&pid)
            .map(|&i| self.processes[i].exe_name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty() && self.processes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(title: &str, pid: u32) -> WindowInfo {
        WindowInfo {
            title: title.to_string(),
            pid,
        }
    }

    fn process(pid: u32, exe: &str) -> ProcessInfo {
        ProcessInfo {
            pid,
            exe_name: exe.to_string(),
        }
    }

    #[test]
    fn test_process_name_looks_up_by_pid() {
        let snap = SystemSnapshot::new(
            vec![window("ELDEN RING", 42)],
            vec![process(4, "System"), process(42, "eldenring.exe")],
        );
        assert_eq!(snap.process_name(42), Some("eldenring.exe"));
        assert_eq!(snap.process_name(7), None);
    }

    #[test]
    fn test_duplicate_pid_keeps_first_row() {
        let snap = SystemSnapshot::new(vec![], vec![process(9, "first.exe"), process(9, "second.exe")]);
        assert_eq!(snap.process_name(9), Some("first.exe"));
    }

    #[test]
    fn test_default_snapshot_is_empty() {
        assert!(SystemSnapshot::default().is_empty());
        assert!(!SystemSnapshot::new(vec![window("x", 1)], vec![]).is_empty());
    }
}
