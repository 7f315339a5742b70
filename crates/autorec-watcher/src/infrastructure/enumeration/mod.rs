//! Desktop enumeration: which windows are visible and which processes run.
//!
//! On Windows the [`windows::Win32Probe`] walks the top-level windows with
//! `EnumWindows` and the process table with a ToolHelp snapshot.  Other
//! platforms get [`UnsupportedProbe`], which lets the manager's `games` and
//! settings commands work everywhere while detection reports a clear error.
//!
//! # Testability
//!
//! The [`SystemProbe`] trait lets tests serve fixed snapshots through
//! [`mock::MockProbe`] without a desktop session.

use autorec_core::SystemSnapshot;

use crate::application::record_games::{ProbeError, SystemProbe};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// The probe for the platform this binary was built for.
#[cfg(target_os = "windows")]
pub type NativeProbe = windows::Win32Probe;

/// The probe for the platform this binary was built for.
#[cfg(not(target_os = "windows"))]
pub type NativeProbe = UnsupportedProbe;

/// Probe used on platforms without window enumeration support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedProbe;

impl UnsupportedProbe {
    pub fn new() -> Self {
        Self
    }
}

impl SystemProbe for UnsupportedProbe {
    fn snapshot(&self) -> Result<SystemSnapshot, ProbeError> {
        Err(ProbeError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}
