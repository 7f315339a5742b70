//! Win32 desktop enumeration.
//!
//! Visible top-level windows come from `EnumWindows`; the process table comes
//! from a `CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS)` walk.  Neither call
//! needs elevated rights, and neither opens a handle to the game process.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use autorec_core::{ProcessInfo, SystemSnapshot, WindowInfo};
use windows::Win32::Foundation::{CloseHandle, BOOL, HWND, LPARAM, TRUE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W, TH32CS_SNAPPROCESS,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId, IsWindowVisible,
};

use crate::application::record_games::{ProbeError, SystemProbe};

/// [`SystemProbe`] backed by the Win32 API.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Probe;

impl Win32Probe {
    pub fn new() -> Self {
        Self
    }
}

impl SystemProbe for Win32Probe {
    fn snapshot(&self) -> Result<SystemSnapshot, ProbeError> {
        let windows = visible_windows()?;
        let processes = process_table()?;
        Ok(SystemSnapshot::new(windows, processes))
    }
}

fn visible_windows() -> Result<Vec<WindowInfo>, ProbeError> {
    let mut windows: Vec<WindowInfo> = Vec::new();
    let windows_ptr = &mut windows as *mut Vec<WindowInfo>;

    // SAFETY: `enum_window_cb` only runs during this call and casts `lparam`
    // back to the `Vec` borrowed above, which outlives the call.
    unsafe { EnumWindows(Some(enum_window_cb), LPARAM(windows_ptr as isize)) }.map_err(|e| {
        ProbeError::Os {
            call: "EnumWindows",
            message: e.to_string(),
        }
    })?;

    Ok(windows)
}

/// `EnumWindows` callback: keeps visible windows with a non-empty title.
///
/// # Safety
///
/// `lparam` must point to a live `Vec<WindowInfo>`.
unsafe extern "system" fn enum_window_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
    if !IsWindowVisible(hwnd).as_bool() {
        return TRUE;
    }

    let len = GetWindowTextLengthW(hwnd);
    if len <= 0 {
        return TRUE;
    }
    let mut buf = vec![0u16; len as usize + 1];
    let copied = GetWindowTextW(hwnd, &mut buf);
    if copied <= 0 {
        return TRUE;
    }
    let title = String::from_utf16_lossy(&buf[..copied as usize]);
    if title.trim().is_empty() {
        return TRUE;
    }

    let mut pid: u32 = 0;
    GetWindowThreadProcessId(hwnd, Some(&mut pid));

    let list = &mut *(lparam.0 as *mut Vec<WindowInfo>);
    list.push(WindowInfo { title, pid });

    TRUE
}

fn process_table() -> Result<Vec<ProcessInfo>, ProbeError> {
    // SAFETY: plain FFI call; the returned handle is closed below.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }.map_err(|e| {
        ProbeError::Os {
            call: "CreateToolhelp32Snapshot",
            message: e.to_string(),
        }
    })?;

    let mut processes = Vec::with_capacity(256);
    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    // SAFETY: `entry.dwSize` is initialised as the API requires and `entry`
    // lives for the whole walk.  `snapshot` is a valid ToolHelp handle.
    unsafe {
        let mut more = Process32FirstW(snapshot, &mut entry).is_ok();
        while more {
            processes.push(ProcessInfo {
                pid: entry.th32ProcessID,
                exe_name: wide_to_string(&entry.szExeFile),
            });
            more = Process32NextW(snapshot, &mut entry).is_ok();
        }
        let _ = CloseHandle(snapshot);
    }

    Ok(processes)
}

/// Converts a NUL-terminated UTF-16 buffer.
fn wide_to_string(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}
