//! Win32 process liveness and termination.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Threading::{
    GetExitCodeProcess, OpenProcess, TerminateProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    PROCESS_TERMINATE,
};

use super::ProcessError;

/// `CREATE_NO_WINDOW` process creation flag.
pub const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Exit code reported by `GetExitCodeProcess` while a process is running.
const STILL_ACTIVE: u32 = 259;

pub fn is_process_alive(pid: u32) -> bool {
    if pid == 0 {
        return false;
    }
    // SAFETY: plain FFI call; the handle is closed before returning.
    unsafe {
        let Ok(handle) = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) else {
            return false;
        };
        let mut code: u32 = 0;
        let queried = GetExitCodeProcess(handle, &mut code).is_ok();
        close(handle);
        queried && code == STILL_ACTIVE
    }
}

pub fn terminate_process(pid: u32) -> Result<(), ProcessError> {
    let os_err = |call: &'static str| move |e: windows::core::Error| ProcessError::Os {
        call,
        pid,
        message: e.to_string(),
    };
    // SAFETY: plain FFI calls; the handle is closed before returning.
    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, false, pid).map_err(os_err("OpenProcess"))?;
        let result = TerminateProcess(handle, 1).map_err(os_err("TerminateProcess"));
        close(handle);
        result
    }
}

unsafe fn close(handle: HANDLE) {
    let _ = CloseHandle(handle);
}
