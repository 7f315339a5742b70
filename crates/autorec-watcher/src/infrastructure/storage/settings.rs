//! TOML settings for the watcher.
//!
//! ```toml
//! [watcher]
//! check_interval_ms = 3000
//! log_level = "info"
//!
//! [obs]
//! host = "127.0.0.1"
//! port = 4455
//! password = "hunter2"
//! request_timeout_ms = 5000
//! ```
//!
//! Every field is optional; fields annotated with
//! `#[serde(default = "some_fn")]` take the value of `some_fn()` when absent,
//! so a missing or partial file still yields a complete [`AppSettings`].

use std::path::Path;
use std::time::Duration;

use autorec_core::protocol::messages::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{read_optional, write_atomically, StorageError};
use crate::infrastructure::obs::ObsConnection;

/// Fastest allowed poll interval.
pub const MIN_CHECK_INTERVAL_MS: u64 = 1_000;
/// Slowest allowed poll interval.
pub const MAX_CHECK_INTERVAL_MS: u64 = 30_000;

// ── Settings schema types ─────────────────────────────────────────────────────

/// Top-level settings stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub watcher: WatcherSettings,
    #[serde(default)]
    pub obs: ObsSettings,
}

/// Poll loop behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatcherSettings {
    /// Milliseconds between polls; clamped by [`WatcherSettings::check_interval`].
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// How to reach obs-websocket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObsSettings {
    #[serde(default = "default_obs_host")]
    pub host: String,
    #[serde(default = "default_obs_port")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_check_interval_ms() -> u64 {
    3_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_obs_host() -> String {
    "127.0.0.1".to_string()
}
fn default_obs_port() -> u16 {
    DEFAULT_PORT
}
fn default_request_timeout_ms() -> u64 {
    5_000
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ObsSettings {
    fn default() -> Self {
        Self {
            host: default_obs_host(),
            port: default_obs_port(),
            password: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl WatcherSettings {
    /// The poll interval, clamped to the supported range.
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(clamp_interval_ms(self.check_interval_ms))
    }
}

impl ObsSettings {
    pub fn to_connection(&self) -> ObsConnection {
        ObsConnection {
            host: self.host.clone(),
            port: self.port,
            password: self.password.clone().filter(|p| !p.is_empty()),
            request_timeout: Duration::from_millis(self.request_timeout_ms.max(1)),
        }
    }
}

/// Clamps a poll interval to `MIN_CHECK_INTERVAL_MS..=MAX_CHECK_INTERVAL_MS`.
pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_CHECK_INTERVAL_MS, MAX_CHECK_INTERVAL_MS)
}

// ── Settings repository ───────────────────────────────────────────────────────

/// Loads settings from `path`, returning defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`StorageError::Io`] for file-system errors other than "not found",
/// and [`StorageError::ParseSettings`] if the TOML is malformed.
pub fn load_settings(path: &Path) -> Result<AppSettings, StorageError> {
    match read_optional(path)? {
        Some(content) => toml::from_str(&content).map_err(|source| StorageError::ParseSettings {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(AppSettings::default()),
    }
}

/// Like [`load_settings`], but writes the defaults to `path` when there is no
/// file yet, so the user has a `settings.toml` to edit.
pub fn load_or_create_settings(path: &Path) -> Result<AppSettings, StorageError> {
    if path.exists() {
        return load_settings(path);
    }
    let settings = AppSettings::default();
    save_settings(path, &settings)?;
    debug!("wrote default settings to {}", path.display());
    Ok(settings)
}

/// Persists `settings` to `path`, creating the directory if needed.
pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), StorageError> {
    let content = toml::to_string_pretty(settings)?;
    write_atomically(path, content.as_bytes())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
