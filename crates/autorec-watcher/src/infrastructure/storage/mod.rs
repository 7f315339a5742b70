//! Storage infrastructure: everything the watcher and manager keep on disk.
//!
//! All files live in one data directory (see [`AppPaths`]):
//!
//! ```text
//! <data dir>/
//!   games_config.json   watched games, rewritten wholesale on every edit
//!   settings.toml       poll interval, log level, OBS connection
//!   game_state          one-line watcher state for `status` / `monitor`
//!   watcher.pid         PID of the running watcher
//!   watcher.log         stdout/stderr of a watcher started by the manager
//!   icons/              per-game icons
//! ```
//!
//! Every write goes to a temporary sibling first and is then renamed over the
//! target, so a reader never sees a half-written file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

pub mod games_file;
pub mod runtime;
pub mod settings;

/// Environment variable that overrides the platform data directory.
pub const DATA_DIR_ENV: &str = "AUTOREC_HOME";

/// Error type for file storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No data directory was given and the platform one could not be found.
    #[error("could not determine the data directory; pass --data-dir or set AUTOREC_HOME")]
    NoPlatformDataDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The games list is not valid JSON of the expected shape.
    #[error("games file {path} is malformed: {source}")]
    ParseGames {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize games list: {0}")]
    SerializeGames(#[source] serde_json::Error),

    /// The settings file is not valid TOML of the expected shape.
    #[error("settings file {path} is malformed: {source}")]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    SerializeSettings(#[from] toml::ser::Error),

    /// A small runtime file (PID or state) holds something unexpected.
    #[error("unexpected content in {path}: '{content}'")]
    Corrupt { path: PathBuf, content: String },
}

impl StorageError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
        move |source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ── Data directory ────────────────────────────────────────────────────────────

/// Locations of every file in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Picks the data directory: `explicit` if given, else `$AUTOREC_HOME`,
    /// else the platform directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoPlatformDataDir`] when none of the three is
    /// available.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, StorageError> {
        resolve_root(explicit, std::env::var_os(DATA_DIR_ENV), platform_data_dir()).map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn games_file(&self) -> PathBuf {
        self.root.join("games_config.json")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.toml")
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join("game_state")
    }

    pub fn pid_file(&self) -> PathBuf {
        self.root.join("watcher.pid")
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("watcher.log")
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.root.join("icons")
    }

    /// Creates the data directory if it does not exist yet.
    pub fn ensure_root(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root).map_err(StorageError::io(&self.root))
    }
}

fn resolve_root(
    explicit: Option<PathBuf>,
    env: Option<OsString>,
    platform: Option<PathBuf>,
) -> Result<PathBuf, StorageError> {
    explicit
        .or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or(platform)
        .ok_or(StorageError::NoPlatformDataDir)
}

/// Resolves the platform data directory.
fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("GameAutoRecorder"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("game-autorecorder"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("GameAutoRecorder")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

/// Writes `contents` to a temporary sibling of `path` and renames it into place.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(StorageError::io(dir))?;
        }
    }

    let tmp = temp_sibling(path);
    if let Err(source) = std::fs::write(&tmp, contents) {
        let _ = std::fs::remove_file(&tmp);
        return Err(StorageError::Io { path: tmp, source });
    }
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// `<name>.<uuid>.tmp` next to `path`, unique per write so concurrent
/// writers never share a temporary file.
fn temp_sibling(path: &Path) -> PathBuf {
    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    path.with_file_name(tmp_name)
}

/// Deletes `path`, treating "already gone" as success.
pub(crate) fn remove_if_exists(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reads `path`, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
