//! JSON persistence for the watched-games list.
//!
//! The file is read whole and written whole:
//!
//! ```json
//! {
//!   "games": [
//!     { "name": "Elden Ring", "selector": "ELDEN RING", "icon_path": "", "enabled": true }
//!   ]
//! }
//! ```
//!
//! A missing (or blank) file is an empty list.  A file that exists but does
//! not parse is an error: callers must not overwrite what they could not read.

use std::path::{Path, PathBuf};

use autorec_core::GamesConfig;
use tracing::debug;

use super::{read_optional, write_atomically, StorageError};
use crate::application::record_games::GamesSource;

/// The games list file.
#[derive(Debug, Clone)]
pub struct GamesFile {
    path: PathBuf,
}

impl GamesFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the list, returning an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] for file-system errors other than "not
    /// found", and [`StorageError::ParseGames`] if the JSON is malformed.
    pub fn load(&self) -> Result<GamesConfig, StorageError> {
        match read_optional(&self.path)? {
            Some(content) if !content.trim().is_empty() => {
                serde_json::from_str(&content).map_err(|source| StorageError::ParseGames {
                    path: self.path.clone(),
                    source,
                })
            }
            _ => {
                debug!("no games file at {}, starting empty", self.path.display());
                Ok(GamesConfig::default())
            }
        }
    }

    /// Replaces the file with `config`, pretty-printed with two-space indents.
    pub fn save(&self, config: &GamesConfig) -> Result<(), StorageError> {
        let mut json = serde_json::to_string_pretty(config).map_err(StorageError::SerializeGames)?;
        json.push('\n');
        write_atomically(&self.path, json.as_bytes())
    }
}

impl GamesSource for GamesFile {
    fn load_games(&self) -> Result<GamesConfig, String> {
        self.load().map_err(|e| e.to_string())
    }
}
