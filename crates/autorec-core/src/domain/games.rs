//! The watched-game list.
//!
//! A [`GamesConfig`] is a small ordered list of [`GameEntry`] records.  The
//! order matters: when two enabled games are running at the same time, the one
//! listed first wins.
//!
//! # File format
//!
//! The list is persisted as JSON and rewritten wholesale on every change:
//!
//! ```json
//! {
//!   "games": [
//!     { "name": "Elden Ring", "selector": "ELDEN RING", "icon_path": "", "enabled": true }
//!   ]
//! }
//! ```
//!
//! Keys this crate does not know about are kept in `extra` maps and written
//! back unchanged, so a load/save cycle never drops data another tool added.
//!
//! # Selectors
//!
//! A selector is compared case-insensitively everywhere in this module: two
//! entries whose selectors differ only in letter case are duplicates.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error type for game list mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GamesError {
    /// The display name was empty after trimming.
    #[error("game name must not be empty")]
    EmptyName,

    /// The selector was empty after trimming.
    #[error("selector must not be empty")]
    EmptySelector,

    /// Another entry already uses this selector (compared case-insensitively).
    #[error("a game with selector '{0}' already exists")]
    DuplicateSelector(String),

    /// No entry uses this selector.
    #[error("no game with selector '{0}'")]
    NotFound(String),

    /// A 1-based index was zero or past the end of the list.
    #[error("game number {index} is out of range (1..={len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One watched game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    /// Display name shown in the CLI and in log messages.
    pub name: String,
    /// Case-insensitive substring matched against window titles and
    /// executable names.
    pub selector: String,
    /// Path to an extracted icon, or the empty string when there is none.
    #[serde(default)]
    pub icon_path: String,
    /// Disabled entries are kept in the list but never matched.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Unknown keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameEntry {
    /// Creates an enabled entry with no icon.
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            icon_path: String::new(),
            enabled: true,
            extra: Map::new(),
        }
    }

    /// Returns the icon path, or `None` when the entry has no icon.
    pub fn icon(&self) -> Option<&Path> {
        if self.icon_path.is_empty() {
            None
        } else {
            Some(Path::new(&self.icon_path))
        }
    }

    /// Returns `true` if `selector` names this entry, ignoring case and
    /// surrounding whitespace on both sides (hand-edited files may carry it).
    pub fn has_selector(&self, selector: &str) -> bool {
        self.selector.trim().to_lowercase() == selector.trim().to_lowercase()
    }
}

/// The full watched-game list as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamesConfig {
    #[serde(default)]
    pub games: Vec<GameEntry>,
    /// Unknown top-level keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl GamesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Number of entries that take part in detection.
    pub fn enabled_count(&self) -> usize {
        self.games.iter().filter(|g| g.enabled).count()
    }

    /// Iterates enabled entries in list order.
    pub fn enabled_games(&self) -> impl Iterator<Item = &GameEntry> {
        self.games.iter().filter(|g| g.enabled)
    }

    /// Looks up an entry by selector (case-insensitive).
    pub fn find_by_selector(&self, selector: &str) -> Option<&GameEntry> {
        self.games.iter().find(|g| g.has_selector(selector))
    }

    /// Appends a new entry.
    ///
    /// Both `name` and `selector` are trimmed before validation.
    ///
    /// # Errors
    ///
    /// - [`GamesError::EmptyName`] / [`GamesError::EmptySelector`] for blank input.
    /// - [`GamesError::DuplicateSelector`] if the selector is already in use.
    pub fn add_game(
        &mut self,
        name: &str,
        selector: &str,
        enabled: bool,
    ) -> Result<&GameEntry, GamesError> {
        let name = name.trim();
        let selector = selector.trim();
        if name.is_empty() {
            return Err(GamesError::EmptyName);
        }
        if selector.is_empty() {
            return Err(GamesError::EmptySelector);
        }
        if self.find_by_selector(selector).is_some() {
            return Err(GamesError::DuplicateSelector(selector.to_string()));
        }

        let mut entry = GameEntry::new(name, selector);
        entry.enabled = enabled;
        self.games.push(entry);
        // The push above guarantees the list is non-empty.
        Ok(&self.games[self.games.len() - 1])
    }

    /// Removes the entry with `selector` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`GamesError::NotFound`] if no entry matches.
    pub fn remove_by_selector(&mut self, selector: &str) -> Result<GameEntry, GamesError> {
        let pos = self
            .games
            .iter()
            .position(|g| g.has_selector(selector))
            .ok_or_else(|| GamesError::NotFound(selector.to_string()))?;
        Ok(self.games.remove(pos))
    }

    /// Removes the entry at 1-based `index` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`GamesError::IndexOutOfRange`] for `0` or an index past the end.
    pub fn remove_at(&mut self, index: usize) -> Result<GameEntry, GamesError> {
        let pos = self.position_of(index)?;
        Ok(self.games.remove(pos))
    }

    /// Flips `enabled` on the entry at 1-based `index`.
    ///
    /// # Errors
    ///
    /// Returns [`GamesError::IndexOutOfRange`] for `0` or an index past the end.
    pub fn toggle_at(&mut self, index: usize) -> Result<&GameEntry, GamesError> {
        let pos = self.position_of(index)?;
        let entry = &mut self.games[pos];
        entry.enabled = !entry.enabled;
        Ok(entry)
    }

    /// Sets `enabled` on the entry with `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`GamesError::NotFound`] if no entry matches.
    pub fn set_enabled(&mut self, selector: &str, enabled: bool) -> Result<&GameEntry, GamesError> {
        let entry = self
            .games
            .iter_mut()
            .find(|g| g.has_selector(selector))
            .ok_or_else(|| GamesError::NotFound(selector.to_string()))?;
        entry.enabled = enabled;
        Ok(entry)
    }

    /// Converts a 1-based list number into a vector position.
    fn position_of(&self, index: usize) -> Result<usize, GamesError> {
        if index == 0 || index > self.games.len() {
            return Err(GamesError::IndexOutOfRange {
                index,
                len: self.games.len(),
            });
        }
        Ok(index - 1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
