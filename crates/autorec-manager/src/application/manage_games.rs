//! ManageGamesUseCase: edits the watched-games list.
//!
//! Every mutation loads the whole list, applies exactly one change, and saves
//! the whole list back.  The watcher reloads the file on its next tick, so no
//! signalling is needed.
//!
//! A list that cannot be loaded is never saved over: the error is returned
//! and the file stays as it is.

use std::fmt::Write as _;
use std::path::Path;

use autorec_core::{GameEntry, GamesConfig, GamesError};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for games-list management.
#[derive(Debug, Error)]
pub enum ManageError {
    #[error(transparent)]
    Games(#[from] GamesError),
    #[error("could not read the games list: {0}")]
    Load(String),
    #[error("could not save the games list: {0}")]
    Save(String),
}

/// Trait for reading and writing the games list.
///
/// The production implementation is the JSON file shared with the watcher;
/// tests use an in-memory list.
pub trait GamesRepository {
    fn load(&self) -> Result<GamesConfig, ManageError>;
    fn save(&self, config: &GamesConfig) -> Result<(), ManageError>;
    /// Deletes a game's icon file.  Returns `false` if there was no file.
    fn remove_icon(&self, path: &Path) -> std::io::Result<bool>;
}

/// How the user named a game on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameRef {
    /// 1-based position as shown by `games`.
    Index(usize),
    /// Case-insensitive selector.
    Selector(String),
}

impl GameRef {
    /// A plain number is an index; anything else is a selector.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.parse::<usize>() {
            Ok(index) => GameRef::Index(index),
            Err(_) => GameRef::Selector(input.to_string()),
        }
    }

    /// Resolves to a 1-based index into `config`.
    ///
    /// An out-of-range number that happens to be a selector (say, a game
    /// whose selector is `1942`) resolves to that game.
    pub fn resolve(&self, config: &GamesConfig) -> Result<usize, GamesError> {
        let by_selector =
            |selector: &str| config.games.iter().position(|g| g.has_selector(selector)).map(|p| p + 1);

        match self {
            GameRef::Index(index) if (1..=config.len()).contains(index) => Ok(*index),
            GameRef::Index(index) => by_selector(&index.to_string()).ok_or(GamesError::IndexOutOfRange {
                index: *index,
                len: config.len(),
            }),
            GameRef::Selector(selector) => {
                by_selector(selector).ok_or_else(|| GamesError::NotFound(selector.clone()))
            }
        }
    }
}

impl std::str::FromStr for GameRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(GameRef::parse(s))
    }
}

/// What `remove_game` did.
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub entry: GameEntry,
    /// `true` if the entry had an icon and the file was deleted.
    pub icon_removed: bool,
}

/// Use case for the games subcommands.
pub struct ManageGamesUseCase<R: GamesRepository> {
    repo: R,
}

impl<R: GamesRepository> ManageGamesUseCase<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self) -> Result<GamesConfig, ManageError> {
        self.repo.load()
    }

    /// Appends a game.  Rejects blank input and duplicate selectors.
    pub fn add_game(&self, name: &str, selector: &str, enabled: bool) -> Result<GameEntry, ManageError> {
        self.mutate(|config| config.add_game(name, selector, enabled).cloned())
    }

    /// Removes a game and deletes its icon file, if any.
    pub fn remove_game(&self, game: &GameRef) -> Result<Removed, ManageError> {
        let entry = self.mutate(|config| {
            let index = game.resolve(config)?;
            config.remove_at(index)
        })?;

        let icon_removed = match entry.icon() {
            Some(icon) => match self.repo.remove_icon(icon) {
                Ok(deleted) => deleted,
                Err(e) => {
                    warn!("could not delete icon {}: {e}", icon.display());
                    false
                }
            },
            None => false,
        };
        Ok(Removed { entry, icon_removed })
    }

    /// Flips a game between enabled and disabled.
    pub fn toggle_game(&self, game: &GameRef) -> Result<GameEntry, ManageError> {
        self.mutate(|config| {
            let index = game.resolve(config)?;
            config.toggle_at(index).cloned()
        })
    }

    pub fn set_game_enabled(&self, game: &GameRef, enabled: bool) -> Result<GameEntry, ManageError> {
        self.mutate(|config| {
            let index = game.resolve(config)?;
            let selector = config.games[index - 1].selector.clone();
            config.set_enabled(&selector, enabled).cloned()
        })
    }

    /// Load, apply `change`, save.  Nothing is saved if `change` fails.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut GamesConfig) -> Result<T, GamesError>,
    ) -> Result<T, ManageError> {
        let mut config = self.repo.load()?;
        let result = change(&mut config)?;
        self.repo.save(&config)?;
        debug!("games list saved ({} entries)", config.len());
        Ok(result)
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Formats the numbered games list printed by `games`.
pub fn render_game_list(config: &GamesConfig) -> String {
    if config.is_empty() {
        return "No games configured. Add one with: autorec-manager add <name> <selector>\n".to_string();
    }

    let width = config.games.iter().map(|g| g.name.chars().count()).max().unwrap_or(0);
    let mut out = format!(
        "Watched games ({} enabled of {}):\n",
        config.enabled_count(),
        config.len()
    );
    for (i, game) in config.games.iter().enumerate() {
        let mark = if game.enabled { "x" } else { " " };
        let _ = writeln!(
            out,
            "  {:>2}. [{mark}] {:<width$}  selector: {}",
            i + 1,
            game.name,
            game.selector
        );
    }
    out
}

/// One-line description of an entry, used after add/toggle/enable/disable.
pub fn describe_entry(entry: &GameEntry) -> String {
    format!(
        "{} (selector: {}, {})",
        entry.name,
        entry.selector,
        if entry.enabled { "enabled" } else { "disabled" }
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
