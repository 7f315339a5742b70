//! [`GamesRepository`] backed by the games file in the data directory.

use std::path::{Path, PathBuf};

use autorec_core::GamesConfig;
use autorec_watcher::infrastructure::storage::games_file::GamesFile;
use autorec_watcher::infrastructure::storage::AppPaths;

use crate::application::manage_games::{GamesRepository, ManageError};

/// The games list plus the directory its relative icon paths resolve against.
#[derive(Debug, Clone)]
pub struct GamesStore {
    file: GamesFile,
    root: PathBuf,
}

impl GamesStore {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            file: GamesFile::new(paths.games_file()),
            root: paths.root().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl GamesRepository for GamesStore {
    fn load(&self) -> Result<GamesConfig, ManageError> {
        self.file.load().map_err(|e| ManageError::Load(e.to_string()))
    }

    fn save(&self, config: &GamesConfig) -> Result<(), ManageError> {
        self.file.save(config).map_err(|e| ManageError::Save(e.to_string()))
    }

    fn remove_icon(&self, path: &Path) -> std::io::Result<bool> {
        let path = self.root.join(path);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_paths() -> AppPaths {
        AppPaths::new(std::env::temp_dir().join(format!("autorec_store_{}", Uuid::new_v4())))
    }

    #[test]
    fn test_relative_icon_path_resolves_against_data_dir() {
        // Arrange
        let paths = temp_paths();
        std::fs::create_dir_all(paths.icons_dir()).unwrap();
        let icon = paths.icons_dir().join("hades.png");
        std::fs::write(&icon, b"png").unwrap();
        let store = GamesStore::new(&paths);

        // Act
        let deleted = store.remove_icon(Path::new("icons/hades.png")).unwrap();

        // Assert
        assert!(deleted);
        assert!(!icon.exists());
        let _ = std::fs::remove_dir_all(paths.root());
    }

    #[test]
    fn test_missing_icon_is_not_an_error_and_not_deleted() {
        let store = GamesStore::new(&temp_paths());
        assert!(!store.remove_icon(Path::new("icons/gone.png")).unwrap());
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let paths = temp_paths();
        paths.ensure_root().unwrap();
        std::fs::write(paths.games_file(), "[not json").unwrap();

        let result = GamesStore::new(&paths).load();

        assert!(matches!(result, Err(ManageError::Load(_))));
        let _ = std::fs::remove_dir_all(paths.root());
    }
}
