//! Small files that describe the running watcher: its PID and its state.

use std::path::{Path, PathBuf};

use autorec_core::WatcherState;

use super::{read_optional, remove_if_exists, write_atomically, StorageError};
use crate::application::record_games::StatePublisher;

/// `watcher.pid`: the decimal PID of the running watcher.
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the recorded PID, or `None` if there is no file.
    pub fn read(&self) -> Result<Option<u32>, StorageError> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(None);
        };
        content
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StorageError::Corrupt {
                path: self.path.clone(),
                content: content.trim().to_string(),
            })
    }

    pub fn write(&self, pid: u32) -> Result<(), StorageError> {
        write_atomically(&self.path, pid.to_string().as_bytes())
    }

    pub fn remove(&self) -> Result<(), StorageError> {
        remove_if_exists(&self.path)
    }
}

/// `game_state`: one line holding the current [`WatcherState`].
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the last published state, or `None` if there is no file.
    pub fn read(&self) -> Result<Option<WatcherState>, StorageError> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(None);
        };
        content
            .parse()
            .map(Some)
            .map_err(|_| StorageError::Corrupt {
                path: self.path.clone(),
                content: content.trim().to_string(),
            })
    }

    pub fn write(&self, state: &WatcherState) -> Result<(), StorageError> {
        write_atomically(&self.path, format!("{state}\n").as_bytes())
    }

    pub fn remove(&self) -> Result<(), StorageError> {
        remove_if_exists(&self.path)
    }
}

impl StatePublisher for StateFile {
    fn publish(&self, state: &WatcherState) -> Result<(), String> {
        self.write(state).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::tests::temp_dir;

    #[test]
    fn test_pid_file_write_read_remove() {
        // Arrange
        let dir = temp_dir();
        let pid_file = PidFile::new(dir.join("watcher.pid"));

        // Act / Assert
        assert_eq!(pid_file.read().unwrap(), None);
        pid_file.write(4242).unwrap();
        assert_eq!(pid_file.read().unwrap(), Some(4242));
        pid_file.remove().unwrap();
        assert_eq!(pid_file.read().unwrap(), None);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_pid_file_tolerates_trailing_newline() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let pid_file = PidFile::new(dir.join("watcher.pid"));
        std::fs::write(pid_file.path(), "17\r\n").unwrap();

        assert_eq!(pid_file.read().unwrap(), Some(17));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_pid_file_with_garbage_is_corrupt() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let pid_file = PidFile::new(dir.join("watcher.pid"));
        std::fs::write(pid_file.path(), "not-a-pid").unwrap();

        assert!(matches!(pid_file.read(), Err(StorageError::Corrupt { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_state_file_publishes_one_line() {
        // Arrange
        let dir = temp_dir();
        let state_file = StateFile::new(dir.join("game_state"));
        let state = WatcherState::Recording {
            game: "Elden Ring".to_string(),
        };

        // Act
        state_file.publish(&state).unwrap();

        // Assert
        assert_eq!(
            std::fs::read_to_string(state_file.path()).unwrap(),
            "RECORDING: Elden Ring\n"
        );
        assert_eq!(state_file.read().unwrap(), Some(state));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_state_file_missing_reads_none() {
        let state_file = StateFile::new(temp_dir().join("game_state"));
        assert_eq!(state_file.read().unwrap(), None);
        assert!(state_file.remove().is_ok());
    }
}
