//! Infrastructure layer for autorec-manager.
//!
//! Everything here touches the data directory or other processes.  The file
//! formats and Win32 process calls themselves live in `autorec-watcher`, so
//! both binaries always agree on them; this layer only combines them into the
//! manager's commands.
//!
//! # Responsibilities
//!
//! - Loading and saving the games list for the edit commands
//! - Deleting a removed game's icon
//! - Finding, starting, stopping and monitoring the watcher process

pub mod games_store;
pub mod watcher_control;

pub use games_store::GamesStore;
pub use watcher_control::{ControlError, WatcherControl};
