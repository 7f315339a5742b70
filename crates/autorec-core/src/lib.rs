//! # autorec-core
//!
//! Shared library for Game Auto-Recorder containing the watched-game list,
//! the detection rules, and the obs-websocket message protocol.
//!
//! This crate is used by both the watcher and the manager applications.
//! It has zero dependencies on OS APIs, file systems, or network sockets.
//!
//! # Architecture overview
//!
//! Game Auto-Recorder watches the desktop for configured games and starts a
//! screen recording in OBS Studio while one of them is running.  When the game
//! closes, the recording is stopped again.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure business logic.  The games list (`GamesConfig`), the
//!   snapshot of windows and processes taken by the watcher, the selector
//!   matching rules that decide whether a game is running, and the watcher
//!   state written to disk for the manager to display.
//!
//! - **`protocol`** – How the watcher talks to OBS.  obs-websocket v5 frames
//!   are JSON objects with an `op` code and a `d` payload; this module encodes
//!   and decodes them into typed Rust structs and computes the authentication
//!   response.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `autorec_core::GamesConfig` instead of `autorec_core::domain::games::GamesConfig`.
pub use domain::games::{GameEntry, GamesConfig, GamesError};
pub use domain::matching::{find_running_game, selector_matches, Detection, MatchSource};
pub use domain::snapshot::{ProcessInfo, SystemSnapshot, WindowInfo};
pub use domain::state::WatcherState;
pub use protocol::codec::{decode_server_message, encode_client_message, ProtocolError};
pub use protocol::messages::{ClientMessage, RequestType, ServerMessage};
