//! Application layer for the manager CLI.
//!
//! Each sub-module turns one group of subcommands into plain functions over
//! domain types and traits, so every command's behaviour and output can be
//! tested without touching the real data directory or desktop.
//!
//! # Sub-modules
//!
//! - **`manage_games`**    – `games`, `add`, `remove`, `toggle`, `enable`, `disable`.
//! - **`inspect_windows`** – `windows`, `search`, `detect`.
//! - **`status`**          – `status`.

pub mod inspect_windows;
pub mod manage_games;
pub mod status;
