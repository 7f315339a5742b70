//! Domain entities for Game Auto-Recorder.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from OS APIs, network libraries, or file systems.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! The watcher and manager crates depend on the domain, but the domain never
//! depends on them.

/// The watched-game list and its mutation rules.
pub mod games;

/// Selector matching: decides which configured game (if any) is running.
pub mod matching;

/// Point-in-time view of visible windows and running processes.
pub mod snapshot;

/// One-line watcher status shared with the manager through the state file.
pub mod state;
