//! Application layer use cases for the watcher.
//!
//! Use cases here orchestrate the domain from `autorec_core` and depend only on
//! traits, never on OS, network or file-system code.  The infrastructure layer
//! provides the implementations.
//!
//! # Sub-modules
//!
//! - **`record_games`** – The poll loop: detect a running game, start or stop
//!   the host's recording, publish the watcher state.

pub mod record_games;
