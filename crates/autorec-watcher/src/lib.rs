//! autorec-watcher library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`, the
//! watcher binary, and the manager CLI share the same module tree.

pub mod application;
pub mod infrastructure;
