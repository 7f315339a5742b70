//! Infrastructure layer for the watcher.
//!
//! Contains OS-facing adapters: desktop enumeration, the OBS WebSocket
//! client, file-system storage, and process control.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `autorec_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod enumeration;
pub mod obs;
pub mod process;
pub mod storage;
