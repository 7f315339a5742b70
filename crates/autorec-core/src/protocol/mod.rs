//! obs-websocket v5 protocol: message types, JSON framing, and authentication.

pub mod auth;
pub mod codec;
pub mod messages;

pub use auth::compute_auth_response;
pub use codec::{decode_server_message, encode_client_message, ProtocolError};
