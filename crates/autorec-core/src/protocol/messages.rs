//! All obs-websocket v5 message types used by the watcher.
//!
//! Every frame is a JSON text message of the form `{"op": <u8>, "d": {...}}`.
//! The `d` payloads use camelCase keys.  Only the subset needed to query and
//! toggle recording is modelled here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Protocol constants ────────────────────────────────────────────────────────

/// RPC version negotiated in `Identify`.
pub const RPC_VERSION: u32 = 1;

/// `eventSubscriptions` bitmask sent in `Identify`; the watcher polls and
/// needs no events.
pub const EVENT_SUBSCRIPTIONS_NONE: u32 = 0;

/// Default obs-websocket port in OBS 28 and later.
pub const DEFAULT_PORT: u16 = 4455;

/// Request status codes the watcher acts on.
pub mod status_code {
    pub const SUCCESS: u16 = 100;
    /// `StartRecord` while a recording is already running.
    pub const OUTPUT_RUNNING: u16 = 500;
    /// `StopRecord` while nothing is recording.
    pub const OUTPUT_NOT_RUNNING: u16 = 501;
}

// ── Op codes ──────────────────────────────────────────────────────────────────

/// Frame op codes defined by obs-websocket v5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Hello = 0,
    Identify = 1,
    Identified = 2,
    Reidentify = 3,
    Event = 5,
    Request = 6,
    RequestResponse = 7,
    RequestBatch = 8,
    RequestBatchResponse = 9,
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        match value {
            0 => Ok(OpCode::Hello),
            1 => Ok(OpCode::Identify),
            2 => Ok(OpCode::Identified),
            3 => Ok(OpCode::Reidentify),
            5 => Ok(OpCode::Event),
            6 => Ok(OpCode::Request),
            7 => Ok(OpCode::RequestResponse),
            8 => Ok(OpCode::RequestBatch),
            9 => Ok(OpCode::RequestBatchResponse),
            other => Err(other),
        }
    }
}

// ── Payloads ──────────────────────────────────────────────────────────────────

/// Salt and challenge sent by a password-protected server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthChallenge {
    pub challenge: String,
    pub salt: String,
}

/// First frame sent by the server after the WebSocket upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    #[serde(default)]
    pub obs_web_socket_version: String,
    pub rpc_version: u32,
    /// Present only when the server requires a password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthChallenge>,
}

/// Client reply to [`Hello`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    pub rpc_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    pub event_subscriptions: u32,
}

/// Server confirmation that the session is ready for requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identified {
    pub negotiated_rpc_version: u32,
}

/// Requests the watcher issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    GetRecordStatus,
    StartRecord,
    StopRecord,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::GetRecordStatus => "GetRecordStatus",
            RequestType::StartRecord => "StartRecord",
            RequestType::StopRecord => "StopRecord",
        }
    }
}

/// A single request frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub request_type: String,
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_data: Option<Value>,
}

impl Request {
    pub fn new(request_type: RequestType, request_id: impl Into<String>) -> Self {
        Self {
            request_type: request_type.as_str().to_string(),
            request_id: request_id.into(),
            request_data: None,
        }
    }
}

/// Outcome block of a [`RequestResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub result: bool,
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Server reply to a [`Request`], correlated by `request_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub request_type: String,
    pub request_id: String,
    pub request_status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,
}

/// Unsolicited event.  The watcher subscribes to none but tolerates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: String,
    #[serde(default)]
    pub event_intent: Option<u32>,
    #[serde(default)]
    pub event_data: Option<Value>,
}

/// `responseData` of `GetRecordStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStatus {
    pub output_active: bool,
    #[serde(default)]
    pub output_paused: bool,
}

// ── Top-level message enums ───────────────────────────────────────────────────

/// Frames the client sends.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Identify(Identify),
    Request(Request),
}

impl ClientMessage {
    pub fn op_code(&self) -> OpCode {
        match self {
            ClientMessage::Identify(_) => OpCode::Identify,
            ClientMessage::Request(_) => OpCode::Request,
        }
    }
}

/// Frames the client receives.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Hello(Hello),
    Identified(Identified),
    Event(Event),
    RequestResponse(RequestResponse),
}

impl ServerMessage {
    pub fn op_code(&self) -> OpCode {
        match self {
            ServerMessage::Hello(_) => OpCode::Hello,
            ServerMessage::Identified(_) => OpCode::Identified,
            ServerMessage::Event(_) => OpCode::Event,
            ServerMessage::RequestResponse(_) => OpCode::RequestResponse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_code_try_from_known_values() {
        assert_eq!(OpCode::try_from(0), Ok(OpCode::Hello));
        assert_eq!(OpCode::try_from(7), Ok(OpCode::RequestResponse));
        assert_eq!(OpCode::try_from(4), Err(4));
    }

    #[test]
    fn test_request_type_names_match_obs_request_names() {
        assert_eq!(RequestType::GetRecordStatus.as_str(), "GetRecordStatus");
        assert_eq!(RequestType::StartRecord.as_str(), "StartRecord");
        assert_eq!(RequestType::StopRecord.as_str(), "StopRecord");
    }

    #[test]
    fn test_hello_uses_camel_case_keys() {
        let json = r#"{"obsWebSocketVersion":"5.4.2","rpcVersion":1}"#;
        let hello: Hello = serde_json::from_str(json).unwrap();
        assert_eq!(hello.obs_web_socket_version, "5.4.2");
        assert_eq!(hello.rpc_version, 1);
        assert!(hello.authentication.is_none());
    }

    #[test]
    fn test_identify_omits_authentication_when_none() {
        let identify = Identify {
            rpc_version: RPC_VERSION,
            authentication: None,
            event_subscriptions: EVENT_SUBSCRIPTIONS_NONE,
        };
        let json = serde_json::to_string(&identify).unwrap();
        assert_eq!(json, r#"{"rpcVersion":1,"eventSubscriptions":0}"#);
    }

    #[test]
    fn test_record_status_defaults_paused_to_false() {
        let status: RecordStatus = serde_json::from_str(r#"{"outputActive":true}"#).unwrap();
        assert!(status.output_active);
        assert!(!status.output_paused);
    }
}
