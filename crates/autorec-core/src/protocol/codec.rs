//! JSON framing for obs-websocket v5.
//!
//! Wire format (one WebSocket text frame per message):
//! ```text
//! {"op": <op code>, "d": { ...payload... }}
//! ```
//! The envelope is decoded first; the payload is then decoded according to
//! the op code.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{ClientMessage, OpCode, ServerMessage};

/// Errors that can occur while encoding or decoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not a JSON object with `op` and `d` keys.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// The op code is not a known obs-websocket op code.
    #[error("unknown op code: {0}")]
    UnknownOpCode(u8),

    /// The op code is valid but only ever sent by the client.
    #[error("unexpected op code from server: {0:?}")]
    UnexpectedOpCode(OpCode),

    /// The payload does not match the schema for its op code.
    #[error("malformed {op:?} payload: {source}")]
    MalformedPayload {
        op: OpCode,
        #[source]
        source: serde_json::Error,
    },

    /// A client message could not be serialized.
    #[error("failed to serialize frame: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    op: u8,
    d: Value,
}

/// Encodes a [`ClientMessage`] into a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Serialize`] if the payload cannot be serialized.
///
/// # Examples
///
/// ```rust
/// use autorec_core::protocol::codec::encode_client_message;
/// use autorec_core::protocol::messages::{ClientMessage, Request, RequestType};
///
/// let msg = ClientMessage::Request(Request::new(RequestType::StartRecord, "1"));
/// let text = encode_client_message(&msg).unwrap();
/// assert!(text.starts_with(r#"{"op":6,"#));
/// ```
pub fn encode_client_message(msg: &ClientMessage) -> Result<String, ProtocolError> {
    let d = match msg {
        ClientMessage::Identify(m) => serde_json::to_value(m),
        ClientMessage::Request(m) => serde_json::to_value(m),
    }
    .map_err(ProtocolError::Serialize)?;

    serde_json::to_string(&Envelope {
        op: msg.op_code() as u8,
        d,
    })
    .map_err(ProtocolError::Serialize)
}

/// Decodes a JSON text frame received from the server.
///
/// # Errors
///
/// - [`ProtocolError::MalformedFrame`] if the envelope is invalid.
/// - [`ProtocolError::UnknownOpCode`] / [`ProtocolError::UnexpectedOpCode`]
///   for op codes the client does not handle.
/// - [`ProtocolError::MalformedPayload`] if `d` does not fit its op code.
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))?;
    let op = OpCode::try_from(envelope.op).map_err(ProtocolError::UnknownOpCode)?;

    let payload_err = |source| ProtocolError::MalformedPayload { op, source };
    let msg = match op {
        OpCode::Hello => ServerMessage::Hello(serde_json::from_value(envelope.d).map_err(payload_err)?),
        OpCode::Identified => {
            ServerMessage::Identified(serde_json::from_value(envelope.d).map_err(payload_err)?)
        }
        OpCode::Event => ServerMessage::Event(serde_json::from_value(envelope.d).map_err(payload_err)?),
        OpCode::RequestResponse => {
            ServerMessage::RequestResponse(serde_json::from_value(envelope.d).map_err(payload_err)?)
        }
        other => return Err(ProtocolError::UnexpectedOpCode(other)),
    };
    Ok(msg)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{
        status_code, Identify, Request, RequestType, EVENT_SUBSCRIPTIONS_NONE, RPC_VERSION,
    };

    #[test]
    fn test_encode_identify_with_authentication() {
        // Arrange
        let msg = ClientMessage::Identify(Identify {
            rpc_version: RPC_VERSION,
            authentication: Some("abc=".to_string()),
            event_subscriptions: EVENT_SUBSCRIPTIONS_NONE,
        });

        // Act
        let text = encode_client_message(&msg).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        // Assert
        assert_eq!(value["op"], 1);
        assert_eq!(value["d"]["rpcVersion"], 1);
        assert_eq!(value["d"]["authentication"], "abc=");
        assert_eq!(value["d"]["eventSubscriptions"], 0);
    }

    #[test]
    fn test_encode_request_omits_empty_request_data() {
        let msg = ClientMessage::Request(Request::new(RequestType::GetRecordStatus, "req-1"));
        let text = encode_client_message(&msg).unwrap();
        assert_eq!(
            text,
            r#"{"op":6,"d":{"requestType":"GetRecordStatus","requestId":"req-1"}}"#
        );
    }

    #[test]
    fn test_decode_hello_with_authentication_challenge() {
        // Arrange
        let text = r#"{"op":0,"d":{"obsWebSocketVersion":"5.4.2","rpcVersion":1,
            "authentication":{"challenge":"+IxH4CnCiqpX1rM9scsNynZzbOe4KhDeYcTNS3PDaeY=",
                              "salt":"lM1GncleQOaCu9lT1yeUZhFYnqhsLLP1G5lAGo3ixaI="}}}"#;

        // Act
        let msg = decode_server_message(text).unwrap();

        // Assert
        match msg {
            ServerMessage::Hello(hello) => {
                let auth = hello.authentication.expect("challenge present");
                assert_eq!(auth.salt, "lM1GncleQOaCu9lT1yeUZhFYnqhsLLP1G5lAGo3ixaI=");
            }
            other => panic!("expected Hello, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_identified() {
        let msg = decode_server_message(r#"{"op":2,"d":{"negotiatedRpcVersion":1}}"#).unwrap();
        assert_eq!(msg.op_code(), OpCode::Identified);
    }

    #[test]
    fn test_decode_request_response_with_failure_status() {
        let text = r#"{"op":7,"d":{"requestType":"StopRecord","requestId":"r2",
            "requestStatus":{"result":false,"code":501,"comment":"Output not running"}}}"#;
        let ServerMessage::RequestResponse(resp) = decode_server_message(text).unwrap() else {
            panic!("expected RequestResponse");
        };
        assert!(!resp.request_status.result);
        assert_eq!(resp.request_status.code, status_code::OUTPUT_NOT_RUNNING);
        assert_eq!(resp.response_data, None);
    }

    #[test]
    fn test_decode_event_is_tolerated() {
        let text = r#"{"op":5,"d":{"eventType":"RecordStateChanged","eventIntent":64,
            "eventData":{"outputActive":true}}}"#;
        assert_eq!(decode_server_message(text).unwrap().op_code(), OpCode::Event);
    }

    #[test]
    fn test_decode_unknown_op_code_returns_error() {
        let result = decode_server_message(r#"{"op":42,"d":{}}"#);
        assert!(matches!(result, Err(ProtocolError::UnknownOpCode(42))));
    }

    #[test]
    fn test_decode_client_only_op_code_returns_error() {
        let result = decode_server_message(r#"{"op":6,"d":{}}"#);
        assert!(matches!(
            result,
            Err(ProtocolError::UnexpectedOpCode(OpCode::Request))
        ));
    }

    #[test]
    fn test_decode_non_json_returns_malformed_frame() {
        assert!(matches!(
            decode_server_message("not json"),
            Err(ProtocolError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_decode_payload_missing_fields_returns_malformed_payload() {
        let result = decode_server_message(r#"{"op":2,"d":{}}"#);
        assert!(matches!(
            result,
            Err(ProtocolError::MalformedPayload {
                op: OpCode::Identified,
                ..
            })
        ));
    }
}
