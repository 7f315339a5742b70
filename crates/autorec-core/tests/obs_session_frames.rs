//! Integration tests for the obs-websocket codec.
//!
//! These tests replay a realistic session transcript (hello, identify,
//! identified, requests and responses) through the public API, exercising the
//! codec, the message types, and the authentication helper together.

use autorec_core::protocol::compute_auth_response;
use autorec_core::protocol::messages::{
    status_code, ClientMessage, Identify, RecordStatus, Request, RequestType, ServerMessage,
    EVENT_SUBSCRIPTIONS_NONE, RPC_VERSION,
};
use autorec_core::{decode_server_message, encode_client_message};
use serde_json::Value;

const HELLO_WITH_AUTH: &str = r#"{
    "op": 0,
    "d": {
        "obsWebSocketVersion": "5.4.2",
        "rpcVersion": 1,
        "authentication": {
            "challenge": "+IxH4CnCiqpX1rM9scsNynZzbOe4KhDeYcTNS3PDaeY=",
            "salt": "lM1GncleQOaCu9lT1yeUZhFYnqhsLLP1G5lAGo3ixaI="
        }
    }
}"#;

#[test]
fn test_handshake_with_password_produces_identify_with_auth() {
    // Arrange
    let ServerMessage::Hello(hello) = decode_server_message(HELLO_WITH_AUTH).unwrap() else {
        panic!("first frame must be Hello");
    };
    let challenge = hello.authentication.expect("password-protected server");

    // Act
    let auth = compute_auth_response("supersecretpassword", &challenge.salt, &challenge.challenge);
    let identify = ClientMessage::Identify(Identify {
        rpc_version: RPC_VERSION,
        authentication: Some(auth.clone()),
        event_subscriptions: EVENT_SUBSCRIPTIONS_NONE,
    });
    let frame: Value = serde_json::from_str(&encode_client_message(&identify).unwrap()).unwrap();

    // Assert
    assert_eq!(frame["op"], 1);
    assert_eq!(frame["d"]["authentication"], Value::String(auth));
    assert_eq!(hello.rpc_version, RPC_VERSION);
}

#[test]
fn test_get_record_status_response_decodes_output_active() {
    // Arrange
    let request = Request::new(RequestType::GetRecordStatus, "status-1");
    let sent = encode_client_message(&ClientMessage::Request(request)).unwrap();
    assert!(sent.contains("\"requestId\":\"status-1\""));

    let reply = r#"{"op":7,"d":{
        "requestType":"GetRecordStatus","requestId":"status-1",
        "requestStatus":{"result":true,"code":100},
        "responseData":{"outputActive":true,"outputPaused":false,
                        "outputTimecode":"00:01:02.345","outputDuration":62345,"outputBytes":1048576}}}"#;

    // Act
    let ServerMessage::RequestResponse(resp) = decode_server_message(reply).unwrap() else {
        panic!("expected RequestResponse");
    };
    let status: RecordStatus = serde_json::from_value(resp.response_data.unwrap()).unwrap();

    // Assert
    assert_eq!(resp.request_id, "status-1");
    assert_eq!(resp.request_status.code, status_code::SUCCESS);
    assert!(status.output_active);
    assert!(!status.output_paused);
}

#[test]
fn test_start_record_while_running_reports_output_running() {
    let reply = r#"{"op":7,"d":{"requestType":"StartRecord","requestId":"s",
        "requestStatus":{"result":false,"code":500,"comment":"The output is already running."}}}"#;
    let ServerMessage::RequestResponse(resp) = decode_server_message(reply).unwrap() else {
        panic!("expected RequestResponse");
    };
    assert_eq!(resp.request_status.code, status_code::OUTPUT_RUNNING);
    assert_eq!(
        resp.request_status.comment.as_deref(),
        Some("The output is already running.")
    );
}

#[test]
fn test_events_between_responses_decode_without_error() {
    let frames = [
        r#"{"op":2,"d":{"negotiatedRpcVersion":1}}"#,
        r#"{"op":5,"d":{"eventType":"ExitStarted","eventIntent":1}}"#,
        r#"{"op":7,"d":{"requestType":"StopRecord","requestId":"x","requestStatus":{"result":true,"code":100},"responseData":{"outputPath":"C:\\Videos\\2024-01-01.mkv"}}}"#,
    ];
    for frame in frames {
        decode_server_message(frame).unwrap_or_else(|e| panic!("{frame}: {e}"));
    }
}
