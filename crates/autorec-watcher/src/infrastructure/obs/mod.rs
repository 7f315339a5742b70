//! OBS Studio as the recording host, over obs-websocket v5.
//!
//! # Session lifecycle
//!
//! ```text
//! first request ─► connect ─► Hello ─► Identify(+auth) ─► Identified
//!                                                          │
//!            Request(requestId) ─► … Event … ─► RequestResponse(requestId)
//! ```
//!
//! The session is opened lazily on the first request and reused afterwards.
//! Any transport or protocol failure drops it so the next watcher tick
//! reconnects from scratch; OBS being closed is therefore never fatal.
//!
//! Every request (including a reconnect it triggers) is bounded by the
//! configured request timeout.

use std::time::Duration;

use async_trait::async_trait;
use autorec_core::protocol::codec::{decode_server_message, encode_client_message, ProtocolError};
use autorec_core::protocol::compute_auth_response;
use autorec_core::protocol::messages::{
    status_code, ClientMessage, Identify, RecordStatus, Request, RequestResponse, RequestType,
    ServerMessage, DEFAULT_PORT, EVENT_SUBSCRIPTIONS_NONE, RPC_VERSION,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::application::record_games::{HostError, RecordingHost};

pub mod mock;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Where and how to reach obs-websocket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObsConnection {
    pub host: String,
    pub port: u16,
    /// Server password; `None` when authentication is disabled in OBS.
    pub password: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ObsConnection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            password: None,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ObsConnection {
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

/// [`RecordingHost`] that drives OBS through obs-websocket.
pub struct ObsWebSocketHost {
    connection: ObsConnection,
    session: Mutex<Option<WsStream>>,
}

impl ObsWebSocketHost {
    pub fn new(connection: ObsConnection) -> Self {
        Self {
            connection,
            session: Mutex::new(None),
        }
    }

    /// Returns `true` while an identified session is open.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Closes the session, if any.  The next request reconnects.
    pub async fn disconnect(&self) {
        if let Some(mut ws) = self.session.lock().await.take() {
            let _ = ws.close(None).await;
            debug!("obs-websocket session closed");
        }
    }

    /// Sends one request and waits for its response.
    async fn call(&self, request_type: RequestType) -> Result<RequestResponse, HostError> {
        let timeout = self.connection.request_timeout;
        let mut session = self.session.lock().await;

        let result = match tokio::time::timeout(timeout, self.call_on(&mut session, request_type)).await {
            Ok(result) => result,
            Err(_) => Err(HostError::Timeout(timeout)),
        };

        // A rejected request leaves the session healthy; anything else may not.
        if let Err(e) = &result {
            if !matches!(e, HostError::Rejected { .. }) && session.take().is_some() {
                debug!("dropping obs-websocket session after error: {e}");
            }
        }
        result
    }

    async fn call_on(
        &self,
        session: &mut Option<WsStream>,
        request_type: RequestType,
    ) -> Result<RequestResponse, HostError> {
        if session.is_none() {
            *session = Some(self.connect().await?);
        }
        let Some(ws) = session.as_mut() else {
            return Err(HostError::Unreachable("no session".to_string()));
        };

        let request_id = Uuid::new_v4().to_string();
        send_frame(ws, &ClientMessage::Request(Request::new(request_type, request_id.clone()))).await?;

        loop {
            match next_message(ws).await? {
                ServerMessage::RequestResponse(resp) if resp.request_id == request_id => return Ok(resp),
                other => trace!("skipping {:?} while waiting for {}", other.op_code(), request_type.as_str()),
            }
        }
    }

    /// Opens the socket and completes the Hello/Identify handshake.
    async fn connect(&self) -> Result<WsStream, HostError> {
        let url = self.connection.url();
        let (mut ws, _) = connect_async(url.as_str())
            .await
            .map_err(|e| HostError::Unreachable(format!("{url}: {e}")))?;

        let hello = match next_message(&mut ws).await? {
            ServerMessage::Hello(hello) => hello,
            other => {
                return Err(HostError::Protocol(format!(
                    "expected Hello, got {:?}",
                    other.op_code()
                )))
            }
        };

        let authentication = match (&hello.authentication, &self.connection.password) {
            (Some(challenge), Some(password)) => Some(compute_auth_response(
                password,
                &challenge.salt,
                &challenge.challenge,
            )),
            (Some(_), None) => return Err(HostError::AuthenticationRequired),
            (None, _) => None,
        };

        send_frame(
            &mut ws,
            &ClientMessage::Identify(Identify {
                rpc_version: RPC_VERSION,
                authentication,
                event_subscriptions: EVENT_SUBSCRIPTIONS_NONE,
            }),
        )
        .await?;

        loop {
            match next_message(&mut ws).await? {
                ServerMessage::Identified(identified) => {
                    info!(
                        "connected to obs-websocket {} at {url} (rpc v{})",
                        hello.obs_web_socket_version, identified.negotiated_rpc_version
                    );
                    return Ok(ws);
                }
                other => trace!("skipping {:?} during handshake", other.op_code()),
            }
        }
    }
}

#[async_trait]
impl RecordingHost for ObsWebSocketHost {
    async fn is_recording(&self) -> Result<bool, HostError> {
        let resp = self.call(RequestType::GetRecordStatus).await?;
        accept_codes(&resp, "GetRecordStatus", &[status_code::SUCCESS])?;
        let data = resp
            .response_data
            .ok_or_else(|| HostError::Protocol("GetRecordStatus without responseData".to_string()))?;
        let status: RecordStatus =
            serde_json::from_value(data).map_err(|e| HostError::Protocol(format!("GetRecordStatus: {e}")))?;
        Ok(status.output_active)
    }

    async fn start_recording(&self) -> Result<(), HostError> {
        let resp = self.call(RequestType::StartRecord).await?;
        accept_codes(
            &resp,
            "StartRecord",
            &[status_code::SUCCESS, status_code::OUTPUT_RUNNING],
        )
    }

    async fn stop_recording(&self) -> Result<(), HostError> {
        let resp = self.call(RequestType::StopRecord).await?;
        accept_codes(
            &resp,
            "StopRecord",
            &[status_code::SUCCESS, status_code::OUTPUT_NOT_RUNNING],
        )
    }
}

/// Succeeds if the response status code is one of `accepted`.
fn accept_codes(resp: &RequestResponse, request: &'static str, accepted: &[u16]) -> Result<(), HostError> {
    let status = &resp.request_status;
    if accepted.contains(&status.code) {
        Ok(())
    } else {
        Err(HostError::Rejected {
            request,
            code: status.code,
            comment: status.comment.clone().unwrap_or_default(),
        })
    }
}

async fn send_frame(ws: &mut WsStream, msg: &ClientMessage) -> Result<(), HostError> {
    let text = encode_client_message(msg).map_err(|e| HostError::Protocol(e.to_string()))?;
    ws.send(WsMessage::Text(text))
        .await
        .map_err(|e| HostError::Unreachable(e.to_string()))
}

/// Reads frames until one decodes to a message the client understands.
async fn next_message(ws: &mut WsStream) -> Result<ServerMessage, HostError> {
    loop {
        match ws.next().await {
            Some(Ok(WsMessage::Text(text))) => match decode_server_message(&text) {
                Ok(msg) => return Ok(msg),
                Err(ProtocolError::UnknownOpCode(op)) => trace!("skipping frame with op {op}"),
                Err(ProtocolError::UnexpectedOpCode(op)) => trace!("skipping {op:?} frame"),
                Err(e) => return Err(HostError::Protocol(e.to_string())),
            },
            Some(Ok(WsMessage::Close(frame))) => {
                let reason = match frame {
                    Some(f) => format!("closed by OBS ({}): {}", u16::from(f.code), f.reason),
                    None => "closed by OBS".to_string(),
                };
                return Err(HostError::Unreachable(reason));
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(HostError::Unreachable(e.to_string())),
            None => return Err(HostError::Unreachable("connection closed".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autorec_core::protocol::messages::RequestStatus;

    fn response(code: u16) -> RequestResponse {
        RequestResponse {
            request_type: "StartRecord".to_string(),
            request_id: "1".to_string(),
            request_status: RequestStatus {
                result: code == status_code::SUCCESS,
                code,
                comment: Some("because".to_string()),
            },
            response_data: None,
        }
    }

    #[test]
    fn test_default_connection_targets_local_obs() {
        let conn = ObsConnection::default();
        assert_eq!(conn.url(), "ws://127.0.0.1:4455");
        assert!(conn.password.is_none());
    }

    #[test]
    fn test_accept_codes_allows_listed_codes() {
        let accepted = [status_code::SUCCESS, status_code::OUTPUT_RUNNING];
        assert!(accept_codes(&response(100), "StartRecord", &accepted).is_ok());
        assert!(accept_codes(&response(500), "StartRecord", &accepted).is_ok());
    }

    #[test]
    fn test_accept_codes_rejects_other_codes_with_comment() {
        let err = accept_codes(&response(204), "StartRecord", &[status_code::SUCCESS]).unwrap_err();
        match err {
            HostError::Rejected {
                request,
                code,
                comment,
            } => {
                assert_eq!(request, "StartRecord");
                assert_eq!(code, 204);
                assert_eq!(comment, "because");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_reports_error_and_stays_disconnected() {
        // Arrange: port 1 on loopback refuses connections.
        let host = ObsWebSocketHost::new(ObsConnection {
            port: 1,
            request_timeout: Duration::from_secs(2),
            ..ObsConnection::default()
        });

        // Act
        let result = host.is_recording().await;

        // Assert
        assert!(matches!(
            result,
            Err(HostError::Unreachable(_)) | Err(HostError::Timeout(_))
        ));
        assert!(!host.is_connected().await);
    }
}
