//! Wire protocol shared by the host (`remix-host`) and the browser worker
//! (`remix-worker`): the message envelope, the closed method taxonomy, and
//! the two framings (stdio length-prefixed, WebSocket text frames).

pub mod error;
pub mod framing;
pub mod id;
pub mod transport_ws;

use serde::{Deserialize, Serialize};

pub use error::{BridgeError, ErrorCode};

/// One of the four envelope kinds a `BridgeMessage` can be (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Request,
    Response,
    Ack,
    Error,
}

/// The closed set of bridge methods (§3). Adding a method means adding a
/// variant here, a timeout entry in `host::retry`, and a handler arm in
/// `worker::dispatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    Navigate,
    Snapshot,
    Click,
    Hover,
    TypeText,
    SelectOption,
    #[serde(rename = "listWebMCPTools")]
    ListWebMcpTools,
    #[serde(rename = "invokeWebMCPTool")]
    InvokeWebMcpTool,
    Screenshot,
    Ping,
    NewTab,
    ListTabs,
    SwitchTab,
    CloseTab,
    GoBack,
    GoForward,
    Reload,
    WaitForNavigation,
    ScrollPage,
    DropFiles,
}

/// The wire envelope exchanged between host and worker (§3, §4.1).
///
/// Invariant: every non-`Request` message carries the `id` of the request
/// that originated it. `Ack` is advisory only and never resolves a pending
/// request — only `Response`/`Error` do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    #[serde(default)]
    pub payload: serde_json::Value,
    pub timestamp: u64,
}

impl BridgeMessage {
    /// Builds a new outbound `request` envelope, generating its own id.
    pub fn request(method: Method, payload: serde_json::Value, timestamp: u64) -> Self {
        Self {
            id: id::new_message_id(),
            kind: MessageType::Request,
            method: Some(method),
            payload,
            timestamp,
        }
    }

    /// Builds a `response` envelope correlated to `request_id`.
    pub fn response(request_id: impl Into<String>, payload: serde_json::Value, timestamp: u64) -> Self {
        Self {
            id: request_id.into(),
            kind: MessageType::Response,
            method: None,
            payload,
            timestamp,
        }
    }

    /// Builds an `error` envelope correlated to `request_id`.
    pub fn error(request_id: impl Into<String>, error: &BridgeError, timestamp: u64) -> Self {
        Self {
            id: request_id.into(),
            kind: MessageType::Error,
            method: None,
            payload: serde_json::to_value(error).unwrap_or(serde_json::Value::Null),
            timestamp,
        }
    }

    /// Builds an `ack` envelope correlated to `request_id`. Advisory only.
    pub fn ack(request_id: impl Into<String>, timestamp: u64) -> Self {
        Self {
            id: request_id.into(),
            kind: MessageType::Ack,
            method: None,
            payload: serde_json::Value::Null,
            timestamp,
        }
    }

    /// Attempts to deserialize an `error` message's payload back into a
    /// `BridgeError`. Returns `None` for non-error messages or malformed
    /// payloads.
    pub fn as_bridge_error(&self) -> Option<BridgeError> {
        if self.kind != MessageType::Error {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let msg = BridgeMessage::request(Method::Navigate, serde_json::json!({"url": "https://example.com"}), 1000);
        let json = serde_json::to_string(&msg).unwrap();
        let back: BridgeMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, msg.id);
        assert_eq!(back.method, Some(Method::Navigate));
        assert_eq!(back.kind, MessageType::Request);
    }

    #[test]
    fn response_and_error_correlate_to_request_id() {
        let req = BridgeMessage::request(Method::Ping, serde_json::Value::Null, 1);
        let resp = BridgeMessage::response(req.id.clone(), serde_json::json!({"ok": true}), 2);
        assert_eq!(resp.id, req.id);

        let err = BridgeError::new(ErrorCode::TabNotFound, "tab 5 gone");
        let err_msg = BridgeMessage::error(req.id.clone(), &err, 3);
        assert_eq!(err_msg.id, req.id);
        assert_eq!(err_msg.kind, MessageType::Error);
        let recovered = err_msg.as_bridge_error().unwrap();
        assert_eq!(recovered.code, ErrorCode::TabNotFound);
    }

    #[test]
    fn ack_never_carries_method() {
        let ack = BridgeMessage::ack("req-1", 5);
        assert!(ack.method.is_none());
        assert_eq!(ack.kind, MessageType::Ack);
    }

    #[test]
    fn method_taxonomy_is_stable_on_the_wire() {
        let pairs = [
            (Method::Navigate, "\"navigate\""),
            (Method::ListWebMcpTools, "\"listWebMCPTools\""),
            (Method::InvokeWebMcpTool, "\"invokeWebMCPTool\""),
            (Method::DropFiles, "\"dropFiles\""),
        ];
        for (m, want) in pairs {
            let got = serde_json::to_string(&m).unwrap();
            assert_eq!(got, want);
        }
    }
}
