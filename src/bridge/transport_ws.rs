//! Bridge WebSocket server (C6, §4.6): the loopback endpoint the browser
//! worker dials into. Upgrade requests are validated against `Origin` and
//! `Host` before the socket is accepted; only one client connection is
//! ever held live, per §4.6's "a second connection forcibly closes the
//! previous" rule.
//!
//! Grounded on `querymt-querymt/crates/agent/src/acp/websocket.rs`: the
//! same `Router::new().route("/ws", get(handler)).with_state(state)` /
//! `axum::serve(...).with_graceful_shutdown(...)` shape, with an
//! `on_upgrade` split into a send task (draining an mpsc channel into the
//! socket) and a receive task (forwarding inbound frames to the
//! connection manager).

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::host::connection::ConnectionManager;

/// Origin schemes a real extension client presents (§4.6). Node-based
/// clients send no `Origin` header at all, which is also accepted.
const ALLOWED_ORIGIN_SCHEMES: &[&str] = &[
    "chrome-extension://",
    "moz-extension://",
    "safari-web-extension://",
];

fn host_is_loopback(host: &str, port: u16) -> bool {
    let allowed = [
        format!("127.0.0.1:{port}"),
        format!("localhost:{port}"),
        format!("[::1]:{port}"),
    ];
    allowed.iter().any(|a| a == host)
}

fn origin_is_allowed(headers: &HeaderMap) -> bool {
    let Some(origin) = headers.get("origin") else {
        // Absent Origin — the Node/CLI worker client case (§4.6).
        return true;
    };
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    ALLOWED_ORIGIN_SCHEMES
        .iter()
        .any(|scheme| origin.starts_with(scheme))
}

fn host_is_allowed(headers: &HeaderMap, port: u16) -> bool {
    match headers.get("host") {
        None => true,
        Some(host) => match host.to_str() {
            Ok(host) => host_is_loopback(host, port),
            Err(_) => false,
        },
    }
}

/// Runs the bridge WebSocket server on `listener` until `shutdown` fires.
/// `port` is needed to validate a present `Host` header against the exact
/// loopback address this server bound (§4.6, §8 property 10).
pub async fn serve(
    listener: TcpListener,
    port: u16,
    conn: Arc<ConnectionManager>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let state = WsState { conn, port };
    let app = Router::new().route("/ws", get(upgrade_handler)).with_state(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[derive(Clone)]
struct WsState {
    conn: Arc<ConnectionManager>,
    port: u16,
}

async fn upgrade_handler(
    headers: HeaderMap,
    State(state): State<WsState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    if !origin_is_allowed(&headers) || !host_is_allowed(&headers, state.port) {
        tracing::warn!("rejecting WebSocket upgrade: Origin/Host validation failed");
        return StatusCode::FORBIDDEN.into_response();
    }
    ws.on_upgrade(move |socket| handle_connection(socket, state.conn))
}

/// Drives one client connection end to end: registers it with the
/// connection manager (superseding any prior client, §4.6), relays
/// outbound frames, and forwards inbound frames until either side closes.
async fn handle_connection(socket: WebSocket, conn: Arc<ConnectionManager>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let generation = conn.attach_client(tx).await;
    tracing::info!(generation, "browser worker connected");

    let send_conn = conn.clone();
    let send_task = tokio::spawn(async move {
        while let Some(body) = rx.recv().await {
            if !send_conn.is_current(generation).await {
                break;
            }
            if sink.send(Message::Text(body)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let recv_conn = conn.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => recv_conn.on_message(&text).await,
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("bridge WebSocket error: {e}");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = receive_task => {},
    }

    conn.on_disconnect(generation).await;
    tracing::info!(generation, "browser worker disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (k, v) in pairs {
            h.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        h
    }

    #[test]
    fn no_origin_header_is_allowed() {
        assert!(origin_is_allowed(&HeaderMap::new()));
    }

    #[test]
    fn extension_origins_are_allowed() {
        for origin in [
            "chrome-extension://abcdefg",
            "moz-extension://abcdefg",
            "safari-web-extension://abcdefg",
        ] {
            assert!(origin_is_allowed(&headers_with(&[("origin", origin)])));
        }
    }

    #[test]
    fn arbitrary_web_origin_is_rejected() {
        assert!(!origin_is_allowed(&headers_with(&[("origin", "https://evil.com")])));
    }

    #[test]
    fn absent_host_is_allowed() {
        assert!(host_is_allowed(&HeaderMap::new(), 18080));
    }

    #[test]
    fn loopback_host_with_matching_port_is_allowed() {
        assert!(host_is_allowed(&headers_with(&[("host", "127.0.0.1:18080")]), 18080));
        assert!(host_is_allowed(&headers_with(&[("host", "localhost:18080")]), 18080));
        assert!(host_is_allowed(&headers_with(&[("host", "[::1]:18080")]), 18080));
    }

    #[test]
    fn foreign_host_is_rejected() {
        assert!(!host_is_allowed(&headers_with(&[("host", "evil.com:18080")]), 18080));
    }

    #[test]
    fn mismatched_port_is_rejected() {
        assert!(!host_is_allowed(&headers_with(&[("host", "127.0.0.1:9999")]), 18080));
    }
}
