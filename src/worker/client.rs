//! The worker's outbound bridge connection: dials the host's WebSocket
//! server, dispatches every inbound request through `worker::dispatch`,
//! and reconnects with backoff if the host vanishes or hasn't started
//! listening yet.
//!
//! Grounded on the reconnect/session bookkeeping shape visible in
//! `other_examples/…SafeClaw…agent-bridge.rs` (`BridgeSession`'s
//! sender-per-connection + reconnect-on-close pattern), adapted from a
//! many-session server to this process's single outbound client role.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::bridge::BridgeMessage;
use crate::browser::session::BrowserSession;
use crate::worker::{self, WorkerRuntimeState};

const RECONNECT_BASE_DELAY: Duration = Duration::from_millis(500);
const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Runs forever: connect, serve requests until disconnected, back off,
/// reconnect. Returns only if the browser session itself dies.
pub async fn run(ws_url: &str, session: &BrowserSession) -> anyhow::Result<()> {
    let mut attempt: u32 = 0;
    loop {
        match connect_and_serve(ws_url, session).await {
            Ok(()) => {
                tracing::info!("bridge connection closed by host; reconnecting");
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!("bridge connection failed: {e:#}");
                attempt = attempt.saturating_add(1);
            }
        }
        let delay = RECONNECT_BASE_DELAY
            .saturating_mul(1u32 << attempt.min(5))
            .min(RECONNECT_MAX_DELAY);
        tokio::time::sleep(delay).await;
    }
}

async fn connect_and_serve(ws_url: &str, session: &BrowserSession) -> anyhow::Result<()> {
    let (stream, _response) = tokio_tungstenite::connect_async(ws_url).await?;
    tracing::info!("connected to host bridge at {ws_url}");
    let (mut write, mut read) = stream.split();

    let mut state = WorkerRuntimeState::new();

    while let Some(frame) = read.next().await {
        let frame = frame?;
        let text = match frame {
            Message::Text(t) => t,
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_) => continue,
        };

        let request: BridgeMessage = match serde_json::from_str(&text) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("dropping malformed bridge frame: {e}");
                continue;
            }
        };

        let response = worker::dispatch(&request, session, &mut state).await;
        let body = serde_json::to_string(&response)?;
        write.send(Message::Text(body)).await?;
    }

    Ok(())
}
