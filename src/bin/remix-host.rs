//! `remix-host`: speaks MCP over stdio to the agent, and the bridge
//! protocol over a loopback WebSocket to the browser worker (C6, §4.6).
//! Binds its port per §6/§4.7 (`WEBCLAW_PORT` override, else scan
//! `18080..=18089`), lazily launches the worker on first tool call, and
//! exits 1 on a bind failure.

use std::sync::Arc;

use clap::Parser;
use remix_browser_bridge::bridge::transport_ws;
use remix_browser_bridge::host::connection::{bind_listener, ConnectionManager};
use remix_browser_bridge::host::tools::RemixBridgeServer;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tokio::sync::Notify;

/// remix-host: MCP↔browser bridge host process
#[derive(Parser)]
#[command(name = "remix-host", version, about)]
struct Cli {
    /// Launch the browser worker with a visible window (default: headless)
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let headless = !cli.headed;

    let (listener, port) = match bind_listener().await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("{e:#}");
            std::process::exit(1);
        }
    };
    tracing::info!("bridge WebSocket listening on ws://127.0.0.1:{port}/ws");

    let conn = ConnectionManager::new(port, headless);
    let shutdown = Arc::new(Notify::new());

    let ws_conn = conn.clone();
    let ws_shutdown = shutdown.clone();
    let ws_task = tokio::spawn(async move {
        if let Err(e) = transport_ws::serve(listener, port, ws_conn, async move {
            ws_shutdown.notified().await;
        })
        .await
        {
            tracing::error!("bridge WebSocket server exited: {e:#}");
        }
    });

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("received shutdown signal");
        signal_shutdown.notify_waiters();
    });

    let server = RemixBridgeServer::new(conn);
    let service = server.clone().serve(stdio()).await?;
    service.waiting().await?;

    shutdown.notify_waiters();
    let _ = ws_task.await;

    tracing::info!("remix-host shut down");
    Ok(())
}

/// Waits for SIGTERM or SIGINT (Ctrl+C) so the WebSocket server and MCP
/// transport both shut down gracefully (§6 "Process signals").
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
