//! `remix-worker`: plays the role the spec assigns to an in-browser
//! extension — it launches (or attaches to) a Chrome instance over CDP,
//! runs the snapshot engine and action executor in-page, and dials back
//! into the host's bridge WebSocket server (C4, §4.4).
//!
//! Spawned lazily by `remix-host` (§4.7); `--connect` and `--headless`
//! are the flags `host::launch::spawn_worker` passes.

use clap::Parser;
use remix_browser_bridge::browser::session::BrowserSession;
use remix_browser_bridge::worker::client;

/// remix-worker: browser-side half of the agent↔browser bridge
#[derive(Parser)]
#[command(name = "remix-worker", version, about)]
struct Cli {
    /// Bridge WebSocket URL to dial, e.g. ws://127.0.0.1:18080/ws
    #[arg(long)]
    connect: String,

    /// Run Chrome headless (default: true)
    #[arg(long)]
    headless: bool,
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

    let session = BrowserSession::launch(cli.headless).await?;
    tracing::info!("browser worker started (headless: {})", cli.headless);

    tokio::select! {
        result = client::run(&cli.connect, &session) => {
            result?;
        }
        _ = wait_for_shutdown_signal() => {
            tracing::info!("received shutdown signal");
        }
    }

    session.close().await?;
    Ok(())
}

/// Mirrors `remix-host`'s signal handling (§6 "Process signals") so the
/// worker closes its Chrome instance cleanly instead of leaking it when
/// the host is killed out from under it.
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
