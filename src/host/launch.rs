//! Lazy launch of the browser worker process (C7, §4.7).
//!
//! The spec's original design has the host spawn an OS-installed browser
//! whose extension dials back in. This crate has no extension; the
//! worker binary (`remix-worker`) plays that role, launching its own
//! Chrome over CDP and dialing back into the host's WebSocket server. The
//! OS-branching idiom is kept — grounded on the teacher's
//! `browser::launcher::chrome_candidates` — but applied to locating the
//! sibling `remix-worker` binary instead of a system Chrome.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tokio::process::{Child, Command};

fn worker_binary_name() -> &'static str {
    if cfg!(windows) {
        "remix-worker.exe"
    } else {
        "remix-worker"
    }
}

/// Candidate paths for the worker binary, checked in order: right next to
/// the running host binary first (the common case — both binaries built
/// from the same workspace land in the same `target/` directory), then
/// `PATH` via `which`.
fn worker_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(worker_binary_name()));
        }
    }
    if let Ok(path) = which::which(worker_binary_name()) {
        candidates.push(path);
    }
    candidates
}

pub fn find_worker_binary() -> Result<PathBuf> {
    worker_candidates()
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| {
            anyhow!(
                "could not find the `{}` binary next to `{}` or on PATH; build it with `cargo build --bin remix-worker`",
                worker_binary_name(),
                std::env::current_exe()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "remix-host".to_string())
            )
        })
}

/// Spawns the worker binary, pointing it at the host's bridge WebSocket
/// URL. Spawned at most once per host process (§4.7: `chromeLaunched` flag
/// — see `ConnectionManager`).
pub fn spawn_worker(ws_url: &str, headless: bool) -> Result<Child> {
    let binary = find_worker_binary()?;
    let mut cmd = Command::new(binary);
    cmd.arg("--connect").arg(ws_url);
    if headless {
        cmd.arg("--headless");
    }
    cmd.kill_on_drop(false);
    cmd.spawn().map_err(|e| anyhow!("failed to spawn worker process: {e}"))
}
