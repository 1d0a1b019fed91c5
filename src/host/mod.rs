//! The host process (`remix-host`): speaks MCP on stdio to the agent and
//! the bridge protocol over WebSocket to the browser worker.
//!
//! Submodules map directly to the spec's host-side components: `bridge`'s
//! WebSocket server lives in `crate::bridge::transport_ws`; everything
//! else here is host-only.

pub mod connection;
pub mod launch;
pub mod retry;
pub mod session;
pub mod tools;
