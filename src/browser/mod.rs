//! CDP browser/tab management the worker drives (kept from the teacher's
//! `browser::session`/`browser::pool`, generalized to be driven by bridge
//! requests instead of direct MCP tool calls — see `crate::worker`).

pub mod pool;
pub mod session;
