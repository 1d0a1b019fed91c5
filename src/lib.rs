// rmcp's #[tool] macros generate code that calls these functions,
// but rustc/clippy can't trace through the macro-generated dispatching.
#![allow(dead_code)]

pub mod actions;
pub mod bridge;
pub mod browser;
pub mod host;
pub mod snapshot;
pub mod webmcp;
pub mod worker;
