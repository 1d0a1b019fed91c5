//! WebMCP discovery and invocation (C5, §4.5). New module — the teacher
//! has no equivalent concept.
//!
//! The spec describes a `postMessage`-correlated channel between an
//! isolated content-script world and the page's main world, because a real
//! browser extension's content scripts execute in a separate JS realm from
//! the page. This crate's worker drives the page directly over CDP
//! `Runtime.evaluate` (see SPEC_FULL.md's process-layout note), which
//! always executes in the page's own main world — there is no isolated
//! world to bridge across. The `postMessage` indirection therefore
//! collapses to a direct evaluate: discovery and invocation read
//! `navigator.modelContext` (or synthesize tools from the DOM) in the same
//! call that would otherwise relay through the channel. Documented as an
//! architecture decision in DESIGN.md.

pub mod discovery;
pub mod invoke;

use serde::{Deserialize, Serialize};

/// Where a `WebMcpTool` came from (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolSource {
    WebmcpNative,
    SynthesizedForm,
    SynthesizedButton,
    SynthesizedLink,
    SynthesizedInput,
}

/// A tool the page declares (natively or via synthesis) that the agent can
/// invoke through `invoke_webmcp_tool` (§3, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebMcpTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    pub source: ToolSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_ref: Option<String>,
}
