//! The MCP tool surface (C10, §4.10, §6): the 19 agent-facing tools,
//! mapped onto bridge methods and routed through the connection manager
//! (C7, `request_with_retry`) and the session/tab manager (C8,
//! `call_with_recovery`).
//!
//! Grounded on the teacher's `server.rs` `RemixBrowserServer`: the same
//! `#[tool(tool_box)]` / `ServerHandler` / `CallToolResult::success`-or-
//! `::error` idiom, generalized from bodies that call CDP directly to
//! bodies that send a bridge request and format its JSON payload.

use std::sync::Arc;

use rmcp::model::*;
use rmcp::tool;
use rmcp::{Error as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bridge::{BridgeError, ErrorCode, Method};
use crate::host::connection::ConnectionManager;
use crate::host::session::SessionTabManager;
use crate::snapshot::refs::is_valid_ref;

const SERVER_INSTRUCTIONS: &str = "remix-browser-bridge exposes a remote Chrome tab as MCP tools, addressed \
through a compact accessibility snapshot rather than CSS selectors. Call `page_snapshot` first to get a \
`snapshotId` and a list of `[@eN role \"name\"]` elements, then pass the `ref` and `snapshotId` you observed \
to `click`/`hover`/`type_text`/`select_option`/`scroll_page`/`drop_files`. A `ref` only stays valid for the \
snapshot it came from — acting on a stale one fails with STALE_SNAPSHOT, so re-snapshot before trying again. \
Each MCP session gets its own dedicated browser tab automatically; pass an explicit `tabId` only to target a \
different tab deliberately.";

/// The MCP server: one per agent session, each with its own sticky tab.
#[derive(Clone)]
pub struct RemixBridgeServer {
    conn: Arc<ConnectionManager>,
    sessions: Arc<SessionTabManager>,
    session_id: String,
}

impl RemixBridgeServer {
    pub fn new(conn: Arc<ConnectionManager>) -> Self {
        Self {
            conn,
            sessions: SessionTabManager::new(),
            session_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    fn text(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(msg)]))
    }

    fn error_result(err: &BridgeError) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![Content::text(err.to_agent_text())]))
    }

    /// Sends a bridge request for the tab resolved per §4.8: explicit
    /// `tabId` argument, else the session's sticky tab, else a fresh one —
    /// with the one-shot `TAB_NOT_FOUND` recovery only implicit-tab calls
    /// get.
    async fn call_tab(
        &self,
        method: Method,
        explicit_tab_id: Option<String>,
        payload: Value,
    ) -> Result<Value, BridgeError> {
        let conn = self.conn.clone();
        self.sessions
            .call_with_recovery(
                &conn,
                &self.session_id,
                explicit_tab_id.as_deref(),
                move |tab_id| {
                    let mut p = payload.clone();
                    p["tabId"] = json!(tab_id);
                    p
                },
                move |payload| {
                    let conn = conn.clone();
                    async move { conn.request_with_retry(method, payload).await }
                },
            )
            .await
    }

    fn invalid(msg: impl Into<String>) -> McpError {
        McpError::invalid_params(msg.into(), None)
    }

    fn validate_ref(ref_: &str) -> Result<(), McpError> {
        if is_valid_ref(ref_) {
            Ok(())
        } else {
            Err(Self::invalid(format!(
                "'{ref_}' is not a valid ref; refs look like @e1, @e2, ..."
            )))
        }
    }

    fn validate_url(url: &str) -> Result<(), McpError> {
        if url.contains("://") || url.starts_with("about:") || url.starts_with("data:") {
            Ok(())
        } else {
            Err(Self::invalid(format!("'{url}' does not look like a URL")))
        }
    }

    fn validate_positive(name: &str, v: i64) -> Result<(), McpError> {
        if v > 0 {
            Ok(())
        } else {
            Err(Self::invalid(format!("{name} must be a positive integer")))
        }
    }
}

#[tool(tool_box)]
impl ServerHandler for RemixBridgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NavigateToParams {
    #[schemars(description = "URL to navigate to")]
    pub url: String,
    #[schemars(description = "Tab to navigate; defaults to this session's tab")]
    pub tab_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PageSnapshotParams {
    pub tab_id: Option<String>,
    #[schemars(description = "Token budget for the rendered snapshot (default 4000)")]
    pub max_tokens: Option<u32>,
    #[schemars(description = "Landmark to scope the snapshot to: main, nav, complementary, ...")]
    pub focus_region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RefActionParams {
    #[schemars(description = "Opaque element handle from the most recent page_snapshot, e.g. @e3")]
    pub ref_: String,
    #[schemars(description = "snapshotId the ref was observed in")]
    pub snapshot_id: String,
    pub tab_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TypeTextParams {
    pub ref_: String,
    pub text: String,
    pub snapshot_id: String,
    #[schemars(description = "Clear the field before typing (default true)")]
    pub clear_first: Option<bool>,
    pub tab_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SelectOptionParams {
    pub ref_: String,
    pub value: String,
    pub snapshot_id: String,
    pub tab_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TabIdOnlyParams {
    pub tab_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InvokeWebMcpToolParams {
    pub tool_name: String,
    pub args: serde_json::Map<String, Value>,
    pub tab_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NewTabParams {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TargetTabParams {
    pub tab_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NavHistoryParams {
    pub tab_id: Option<String>,
    #[schemars(description = "Bypass the cache on reload")]
    pub bypass_cache: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WaitForNavigationParams {
    pub tab_id: Option<String>,
    pub timeout_ms: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ScrollPageParams {
    pub tab_id: Option<String>,
    #[schemars(description = "up or down")]
    pub direction: Option<String>,
    pub amount: Option<i64>,
    #[schemars(description = "Scroll this element into view instead of the page")]
    pub ref_: Option<String>,
    pub snapshot_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DropFileSpec {
    pub name: String,
    pub mime_type: String,
    pub base64_data: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DropFilesParams {
    pub ref_: String,
    pub snapshot_id: String,
    pub files: Vec<DropFileSpec>,
    pub tab_id: Option<String>,
}

#[tool(tool_box)]
impl RemixBridgeServer {
    // ── Navigation ──────────────────────────────────────────────────────

    #[tool(description = "Navigate the tab to a URL. Returns the page title, URL, and tab id.")]
    async fn navigate_to(
        &self,
        #[tool(aggr)] params: NavigateToParams,
    ) -> Result<CallToolResult, McpError> {
        Self::validate_url(&params.url)?;
        let payload = json!({ "url": params.url });
        match self.call_tab(Method::Navigate, params.tab_id, payload).await {
            Ok(v) => Self::text(format!(
                "Navigated to: {}\nURL: {}\nTab: {}",
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default(),
                v["tabId"].as_str().unwrap_or_default(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Go back in the tab's history.")]
    async fn go_back(&self, #[tool(aggr)] params: NavHistoryParams) -> Result<CallToolResult, McpError> {
        let payload = json!({ "bypassCache": params.bypass_cache.unwrap_or(false) });
        match self.call_tab(Method::GoBack, params.tab_id, payload).await {
            Ok(v) => Self::text(format!(
                "Went to: {}\nURL: {}",
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default()
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Go forward in the tab's history.")]
    async fn go_forward(&self, #[tool(aggr)] params: NavHistoryParams) -> Result<CallToolResult, McpError> {
        let payload = json!({ "bypassCache": params.bypass_cache.unwrap_or(false) });
        match self.call_tab(Method::GoForward, params.tab_id, payload).await {
            Ok(v) => Self::text(format!(
                "Went to: {}\nURL: {}",
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default()
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Reload the tab, optionally bypassing the cache.")]
    async fn reload(&self, #[tool(aggr)] params: NavHistoryParams) -> Result<CallToolResult, McpError> {
        let payload = json!({ "bypassCache": params.bypass_cache.unwrap_or(false) });
        match self.call_tab(Method::Reload, params.tab_id, payload).await {
            Ok(v) => Self::text(format!(
                "Went to: {}\nURL: {}",
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default()
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Wait until the tab finishes loading (document.readyState === 'complete').")]
    async fn wait_for_navigation(
        &self,
        #[tool(aggr)] params: WaitForNavigationParams,
    ) -> Result<CallToolResult, McpError> {
        let timeout_ms = params.timeout_ms.unwrap_or(30_000);
        Self::validate_positive("timeoutMs", timeout_ms as i64)?;
        let payload = json!({ "timeoutMs": timeout_ms });
        match self.call_tab(Method::WaitForNavigation, params.tab_id, payload).await {
            Ok(v) => Self::text(format!(
                "Page loaded: {} — {}",
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default()
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    // ── Observation ─────────────────────────────────────────────────────

    #[tool(
        description = "Capture a compact accessibility snapshot of the page: indented [@eN role \"name\"] \
        lines for every interactive element. Pass the returned snapshotId and refs to click/hover/type_text/\
        select_option/scroll_page/drop_files."
    )]
    async fn page_snapshot(
        &self,
        #[tool(aggr)] params: PageSnapshotParams,
    ) -> Result<CallToolResult, McpError> {
        if let Some(mt) = params.max_tokens {
            Self::validate_positive("maxTokens", mt as i64)?;
        }
        let payload = json!({
            "maxTokens": params.max_tokens,
            "focusRegion": params.focus_region,
        });
        match self.call_tab(Method::Snapshot, params.tab_id, payload).await {
            Ok(v) => Self::text(format!(
                "Page: {}\nURL: {}\nSnapshot ID: {}\n\n{}",
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default(),
                v["snapshotId"].as_str().unwrap_or_default(),
                v["text"].as_str().unwrap_or_default(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Capture a PNG screenshot of the tab's current viewport.")]
    async fn screenshot(&self, #[tool(aggr)] params: TabIdOnlyParams) -> Result<CallToolResult, McpError> {
        match self.call_tab(Method::Screenshot, params.tab_id, json!({})).await {
            Ok(v) => Ok(CallToolResult::success(vec![Content::image(
                v["data"].as_str().unwrap_or_default().to_string(),
                "image/png",
            )])),
            Err(err) => Self::error_result(&err),
        }
    }

    // ── Interaction ─────────────────────────────────────────────────────

    #[tool(description = "Click the element addressed by ref in the given snapshot.")]
    async fn click(&self, #[tool(aggr)] params: RefActionParams) -> Result<CallToolResult, McpError> {
        Self::validate_ref(&params.ref_)?;
        let payload = json!({ "ref": params.ref_, "snapshotId": params.snapshot_id });
        let ref_ = params.ref_.clone();
        match self.call_tab(Method::Click, params.tab_id, payload).await {
            Ok(v) if v["success"].as_bool() == Some(true) => Self::text(format!("Clicked {ref_}")),
            Ok(v) => Self::error_result(&BridgeError::new(
                ErrorCode::HandlerError,
                v["error"].as_str().unwrap_or("click failed").to_string(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Hover the mouse over the element addressed by ref in the given snapshot.")]
    async fn hover(&self, #[tool(aggr)] params: RefActionParams) -> Result<CallToolResult, McpError> {
        Self::validate_ref(&params.ref_)?;
        let payload = json!({ "ref": params.ref_, "snapshotId": params.snapshot_id });
        let ref_ = params.ref_.clone();
        match self.call_tab(Method::Hover, params.tab_id, payload).await {
            Ok(v) if v["success"].as_bool() == Some(true) => {
                Self::text(format!("Hovered over {ref_}"))
            }
            Ok(v) => Self::error_result(&BridgeError::new(
                ErrorCode::HandlerError,
                v["error"].as_str().unwrap_or("hover failed").to_string(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(
        description = "Type text into the text-like element addressed by ref. clearFirst (default true) \
        clears the existing value before typing."
    )]
    async fn type_text(&self, #[tool(aggr)] params: TypeTextParams) -> Result<CallToolResult, McpError> {
        Self::validate_ref(&params.ref_)?;
        let clear_first = params.clear_first.unwrap_or(true);
        let payload = json!({
            "ref": params.ref_,
            "text": params.text,
            "snapshotId": params.snapshot_id,
            "clearFirst": clear_first,
        });
        let (ref_, text) = (params.ref_.clone(), params.text.clone());
        match self.call_tab(Method::TypeText, params.tab_id, payload).await {
            Ok(v) if v["success"].as_bool() == Some(true) => {
                Self::text(format!("Typed \"{text}\" into {ref_}"))
            }
            Ok(v) => Self::error_result(&BridgeError::new(
                ErrorCode::HandlerError,
                v["error"].as_str().unwrap_or("typeText failed").to_string(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Select an option (by value or visible text) in the <select> addressed by ref.")]
    async fn select_option(
        &self,
        #[tool(aggr)] params: SelectOptionParams,
    ) -> Result<CallToolResult, McpError> {
        Self::validate_ref(&params.ref_)?;
        let payload = json!({
            "ref": params.ref_,
            "value": params.value,
            "snapshotId": params.snapshot_id,
        });
        let (ref_, value) = (params.ref_.clone(), params.value.clone());
        match self.call_tab(Method::SelectOption, params.tab_id, payload).await {
            Ok(v) if v["success"].as_bool() == Some(true) => {
                Self::text(format!("Selected \"{value}\" in {ref_}"))
            }
            Ok(v) => Self::error_result(&BridgeError::new(
                ErrorCode::HandlerError,
                v["error"].as_str().unwrap_or("selectOption failed").to_string(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(
        description = "Scroll the page in a direction (default down, 300px) or scroll a ref'd element \
        into view."
    )]
    async fn scroll_page(&self, #[tool(aggr)] params: ScrollPageParams) -> Result<CallToolResult, McpError> {
        if let Some(r) = &params.ref_ {
            Self::validate_ref(r)?;
        }
        if let Some(a) = params.amount {
            Self::validate_positive("amount", a)?;
        }
        let payload = json!({
            "direction": params.direction.clone().unwrap_or_else(|| "down".to_string()),
            "amount": params.amount.unwrap_or(300),
            "ref": params.ref_,
            "snapshotId": params.snapshot_id,
        });
        match self.call_tab(Method::ScrollPage, params.tab_id, payload).await {
            Ok(v) if v["success"].as_bool() == Some(true) => match &params.ref_ {
                Some(r) => Self::text(format!("Scrolled {r} into view")),
                None => Self::text(format!(
                    "Scrolled {} {}px",
                    params.direction.unwrap_or_else(|| "down".to_string()),
                    params.amount.unwrap_or(300)
                )),
            },
            Ok(v) => Self::error_result(&BridgeError::new(
                ErrorCode::HandlerError,
                v["error"].as_str().unwrap_or("scrollPage failed").to_string(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(
        description = "Drop one or more files onto the element addressed by ref (a file input, or a \
        drag-and-drop target). Each file carries its raw bytes as base64Data, or a filePath to read from disk."
    )]
    async fn drop_files(&self, #[tool(aggr)] params: DropFilesParams) -> Result<CallToolResult, McpError> {
        Self::validate_ref(&params.ref_)?;
        if params.files.is_empty() {
            return Err(Self::invalid("files must contain at least one entry"));
        }
        let mut resolved = Vec::with_capacity(params.files.len());
        for f in &params.files {
            let data = match (&f.base64_data, &f.file_path) {
                (Some(b64), _) => b64.clone(),
                (None, Some(path)) => {
                    let bytes = std::fs::read(path)
                        .map_err(|e| Self::invalid(format!("failed to read {path}: {e}")))?;
                    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
                }
                (None, None) => {
                    return Err(Self::invalid(format!(
                        "file {:?} must set base64Data or filePath",
                        f.name
                    )))
                }
            };
            resolved.push(json!({ "name": f.name, "mime_type": f.mime_type, "base64_data": data }));
        }
        let n = resolved.len();
        let payload = json!({
            "ref": params.ref_,
            "snapshotId": params.snapshot_id,
            "files": resolved,
        });
        let ref_ = params.ref_.clone();
        match self.call_tab(Method::DropFiles, params.tab_id, payload).await {
            Ok(v) if v["success"].as_bool() == Some(true) => {
                let names: Vec<_> = params.files.iter().map(|f| f.name.as_str()).collect();
                Self::text(format!(
                    "Dropped {n} file(s) onto {ref_}: {}",
                    names.join(", ")
                ))
            }
            Ok(v) => Self::error_result(&BridgeError::new(
                ErrorCode::HandlerError,
                v["error"].as_str().unwrap_or("dropFiles failed").to_string(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    // ── WebMCP ──────────────────────────────────────────────────────────

    #[tool(description = "List the WebMCP tools the page declares natively or that can be synthesized from its forms/buttons/links/inputs.")]
    async fn list_webmcp_tools(
        &self,
        #[tool(aggr)] params: TabIdOnlyParams,
    ) -> Result<CallToolResult, McpError> {
        match self.call_tab(Method::ListWebMcpTools, params.tab_id, json!({})).await {
            Ok(v) => {
                let tools = v["tools"].as_array().cloned().unwrap_or_default();
                let mut lines = vec![format!("{} WebMCP tool(s):", tools.len())];
                for t in &tools {
                    lines.push(format!(
                        "- {} ({}): {}",
                        t["name"].as_str().unwrap_or("?"),
                        t["source"].as_str().unwrap_or("?"),
                        t["description"].as_str().unwrap_or(""),
                    ));
                }
                Self::text(lines.join("\n"))
            }
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Invoke a WebMCP tool previously returned by list_webmcp_tools.")]
    async fn invoke_webmcp_tool(
        &self,
        #[tool(aggr)] params: InvokeWebMcpToolParams,
    ) -> Result<CallToolResult, McpError> {
        let payload = json!({ "toolName": params.tool_name, "args": Value::Object(params.args) });
        match self.call_tab(Method::InvokeWebMcpTool, params.tab_id, payload).await {
            Ok(v) => Self::text(serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())),
            Err(err) => Self::error_result(&err),
        }
    }

    // ── Tabs ────────────────────────────────────────────────────────────

    #[tool(description = "Open a new browser tab, optionally navigating it to a URL.")]
    async fn new_tab(&self, #[tool(aggr)] params: NewTabParams) -> Result<CallToolResult, McpError> {
        if let Some(url) = &params.url {
            Self::validate_url(url)?;
        }
        let payload = json!({ "url": params.url });
        match self.conn.request_with_retry(Method::NewTab, payload).await {
            Ok(v) => Self::text(format!(
                "Opened new tab ({}): {} — {}",
                v["tabId"].as_str().unwrap_or_default(),
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "List every open tab, marking the active one.")]
    async fn list_tabs(&self) -> Result<CallToolResult, McpError> {
        match self.conn.request_with_retry(Method::ListTabs, json!({})).await {
            Ok(v) => {
                let tabs = v["tabs"].as_array().cloned().unwrap_or_default();
                let mut lines = vec![format!("{} tabs:", tabs.len())];
                for (i, t) in tabs.iter().enumerate() {
                    let marker = if i == 0 { "[*]" } else { "   " };
                    lines.push(format!(
                        "{marker}{} {} — {}",
                        t["tabId"].as_str().unwrap_or_default(),
                        t["title"].as_str().unwrap_or_default(),
                        t["url"].as_str().unwrap_or_default(),
                    ));
                }
                Self::text(lines.join("\n"))
            }
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Switch the active tab.")]
    async fn switch_tab(&self, #[tool(aggr)] params: TargetTabParams) -> Result<CallToolResult, McpError> {
        let payload = json!({ "tabId": params.tab_id });
        match self.conn.request_with_retry(Method::SwitchTab, payload).await {
            Ok(v) => Self::text(format!(
                "Switched to tab {}: {} — {}",
                params.tab_id,
                v["title"].as_str().unwrap_or_default(),
                v["url"].as_str().unwrap_or_default(),
            )),
            Err(err) => Self::error_result(&err),
        }
    }

    #[tool(description = "Close a tab.")]
    async fn close_tab(&self, #[tool(aggr)] params: TargetTabParams) -> Result<CallToolResult, McpError> {
        let payload = json!({ "tabId": params.tab_id });
        match self.conn.request_with_retry(Method::CloseTab, payload).await {
            Ok(_) => Self::text(format!("Closed tab {}", params.tab_id)),
            Err(err) => Self::error_result(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_ref_rejects_css_selectors() {
        assert!(RemixBridgeServer::validate_ref("#submit").is_err());
        assert!(RemixBridgeServer::validate_ref("@e3").is_ok());
    }

    #[test]
    fn validate_url_accepts_scheme_forms() {
        assert!(RemixBridgeServer::validate_url("https://example.com").is_ok());
        assert!(RemixBridgeServer::validate_url("about:blank").is_ok());
        assert!(RemixBridgeServer::validate_url("not a url").is_err());
    }

    #[test]
    fn validate_positive_rejects_zero_and_negative() {
        assert!(RemixBridgeServer::validate_positive("amount", 0).is_err());
        assert!(RemixBridgeServer::validate_positive("amount", -5).is_err());
        assert!(RemixBridgeServer::validate_positive("amount", 1).is_ok());
    }

    #[test]
    fn server_instructions_mention_snapshot_first_workflow() {
        assert!(SERVER_INSTRUCTIONS.contains("page_snapshot"));
        assert!(SERVER_INSTRUCTIONS.contains("STALE_SNAPSHOT"));
    }
}
