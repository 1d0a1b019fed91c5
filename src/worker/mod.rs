//! Per-tab worker dispatch (C4, §4.4): routes one bridge request to the
//! snapshot engine (C2), action executor (C3), WebMCP discovery (C5), or a
//! browser/tab API, and builds the response or error envelope.

pub mod client;
pub mod navigation;
pub mod screenshot;
pub mod tabs;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use chromiumoxide::page::Page;
use serde::Deserialize;
use serde_json::json;

use crate::actions::dropfiles::DropFile;
use crate::actions::{check_snapshot_current, click, dropfiles, hover, keyboard, scroll, select};
use crate::bridge::{BridgeError, BridgeMessage, ErrorCode, Method};
use crate::browser::session::BrowserSession;
use crate::snapshot::{self, SnapshotOptions};
use crate::webmcp::{discovery, invoke};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Per-tab bookkeeping the worker needs beyond what `chromiumoxide::Page`
/// already tracks: the id of the most recently captured snapshot, used to
/// validate an action's `snapshotId` precondition (§4.3 step 1) without a
/// browser round trip.
#[derive(Debug, Default)]
pub struct WorkerRuntimeState {
    current_snapshot_id: HashMap<String, String>,
}

impl WorkerRuntimeState {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_snapshot(&mut self, tab_id: &str, snapshot_id: String) {
        self.current_snapshot_id.insert(tab_id.to_string(), snapshot_id);
    }

    fn current_for(&self, tab_id: &str) -> Option<&str> {
        self.current_snapshot_id.get(tab_id).map(String::as_str)
    }
}

/// Resolves the effective tab for a request: explicit `tabId` if present
/// and found, else the pool's active tab. Distinguishes the two `TAB_NOT_FOUND`
/// cases the session manager (C8) needs to tell apart: explicit-but-missing
/// vs. no-active-tab.
async fn resolve_tab(
    session: &BrowserSession,
    explicit_tab_id: Option<&str>,
) -> Result<Page, ErrorCode> {
    match explicit_tab_id {
        Some(id) => tabs::find_tab(session, id).await.ok_or(ErrorCode::TabNotFound),
        None => {
            let pool = session.pool.lock().await;
            if pool.page_count() == 0 {
                Err(ErrorCode::NoActiveTab)
            } else {
                Ok(pool.active_page().clone())
            }
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RefActionPayload {
    #[serde(rename = "ref")]
    ref_: String,
    #[serde(default)]
    snapshot_id: String,
    #[serde(default)]
    tab_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default = "default_true")]
    clear_first: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    files: Vec<DropFile>,
}

fn default_true() -> bool {
    true
}

async fn ensure_fresh(
    state: &WorkerRuntimeState,
    page: &Page,
    tab_id: &str,
    requested: &str,
) -> Result<(), ErrorCode> {
    match state.current_for(tab_id) {
        Some(current) => check_snapshot_current(current, requested)
            .map_err(|_| ErrorCode::StaleSnapshot),
        None => {
            let _ = page;
            Err(ErrorCode::StaleSnapshot)
        }
    }
}

/// Dispatches one bridge request and returns the `response`/`error`
/// envelope to send back.
pub async fn dispatch(
    request: &BridgeMessage,
    session: &BrowserSession,
    state: &mut WorkerRuntimeState,
) -> BridgeMessage {
    let ts = now_ms();
    match dispatch_inner(request, session, state).await {
        Ok(payload) => BridgeMessage::response(request.id.clone(), payload, ts),
        Err(code) => {
            let message = match code {
                ErrorCode::TabNotFound => "Tab not found.".to_string(),
                ErrorCode::NoActiveTab => "No active tab.".to_string(),
                ErrorCode::StaleSnapshot => "Snapshot is stale.".to_string(),
                ErrorCode::NavigationTimeout => "Navigation timed out.".to_string(),
                ErrorCode::ScreenshotFailed => "Screenshot failed.".to_string(),
                ErrorCode::ContentScriptError => "Content script failed.".to_string(),
                ErrorCode::HandlerError => "Handler error.".to_string(),
                ErrorCode::UnknownMethod => "Unknown method.".to_string(),
                ErrorCode::ConnectionLost => "Connection lost.".to_string(),
            };
            BridgeMessage::error(request.id.clone(), &BridgeError::new(code, message), ts)
        }
    }
}

async fn dispatch_inner(
    request: &BridgeMessage,
    session: &BrowserSession,
    state: &mut WorkerRuntimeState,
) -> Result<serde_json::Value, ErrorCode> {
    let Some(method) = request.method else {
        return Err(ErrorCode::UnknownMethod);
    };

    match method {
        Method::Ping => Ok(json!({})),

        Method::NewTab => {
            let url = request.payload.get("url").and_then(|v| v.as_str());
            let info = tabs::new_tab(session, url).await.map_err(|_| ErrorCode::HandlerError)?;
            Ok(serde_json::to_value(info).unwrap())
        }

        Method::ListTabs => {
            let list = tabs::list_tabs(session).await.map_err(|_| ErrorCode::HandlerError)?;
            Ok(json!({ "tabs": list }))
        }

        Method::SwitchTab => {
            let tab_id = request
                .payload
                .get("tabId")
                .and_then(|v| v.as_str())
                .ok_or(ErrorCode::TabNotFound)?;
            match tabs::switch_tab(session, tab_id).await.map_err(|_| ErrorCode::HandlerError)? {
                Some(info) => Ok(serde_json::to_value(info).unwrap()),
                None => Err(ErrorCode::TabNotFound),
            }
        }

        Method::CloseTab => {
            let tab_id = request
                .payload
                .get("tabId")
                .and_then(|v| v.as_str())
                .ok_or(ErrorCode::TabNotFound)?;
            let closed = tabs::close_tab(session, tab_id).await.map_err(|_| ErrorCode::HandlerError)?;
            if closed {
                Ok(json!({ "closed": true }))
            } else {
                Err(ErrorCode::TabNotFound)
            }
        }

        Method::Navigate => {
            let tab_id = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id).await?;
            let url = request
                .payload
                .get("url")
                .and_then(|v| v.as_str())
                .ok_or(ErrorCode::HandlerError)?;
            let wait_until = request.payload.get("waitUntil").and_then(|v| v.as_str());
            let result = navigation::navigate(&page, url, wait_until).await?;
            Ok(json!({ "url": result.url, "title": result.title, "tabId": page.target_id().to_string() }))
        }

        Method::GoBack | Method::GoForward | Method::Reload => {
            let tab_id = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id).await?;
            let bypass_cache = request
                .payload
                .get("bypassCache")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let result = match method {
                Method::GoBack => navigation::go_back(&page).await?,
                Method::GoForward => navigation::go_forward(&page).await?,
                _ => navigation::reload(&page, bypass_cache).await?,
            };
            Ok(json!({ "url": result.url, "title": result.title }))
        }

        Method::WaitForNavigation => {
            let tab_id = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id).await?;
            let timeout_ms = request
                .payload
                .get("timeoutMs")
                .and_then(|v| v.as_u64())
                .unwrap_or(30_000);
            let result = navigation::wait_for_navigation(&page, timeout_ms).await?;
            Ok(json!({ "url": result.url, "title": result.title }))
        }

        Method::Snapshot => {
            let tab_id_arg = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id_arg).await?;
            let tab_id = page.target_id().to_string();
            let max_tokens = request.payload.get("maxTokens").and_then(|v| v.as_u64()).map(|v| v as usize);
            let focus_region = request
                .payload
                .get("focusRegion")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let options = SnapshotOptions {
                max_tokens: max_tokens.unwrap_or(4000),
                focus_region,
            };
            let snap = snapshot::capture(&page, &options)
                .await
                .map_err(|_| ErrorCode::ContentScriptError)?;
            state.record_snapshot(&tab_id, snap.snapshot_id.clone());
            let text = snapshot::format_snapshot(&snap, max_tokens);
            Ok(json!({
                "text": text,
                "snapshotId": snap.snapshot_id,
                "url": snap.url,
                "title": snap.title,
                "tabId": tab_id,
            }))
        }

        Method::Screenshot => {
            let tab_id = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id).await?;
            let data = screenshot::capture(&page).await?;
            Ok(json!({ "format": "png", "data": data }))
        }

        Method::Click | Method::Hover | Method::TypeText | Method::SelectOption | Method::DropFiles => {
            let payload: RefActionPayload =
                serde_json::from_value(request.payload.clone()).map_err(|_| ErrorCode::HandlerError)?;
            let page = resolve_tab(session, payload.tab_id.as_deref()).await?;
            let tab_id = page.target_id().to_string();
            ensure_fresh(state, &page, &tab_id, &payload.snapshot_id).await?;

            let result = match method {
                Method::Click => click::click(&page, &payload.ref_).await,
                Method::Hover => hover::hover(&page, &payload.ref_).await,
                Method::TypeText => {
                    let text = payload.text.clone().unwrap_or_default();
                    keyboard::type_text(&page, &payload.ref_, &text, payload.clear_first).await
                }
                Method::SelectOption => {
                    let value = payload.value.clone().unwrap_or_default();
                    select::select_option(&page, &payload.ref_, &value).await
                }
                Method::DropFiles => dropfiles::drop_files(&page, &payload.ref_, &payload.files).await,
                _ => unreachable!(),
            };
            let result = result.map_err(|_| ErrorCode::ContentScriptError)?;
            Ok(serde_json::to_value(result).unwrap())
        }

        Method::ScrollPage => {
            let tab_id = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id).await?;
            let ref_ = request.payload.get("ref").and_then(|v| v.as_str());
            if let (Some(r), Some(sid)) = (ref_, request.payload.get("snapshotId").and_then(|v| v.as_str())) {
                let tid = page.target_id().to_string();
                ensure_fresh(state, &page, &tid, sid).await?;
                let _ = r;
            }
            let direction = request.payload.get("direction").and_then(|v| v.as_str()).unwrap_or("down");
            let amount = request.payload.get("amount").and_then(|v| v.as_i64()).unwrap_or(300);
            let result = scroll::scroll_page(&page, ref_, direction, amount)
                .await
                .map_err(|_| ErrorCode::ContentScriptError)?;
            Ok(serde_json::to_value(result).unwrap())
        }

        Method::ListWebMcpTools => {
            let tab_id = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id).await?;
            let tools = discovery::discover(&page).await.map_err(|_| ErrorCode::ContentScriptError)?;
            Ok(json!({ "tools": tools }))
        }

        Method::InvokeWebMcpTool => {
            let tab_id = request.payload.get("tabId").and_then(|v| v.as_str());
            let page = resolve_tab(session, tab_id).await?;
            let tool_name = request
                .payload
                .get("toolName")
                .and_then(|v| v.as_str())
                .ok_or(ErrorCode::HandlerError)?;
            let args = request.payload.get("args").cloned().unwrap_or(json!({}));
            let result = invoke::invoke(&page, tool_name, &args)
                .await
                .map_err(|_| ErrorCode::ContentScriptError)?;
            Ok(result)
        }
    }
}
