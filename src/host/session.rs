//! Session/tab manager (C8, §4.8): one sticky tab per MCP session, with
//! one-shot recovery when that tab disappears out from under an implicit
//! (no explicit `tabId`) request.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::bridge::{BridgeError, ErrorCode, Method};
use crate::host::connection::ConnectionManager;

#[derive(Debug, Default)]
pub struct SessionTabManager {
    sticky: Mutex<HashMap<String, String>>,
}

impl SessionTabManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn cached_tab(&self, session_id: &str) -> Option<String> {
        self.sticky.lock().await.get(session_id).cloned()
    }

    async fn set_tab(&self, session_id: &str, tab_id: String) {
        self.sticky.lock().await.insert(session_id.to_string(), tab_id);
    }

    async fn clear_tab(&self, session_id: &str) {
        self.sticky.lock().await.remove(session_id);
    }

    /// Resolves the effective tab for a tool call (§4.8 resolution order):
    /// explicit arg > cached session tab > freshly created tab. Returns
    /// the tab id to inject into the bridge request payload as `tabId`,
    /// unless the caller supplied an explicit one (in which case no
    /// recovery is attempted on `TAB_NOT_FOUND` — §4.8).
    pub async fn resolve_tab(
        &self,
        conn: &Arc<ConnectionManager>,
        session_id: &str,
        explicit_tab_id: Option<&str>,
    ) -> Result<String, BridgeError> {
        if let Some(explicit) = explicit_tab_id {
            return Ok(explicit.to_string());
        }
        if let Some(cached) = self.cached_tab(session_id).await {
            return Ok(cached);
        }
        let tab_id = self.create_tab(conn).await?;
        self.set_tab(session_id, tab_id.clone()).await;
        Ok(tab_id)
    }

    async fn create_tab(&self, conn: &Arc<ConnectionManager>) -> Result<String, BridgeError> {
        let result = conn.request_with_retry(Method::NewTab, json!({})).await?;
        result
            .get("tabId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BridgeError::new(ErrorCode::HandlerError, "newTab response missing tabId"))
    }

    /// Runs `call` with the resolved tab injected into `payload["tabId"]`.
    /// If the caller did not supply an explicit tab and the worker reports
    /// `TAB_NOT_FOUND`, clears the stale cached tab, creates a new one, and
    /// retries the whole call exactly once (§4.8, §8 property 9). An
    /// explicit-tab request receives `TAB_NOT_FOUND` unchanged.
    pub async fn call_with_recovery<F, Fut>(
        &self,
        conn: &Arc<ConnectionManager>,
        session_id: &str,
        explicit_tab_id: Option<&str>,
        mut build_payload: impl FnMut(&str) -> Value,
        call: F,
    ) -> Result<Value, BridgeError>
    where
        F: Fn(Value) -> Fut,
        Fut: std::future::Future<Output = Result<Value, BridgeError>>,
    {
        let tab_id = self
            .resolve_tab(conn, session_id, explicit_tab_id)
            .await?;
        let payload = build_payload(&tab_id);
        match call(payload).await {
            Err(err) if err.code == ErrorCode::TabNotFound && explicit_tab_id.is_none() => {
                self.clear_tab(session_id).await;
                let fresh_tab = self.create_tab(conn).await?;
                self.set_tab(session_id, fresh_tab.clone()).await;
                let retried_payload = build_payload(&fresh_tab);
                call(retried_payload).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn explicit_tab_bypasses_cache_and_creation() {
        let manager = SessionTabManager::new();
        let conn = ConnectionManager::new(0, true);
        let tab = manager.resolve_tab(&conn, "s1", Some("explicit-tab")).await.unwrap();
        assert_eq!(tab, "explicit-tab");
        assert!(manager.cached_tab("s1").await.is_none());
    }

    #[tokio::test]
    async fn cached_tab_is_reused_across_calls() {
        let manager = SessionTabManager::new();
        manager.set_tab("s1", "tab-7".to_string()).await;
        let conn = ConnectionManager::new(0, true);
        let tab = manager.resolve_tab(&conn, "s1", None).await.unwrap();
        assert_eq!(tab, "tab-7");
    }
}
