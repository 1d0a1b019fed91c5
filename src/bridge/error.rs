//! Canonical bridge error codes and their agent-facing recovery hints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of error codes a bridge response can carry (§4.1, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConnectionLost,
    TabNotFound,
    StaleSnapshot,
    NavigationTimeout,
    NoActiveTab,
    UnknownMethod,
    HandlerError,
    ContentScriptError,
    ScreenshotFailed,
}

impl ErrorCode {
    /// Short, human recovery hint appended by the MCP tool layer (§7).
    pub fn recovery_hint(self) -> &'static str {
        match self {
            ErrorCode::ConnectionLost => {
                "The browser connection was lost; the bridge will reconnect automatically on the next call."
            }
            ErrorCode::TabNotFound => {
                "The target tab no longer exists; retry without a tabId to get a fresh one."
            }
            ErrorCode::StaleSnapshot => "Take a new page_snapshot before acting again.",
            ErrorCode::NavigationTimeout => {
                "The page did not finish loading in time; consider retrying or checking the URL."
            }
            ErrorCode::NoActiveTab => "No tab could be resolved; call new_tab first.",
            ErrorCode::UnknownMethod => "Internal error: unsupported bridge method.",
            ErrorCode::HandlerError => "The browser worker raised an unexpected error.",
            ErrorCode::ContentScriptError => {
                "The in-page script failed to run; the tab may have navigated away."
            }
            ErrorCode::ScreenshotFailed => {
                "The browser refused to capture a screenshot of this page."
            }
        }
    }

    /// Whether a `request()` failing with this code should be retried
    /// transparently. Per §4.9 / §7, payload-carried error responses are
    /// never retried — only transport-level exceptions are, and those
    /// never reach this type (they are plain I/O errors). This exists so
    /// callers have one place to assert the invariant in tests.
    pub fn is_retryable(self) -> bool {
        false
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ConnectionLost => "CONNECTION_LOST",
            ErrorCode::TabNotFound => "TAB_NOT_FOUND",
            ErrorCode::StaleSnapshot => "STALE_SNAPSHOT",
            ErrorCode::NavigationTimeout => "NAVIGATION_TIMEOUT",
            ErrorCode::NoActiveTab => "NO_ACTIVE_TAB",
            ErrorCode::UnknownMethod => "UNKNOWN_METHOD",
            ErrorCode::HandlerError => "HANDLER_ERROR",
            ErrorCode::ContentScriptError => "CONTENT_SCRIPT_ERROR",
            ErrorCode::ScreenshotFailed => "SCREENSHOT_FAILED",
        };
        write!(f, "{s}")
    }
}

/// Error payload shape carried on a bridge `error` message (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct BridgeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl BridgeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Text appended to the MCP-facing error response: message + hint.
    pub fn to_agent_text(&self) -> String {
        format!("{}\n\n{}", self.message, self.code.recovery_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_errors_are_never_retryable() {
        for code in [
            ErrorCode::ConnectionLost,
            ErrorCode::TabNotFound,
            ErrorCode::StaleSnapshot,
            ErrorCode::NavigationTimeout,
            ErrorCode::NoActiveTab,
            ErrorCode::UnknownMethod,
            ErrorCode::HandlerError,
            ErrorCode::ContentScriptError,
            ErrorCode::ScreenshotFailed,
        ] {
            assert!(!code.is_retryable());
        }
    }

    #[test]
    fn display_matches_wire_code() {
        assert_eq!(ErrorCode::TabNotFound.to_string(), "TAB_NOT_FOUND");
    }

    #[test]
    fn agent_text_includes_hint() {
        let err = BridgeError::new(ErrorCode::StaleSnapshot, "ref @e3 not found");
        let text = err.to_agent_text();
        assert!(text.contains("ref @e3 not found"));
        assert!(text.contains("new page_snapshot"));
    }
}
