//! Retry and error policy (C9, §4.9, §7).
//!
//! Only transport-level exceptions (the client vanished mid-send, or no
//! response arrived within the operation's deadline because the socket
//! dropped) are retried. A bridge `error` response is terminal and is
//! returned to the caller verbatim — this module never sees those, since
//! `ConnectionManager::request` already separates the two outcomes.

use std::time::Duration;

use crate::bridge::Method;

pub const MAX_RETRY_ATTEMPTS: u32 = 2;
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Per-operation timeout (§4.9).
pub fn timeout_for(method: Method) -> Duration {
    let ms = match method {
        Method::Navigate
        | Method::NewTab
        | Method::GoBack
        | Method::GoForward
        | Method::Reload
        | Method::WaitForNavigation => 30_000,
        Method::Snapshot | Method::Screenshot => 15_000,
        Method::Click | Method::Hover | Method::TypeText | Method::SelectOption | Method::ScrollPage => 10_000,
        Method::InvokeWebMcpTool | Method::DropFiles => 30_000,
        Method::ListTabs | Method::SwitchTab | Method::CloseTab => 5_000,
        Method::ListWebMcpTools => 10_000,
        Method::Ping => 5_000,
    };
    Duration::from_millis(ms)
}

/// Backoff delay before retry attempt `attempt` (0-indexed): `500 * 2^attempt`.
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_table_matches_spec() {
        assert_eq!(timeout_for(Method::Navigate).as_millis(), 30_000);
        assert_eq!(timeout_for(Method::Snapshot).as_millis(), 15_000);
        assert_eq!(timeout_for(Method::Click).as_millis(), 10_000);
        assert_eq!(timeout_for(Method::DropFiles).as_millis(), 30_000);
        assert_eq!(timeout_for(Method::ListTabs).as_millis(), 5_000);
        assert_eq!(timeout_for(Method::ListWebMcpTools).as_millis(), 10_000);
        assert_eq!(timeout_for(Method::Ping).as_millis(), 5_000);
    }

    #[test]
    fn backoff_grows_exponentially_from_base() {
        assert_eq!(backoff_delay(0).as_millis(), 500);
        assert_eq!(backoff_delay(1).as_millis(), 1000);
        assert_eq!(backoff_delay(2).as_millis(), 2000);
    }
}
