//! navigate / goBack / goForward / reload / waitForNavigation (§4.4).
//! Adapted from the teacher's `tools/navigation.rs`: the `goto`/settle-sleep
//! shape is unchanged; a wall-clock deadline is added so a page that never
//! fires `DOMContentLoaded` surfaces `NAVIGATION_TIMEOUT` (§4.1) instead of
//! hanging the bridge request indefinitely.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;
use serde::Serialize;
use std::time::Duration;

use crate::bridge::ErrorCode;

#[derive(Debug, Serialize)]
pub struct NavResult {
    pub url: String,
    pub title: String,
}

/// Default per-navigation deadline (§4.9: navigate/goBack/goForward/
/// reload/waitForNavigation = 30000ms).
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_millis(30_000);

async fn settle(wait_until: Option<&str>) {
    let ms = match wait_until {
        Some("networkidle") => 300,
        _ => 50,
    };
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

async fn snapshot_url_title(page: &Page) -> Result<NavResult> {
    let url = page.url().await?.unwrap_or_default();
    let title = page.get_title().await?.unwrap_or_default();
    Ok(NavResult { url, title })
}

pub async fn navigate(page: &Page, url: &str, wait_until: Option<&str>) -> Result<NavResult, ErrorCode> {
    let fut = async {
        page.goto(url)
            .await
            .with_context(|| format!("failed to navigate to {url}"))?;
        settle(wait_until).await;
        snapshot_url_title(page).await
    };
    match tokio::time::timeout(NAVIGATION_TIMEOUT, fut).await {
        Ok(Ok(r)) => Ok(r),
        Ok(Err(_)) => Err(ErrorCode::NavigationTimeout),
        Err(_) => Err(ErrorCode::NavigationTimeout),
    }
}

pub async fn go_back(page: &Page) -> Result<NavResult, ErrorCode> {
    let fut = async {
        page.evaluate("window.history.back()")
            .await
            .context("failed to go back")?;
        tokio::time::sleep(Duration::from_millis(100)).await;
        snapshot_url_title(page).await
    };
    tokio::time::timeout(NAVIGATION_TIMEOUT, fut)
        .await
        .map_err(|_| ErrorCode::NavigationTimeout)?
        .map_err(|_: anyhow::Error| ErrorCode::NavigationTimeout)
}

pub async fn go_forward(page: &Page) -> Result<NavResult, ErrorCode> {
    let fut = async {
        page.evaluate("window.history.forward()")
            .await
            .context("failed to go forward")?;
        tokio::time::sleep(Duration::from_millis(100)).await;
        snapshot_url_title(page).await
    };
    tokio::time::timeout(NAVIGATION_TIMEOUT, fut)
        .await
        .map_err(|_| ErrorCode::NavigationTimeout)?
        .map_err(|_: anyhow::Error| ErrorCode::NavigationTimeout)
}

pub async fn reload(page: &Page, bypass_cache: bool) -> Result<NavResult, ErrorCode> {
    let fut = async {
        if bypass_cache {
            page.evaluate("location.reload(true)")
                .await
                .context("failed to reload")?;
        } else {
            page.reload().await.context("failed to reload")?;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        snapshot_url_title(page).await
    };
    tokio::time::timeout(NAVIGATION_TIMEOUT, fut)
        .await
        .map_err(|_| ErrorCode::NavigationTimeout)?
        .map_err(|_: anyhow::Error| ErrorCode::NavigationTimeout)
}

/// waitForNavigation: polls `document.readyState` until `complete` or the
/// caller-supplied timeout elapses.
pub async fn wait_for_navigation(page: &Page, timeout_ms: u64) -> Result<NavResult, ErrorCode> {
    let deadline = Duration::from_millis(timeout_ms);
    let fut = async {
        loop {
            let state: serde_json::Value = page
                .evaluate("document.readyState")
                .await
                .context("failed to read readyState")?
                .into_value()
                .context("failed to parse readyState")?;
            if state.as_str() == Some("complete") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        snapshot_url_title(page).await
    };
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| ErrorCode::NavigationTimeout)?
        .map_err(|_: anyhow::Error| ErrorCode::NavigationTimeout)
}
