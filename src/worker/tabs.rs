//! newTab / listTabs / switchTab / closeTab (§4.4, §6). Adapted from the
//! teacher's `tools/page.rs`, addressing tabs by their CDP target id
//! (`Page::target_id`) rather than inventing a parallel id scheme.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;
use serde::Serialize;

use crate::browser::session::BrowserSession;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub tab_id: String,
    pub url: String,
    pub title: String,
}

pub async fn new_tab(session: &BrowserSession, url: Option<&str>) -> Result<TabInfo> {
    let page = session.new_page(url.unwrap_or("about:blank")).await?;
    tab_info(&page).await
}

pub async fn tab_info(page: &Page) -> Result<TabInfo> {
    Ok(TabInfo {
        tab_id: page.target_id().to_string(),
        url: page.url().await?.unwrap_or_default(),
        title: page.get_title().await?.unwrap_or_default(),
    })
}

pub async fn list_tabs(session: &BrowserSession) -> Result<Vec<TabInfo>> {
    let pool = session.pool.lock().await;
    let mut out = Vec::with_capacity(pool.page_count());
    for page in pool.list_pages() {
        out.push(tab_info(page).await.context("failed to read tab info")?);
    }
    Ok(out)
}

/// Looks up a tab by its target id without mutating the active selection.
pub async fn find_tab(session: &BrowserSession, tab_id: &str) -> Option<Page> {
    let pool = session.pool.lock().await;
    pool.list_pages()
        .iter()
        .find(|p| p.target_id().as_ref() == tab_id)
        .cloned()
}

pub async fn switch_tab(session: &BrowserSession, tab_id: &str) -> Result<Option<TabInfo>> {
    let mut pool = session.pool.lock().await;
    match pool.select_by_target_id(tab_id) {
        Some(page) => {
            let page = page.clone();
            drop(pool);
            Ok(Some(tab_info(&page).await?))
        }
        None => Ok(None),
    }
}

pub async fn close_tab(session: &BrowserSession, tab_id: &str) -> Result<bool> {
    if let Some(page) = find_tab(session, tab_id).await {
        let _ = page.close().await;
    }
    let mut pool = session.pool.lock().await;
    Ok(pool.remove_page(tab_id))
}
