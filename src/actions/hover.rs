//! hover(ref) — §4.3: dispatch mouseover/mouseenter/mousemove at the
//! element's center. New module; follows the teacher's event-dispatch
//! idiom from `interaction/click.rs`.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;

use super::{resolve_ref_prelude, ActionResult, DISABLED_CHECK_JS, SCROLL_INTO_VIEW_JS};

pub async fn hover(page: &Page, ref_: &str) -> Result<ActionResult> {
    let ref_js = serde_json::to_string(ref_).unwrap();
    let prelude = resolve_ref_prelude(&ref_js);
    let script = format!(
        r#"(() => {{
    {prelude}
    {DISABLED_CHECK_JS}
    {SCROLL_INTO_VIEW_JS}

    const rect = el.getBoundingClientRect();
    const cx = rect.left + rect.width / 2;
    const cy = rect.top + rect.height / 2;
    const opts = {{ bubbles: true, cancelable: true, clientX: cx, clientY: cy, view: window }};
    el.dispatchEvent(new MouseEvent('mouseover', opts));
    el.dispatchEvent(new MouseEvent('mouseenter', {{ ...opts, bubbles: false }}));
    el.dispatchEvent(new MouseEvent('mousemove', opts));
    return {{ success: true }};
}})()"#
    );

    let result: ActionResult = page
        .evaluate(script)
        .await
        .context("failed to evaluate hover script")?
        .into_value()
        .context("failed to parse hover result")?;
    Ok(result)
}
