//! click(ref) — §4.3. Grounded on the teacher's `interaction/click.rs`
//! `hybrid_click`: dispatch the full pointer/mouse sequence for elements
//! that behave like real pointer targets, fall back to `.click()` for
//! elements (buttons, `<summary>`) whose native activation semantics a
//! synthetic pointer sequence wouldn't reliably trigger.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;

use super::{resolve_ref_prelude, ActionResult, DISABLED_CHECK_JS, SCROLL_INTO_VIEW_JS};

pub async fn click(page: &Page, ref_: &str) -> Result<ActionResult> {
    let ref_js = serde_json::to_string(ref_).unwrap();
    let prelude = resolve_ref_prelude(&ref_js);
    let script = format!(
        r#"(() => {{
    {prelude}
    {DISABLED_CHECK_JS}
    {SCROLL_INTO_VIEW_JS}

    const tag = el.tagName.toLowerCase();
    const rect = el.getBoundingClientRect();
    const cx = rect.left + rect.width / 2;
    const cy = rect.top + rect.height / 2;

    if (tag === 'button' || tag === 'summary' || (tag === 'input' && ['submit','reset','button','checkbox','radio'].includes((el.getAttribute('type')||'').toLowerCase()))) {{
        el.click();
        return {{ success: true }};
    }}

    const opts = {{ bubbles: true, cancelable: true, clientX: cx, clientY: cy, view: window }};
    el.dispatchEvent(new PointerEvent('pointerdown', opts));
    el.dispatchEvent(new MouseEvent('mousedown', opts));
    el.dispatchEvent(new PointerEvent('pointerup', opts));
    el.dispatchEvent(new MouseEvent('mouseup', opts));
    el.dispatchEvent(new MouseEvent('click', opts));
    return {{ success: true }};
}})()"#
    );

    let result: ActionResult = page
        .evaluate(script)
        .await
        .context("failed to evaluate click script")?
        .into_value()
        .context("failed to parse click result")?;
    Ok(result)
}
