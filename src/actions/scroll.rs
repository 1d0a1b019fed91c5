//! scrollPage(direction?, amount?, ref?) — §4.3. Grounded on the teacher's
//! `interaction/scroll.rs`: `scrollIntoView` for an element target, else
//! `window.scrollBy` for a directional page scroll.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;

use super::{resolve_ref_prelude, ActionResult};

pub async fn scroll_page(
    page: &Page,
    ref_: Option<&str>,
    direction: &str,
    amount: i64,
) -> Result<ActionResult> {
    let script = if let Some(r) = ref_ {
        let ref_js = serde_json::to_string(r).unwrap();
        let prelude = resolve_ref_prelude(&ref_js);
        format!(
            r#"(() => {{
    {prelude}
    el.scrollIntoView({{ block: 'center', behavior: 'smooth' }});
    return {{ success: true }};
}})()"#
        )
    } else {
        let signed_amount = if direction == "up" { -amount } else { amount };
        format!(
            r#"(() => {{
    window.scrollBy({{ top: {signed_amount}, left: 0, behavior: 'smooth' }});
    return {{ success: true }};
}})()"#
        )
    };

    let result: ActionResult = page
        .evaluate(script)
        .await
        .context("failed to evaluate scrollPage script")?
        .into_value()
        .context("failed to parse scrollPage result")?;
    Ok(result)
}
