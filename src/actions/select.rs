//! selectOption(ref, value) — §4.3. New module (no teacher counterpart);
//! matches the teacher's `ActionResult`/JS-templating idiom from
//! `interaction/click.rs` applied to `<select>` semantics.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;

use super::{resolve_ref_prelude, ActionResult};

pub async fn select_option(page: &Page, ref_: &str, value: &str) -> Result<ActionResult> {
    let ref_js = serde_json::to_string(ref_).unwrap();
    let value_js = serde_json::to_string(value).unwrap();
    let prelude = resolve_ref_prelude(&ref_js);
    let script = format!(
        r#"(() => {{
    {prelude}

    if (el.tagName.toLowerCase() !== 'select') {{
        return {{ success: false, error: 'Element is not a select.' }};
    }}
    if (el.disabled) {{
        return {{ success: false, error: 'Element is disabled.' }};
    }}

    const wanted = {value_js};
    let match_ = null;
    for (const opt of el.options) {{
        if (opt.value === wanted || opt.textContent.trim() === wanted.trim()) {{
            match_ = opt;
            break;
        }}
    }}
    if (!match_) {{
        return {{ success: false, error: `Option "${{wanted}}" not found.` }};
    }}

    let ineligible = match_.disabled;
    const group = match_.closest('optgroup');
    if (group && group.disabled) ineligible = true;
    if (ineligible) {{
        return {{ success: false, error: `Option "${{wanted}}" is disabled.` }};
    }}

    if (el.multiple) {{
        match_.selected = true; // additive: does not clear prior selections
    }} else {{
        el.value = match_.value;
    }}
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return {{ success: true }};
}})()"#
    );

    let result: ActionResult = page
        .evaluate(script)
        .await
        .context("failed to evaluate selectOption script")?
        .into_value()
        .context("failed to parse selectOption result")?;
    Ok(result)
}
