//! typeText(ref, text, clearFirst) — §4.3. Grounded on the teacher's
//! `interaction/keyboard.rs`: set the value through the native property
//! setter (so frameworks that hook the setter observe the change), then
//! dispatch `input`/`change`, with a `contenteditable` branch using
//! `execCommand('insertText', ...)`.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;

use super::{resolve_ref_prelude, ActionResult, DISABLED_CHECK_JS, SCROLL_INTO_VIEW_JS};

pub async fn type_text(page: &Page, ref_: &str, text: &str, clear_first: bool) -> Result<ActionResult> {
    let ref_js = serde_json::to_string(ref_).unwrap();
    let text_js = serde_json::to_string(text).unwrap();
    let prelude = resolve_ref_prelude(&ref_js);
    let script = format!(
        r#"(() => {{
    {prelude}
    {DISABLED_CHECK_JS}
    {SCROLL_INTO_VIEW_JS}

    const tag = el.tagName.toLowerCase();
    const text = {text_js};
    const clearFirst = {clear_first};

    const isTextInput = (tag === 'textarea')
        || (tag === 'input' && !['checkbox','radio','button','submit','reset','file','hidden','image'].includes((el.getAttribute('type')||'text').toLowerCase()))
        || el.isContentEditable;

    if (!isTextInput) {{
        return {{ success: false, error: 'Element is not a text input.' }};
    }}

    el.focus();

    if (el.isContentEditable) {{
        if (clearFirst) document.execCommand('selectAll', false, null);
        document.execCommand('insertText', false, text);
        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
        return {{ success: true }};
    }}

    const proto = tag === 'textarea' ? window.HTMLTextAreaElement.prototype : window.HTMLInputElement.prototype;
    const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
    const newValue = clearFirst ? text : (el.value || '') + text;
    setter.call(el, newValue);
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return {{ success: true }};
}})()"#,
        clear_first = clear_first,
    );

    let result: ActionResult = page
        .evaluate(script)
        .await
        .context("failed to evaluate typeText script")?
        .into_value()
        .context("failed to parse typeText result")?;
    Ok(result)
}
