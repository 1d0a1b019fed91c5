//! Invokes a previously discovered tool (§4.5): calls the page-declared
//! function for native tools, or fills and submits the corresponding
//! synthesized form/button/link/input.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;

pub async fn invoke(page: &Page, tool_name: &str, args: &serde_json::Value) -> Result<serde_json::Value> {
    let name_js = serde_json::to_string(tool_name).unwrap();
    let args_js = serde_json::to_string(args).unwrap();
    let script = format!(
        r#"(async () => {{
    const name = {name_js};
    const args = {args_js};

    if (navigator.modelContext && typeof navigator.modelContext.callTool === 'function') {{
        return await navigator.modelContext.callTool(name, args);
    }}

    const formMatch = name.match(/^form_(\d+)$/);
    if (formMatch) {{
        const form = document.querySelectorAll('form')[Number(formMatch[1])];
        if (!form) return {{ error: 'form not found' }};
        for (const [key, value] of Object.entries(args)) {{
            const field = form.elements.namedItem(key);
            if (field) field.value = value;
        }}
        form.requestSubmit ? form.requestSubmit() : form.submit();
        return {{ submitted: true }};
    }}

    const buttonMatch = name.match(/^button_(\d+)$/);
    if (buttonMatch) {{
        const btn = document.querySelectorAll('button:not(form button)')[Number(buttonMatch[1])];
        if (!btn) return {{ error: 'button not found' }};
        btn.click();
        return {{ clicked: true }};
    }}

    const linkMatch = name.match(/^link_(\d+)$/);
    if (linkMatch) {{
        const a = document.querySelectorAll('a[href]')[Number(linkMatch[1])];
        if (!a) return {{ error: 'link not found' }};
        a.click();
        return {{ clicked: true }};
    }}

    const inputMatch = name.match(/^input_(\d+)$/);
    if (inputMatch) {{
        const input = document.querySelectorAll('input:not(form input)')[Number(inputMatch[1])];
        if (!input) return {{ error: 'input not found' }};
        input.value = args.value ?? '';
        input.dispatchEvent(new Event('input', {{ bubbles: true }}));
        input.dispatchEvent(new Event('change', {{ bubbles: true }}));
        return {{ set: true }};
    }}

    return {{ error: `unknown WebMCP tool "${{name}}"` }};
}})()"#
    );

    let result: serde_json::Value = page
        .evaluate(script)
        .await
        .context("failed to evaluate WebMCP invoke script")?
        .into_value()
        .context("failed to parse WebMCP invoke result")?;
    Ok(result)
}
