//! Tool discovery (§4.5): native `navigator.modelContext` first, else
//! synthesize from `<form>`/`<button>`/`<a href>`/standalone labeled
//! `<input>`.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;

use super::WebMcpTool;

const DISCOVERY_SCRIPT: &str = r#"(() => {
    function textOf(el) {
        return (el.textContent || '').trim().replace(/\s+/g, ' ');
    }

    if (navigator.modelContext && typeof navigator.modelContext.getTools === 'function') {
        const tools = navigator.modelContext.getTools();
        return tools.map(t => ({
            name: t.name,
            description: t.description || '',
            input_schema: t.inputSchema || { type: 'object', properties: {} },
            source: 'webmcp-native',
            element_ref: null
        }));
    }

    const tools = [];

    document.querySelectorAll('form').forEach((form, i) => {
        const properties = {};
        const required = [];
        form.querySelectorAll('input[name], select[name], textarea[name]').forEach(field => {
            properties[field.name] = { type: 'string' };
            if (field.required) required.push(field.name);
        });
        tools.push({
            name: form.getAttribute('name') || form.id || `form_${i}`,
            description: `Submit the "${form.getAttribute('name') || form.id || i}" form`,
            input_schema: { type: 'object', properties, required },
            source: 'synthesized-form',
            element_ref: null
        });
    });

    let buttonIdx = 0;
    document.querySelectorAll('button:not(form button)').forEach(btn => {
        tools.push({
            name: `button_${buttonIdx++}`,
            description: `Click the button labeled "${textOf(btn)}"`,
            input_schema: { type: 'object', properties: {} },
            source: 'synthesized-button',
            element_ref: null
        });
    });

    let linkIdx = 0;
    document.querySelectorAll('a[href]').forEach(a => {
        tools.push({
            name: `link_${linkIdx++}`,
            description: `Follow the link labeled "${textOf(a)}" to ${a.getAttribute('href')}`,
            input_schema: { type: 'object', properties: {} },
            source: 'synthesized-link',
            element_ref: null
        });
    });

    let inputIdx = 0;
    document.querySelectorAll('input:not(form input)').forEach(input => {
        const label = input.labels && input.labels.length ? textOf(input.labels[0]) : (input.getAttribute('placeholder') || '');
        tools.push({
            name: `input_${inputIdx++}`,
            description: `Set the value of the "${label}" field`,
            input_schema: { type: 'object', properties: { value: { type: 'string' } }, required: ['value'] },
            source: 'synthesized-input',
            element_ref: null
        });
    });

    return tools;
})()"#;

pub async fn discover(page: &Page) -> Result<Vec<WebMcpTool>> {
    let tools: Vec<WebMcpTool> = page
        .evaluate(DISCOVERY_SCRIPT)
        .await
        .context("failed to evaluate WebMCP discovery script")?
        .into_value()
        .context("failed to parse WebMCP discovery result")?;
    Ok(tools)
}
