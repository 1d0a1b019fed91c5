//! dropFiles(ref, files[]) — §4.3. New module (no teacher counterpart):
//! constructs a `File` per entry and a `DataTransfer`, then either assigns
//! it directly to a file `<input>` or dispatches a drag-and-drop sequence,
//! the standard technique for scripting file uploads in a browser. JS
//! templating follows the teacher's `format!`-built-script idiom.

use anyhow::{Context, Result};
use chromiumoxide::page::Page;
use serde::{Deserialize, Serialize};

use super::{resolve_ref_prelude, ActionResult, DISABLED_CHECK_JS, SCROLL_INTO_VIEW_JS};

/// One file payload to drop (§6 `drop_files` tool contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropFile {
    pub name: String,
    pub mime_type: String,
    /// Base64-encoded file contents. `filePath` (reading from disk) is a
    /// host-side convenience alternate input; by the time it reaches this
    /// executor it has already been read and re-encoded as `base64_data`.
    pub base64_data: String,
}

pub async fn drop_files(page: &Page, ref_: &str, files: &[DropFile]) -> Result<ActionResult> {
    let ref_js = serde_json::to_string(ref_).unwrap();
    let files_js = serde_json::to_string(files).unwrap();
    let prelude = resolve_ref_prelude(&ref_js);
    let script = format!(
        r#"(() => {{
    {prelude}
    {DISABLED_CHECK_JS}
    {SCROLL_INTO_VIEW_JS}

    const specs = {files_js};
    const dt = new DataTransfer();
    for (const spec of specs) {{
        const binary = atob(spec.base64_data);
        const bytes = new Uint8Array(binary.length);
        for (let i = 0; i < binary.length; i++) bytes[i] = binary.charCodeAt(i);
        const file = new File([bytes], spec.name, {{ type: spec.mime_type }});
        dt.items.add(file);
    }}

    const tag = el.tagName.toLowerCase();
    if (tag === 'input' && (el.getAttribute('type') || '').toLowerCase() === 'file') {{
        el.files = dt.files;
        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
        return {{ success: true }};
    }}

    const rect = el.getBoundingClientRect();
    const cx = rect.left + rect.width / 2;
    const cy = rect.top + rect.height / 2;
    const opts = {{ bubbles: true, cancelable: true, clientX: cx, clientY: cy, dataTransfer: dt }};
    el.dispatchEvent(new DragEvent('dragenter', opts));
    el.dispatchEvent(new DragEvent('dragover', opts));
    el.dispatchEvent(new DragEvent('drop', opts));
    return {{ success: true }};
}})()"#
    );

    let result: ActionResult = page
        .evaluate(script)
        .await
        .context("failed to evaluate dropFiles script")?
        .into_value()
        .context("failed to parse dropFiles result")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_file_serializes_with_base64_field() {
        let f = DropFile {
            name: "a.txt".into(),
            mime_type: "text/plain".into(),
            base64_data: "aGVsbG8=".into(),
        };
        let json = serde_json::to_string(&f).unwrap();
        assert!(json.contains("base64_data"));
        assert!(json.contains("aGVsbG8="));
    }
}
