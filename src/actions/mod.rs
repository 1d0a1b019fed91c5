//! The action executor (C3, §4.3): resolves `@eN` refs against the
//! worker's current in-page ref map and performs the six action kinds with
//! the uniform precondition chain the spec requires.
//!
//! JS templating and event-dispatch idioms are carried over from the
//! teacher's `interaction/click.rs`, `interaction/keyboard.rs`, and
//! `interaction/scroll.rs`; `select` and `drop_files` are new (no teacher
//! counterpart).

pub mod click;
pub mod dropfiles;
pub mod hover;
pub mod keyboard;
pub mod scroll;
pub mod select;

use serde::{Deserialize, Serialize};

/// Result of any action-executor call (§4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Emits the JS snippet every ref-bearing action prefixes its script with:
/// looks `ref` up in `window.__remixRefMap`, confirms it is still attached
/// to the document, and returns early with a not-found marker otherwise
/// (§4.3 steps 2-3). Bound as the JS local `el`.
///
/// Callers interpolate `ref_js` (a JSON-encoded ref string) and then
/// continue the script assuming `el` is a live, attached `Element`.
pub fn resolve_ref_prelude(ref_js: &str) -> String {
    format!(
        r#"
    const __ref = {ref_js};
    const el = window.__remixRefMap && window.__remixRefMap.get(__ref);
    if (!el || !document.contains(el)) {{
        return {{ success: false, error: `Element ${{__ref}} not found, call page_snapshot again.` }};
    }}
    "#
    )
}

/// JS snippet checking the disabled precondition (§4.3 step 4). Assumes
/// `el` is bound by `resolve_ref_prelude`.
pub const DISABLED_CHECK_JS: &str = r#"
    {
        let disabled = false;
        if ('disabled' in el && el.disabled) disabled = true;
        const aria = el.getAttribute && el.getAttribute('aria-disabled');
        if (aria && aria.toLowerCase() === 'true') disabled = true;
        let p = el.parentElement;
        while (p) {
            if (p.tagName && p.tagName.toLowerCase() === 'optgroup' && p.disabled) disabled = true;
            if (p.tagName && p.tagName.toLowerCase() === 'fieldset' && p.disabled) disabled = true;
            p = p.parentElement;
        }
        if (disabled) {
            return { success: false, error: 'Element is disabled.' };
        }
    }
"#;

/// JS snippet scrolling `el` into view before any event dispatch (§4.3
/// step 5).
pub const SCROLL_INTO_VIEW_JS: &str = r#"
    el.scrollIntoView({ block: 'center', inline: 'center' });
"#;

/// Validates the snapshotId precondition (§4.3 step 1) before any bridge
/// round trip to the browser — this is pure Rust state comparison, not a
/// page evaluation, since the worker already knows its current snapshot.
pub fn check_snapshot_current(current: &str, requested: &str) -> Result<(), ActionResult> {
    if current != requested {
        return Err(ActionResult::fail(
            "Snapshot is stale; call page_snapshot again before acting.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_snapshot_is_rejected_before_any_js_runs() {
        let err = check_snapshot_current("snap-1", "snap-0").unwrap_err();
        assert!(!err.success);
        assert!(err.error.unwrap().contains("stale"));
    }

    #[test]
    fn matching_snapshot_passes() {
        assert!(check_snapshot_current("snap-1", "snap-1").is_ok());
    }

    #[test]
    fn action_result_ok_has_no_error() {
        let r = ActionResult::ok();
        assert!(r.success);
        assert!(r.error.is_none());
    }
}
