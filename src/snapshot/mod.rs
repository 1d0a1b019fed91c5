//! The accessibility snapshot engine (C2, §4.2).
//!
//! Supersedes the teacher's `tools::snapshot` (a whitelist-of-tags
//! `TreeWalker` emitting numeric indices) with the full role/name/
//! visibility/token-budget algorithm the spec requires, addressed by
//! opaque `@eN` refs instead of positional indices.

pub mod js;
pub mod refs;

use anyhow::{Context, Result};
use chromiumoxide::page::Page;
use serde::Deserialize;

/// One node of the compact accessibility tree (§3).
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotNode {
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "ref", default)]
    pub ref_: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: Option<serde_json::Value>,
    #[serde(default)]
    pub selected: Option<bool>,
    #[serde(default)]
    pub disabled: Option<bool>,
    #[serde(default)]
    pub expanded: Option<bool>,
    #[serde(default)]
    pub pressed: Option<bool>,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

/// An immutable view of one tab at one instant (§3). Dropping the last
/// `Snapshot` for a tab is how the worker signals that its refs are no
/// longer addressable.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub snapshot_id: String,
    pub url: String,
    pub title: String,
    pub root: SnapshotNode,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Token budget; default 4000 per §4.2.
    pub max_tokens: usize,
    pub focus_region: Option<String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            snapshot_id: String::new(),
            url: String::new(),
            title: String::new(),
            root: SnapshotNode {
                role: "generic".into(),
                name: None,
                ref_: None,
                value: None,
                checked: None,
                selected: None,
                disabled: None,
                expanded: None,
                pressed: None,
                children: vec![],
            },
        }
    }
}

impl SnapshotOptions {
    pub fn with_max_tokens(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            focus_region: None,
        }
    }
}

const DEFAULT_MAX_TOKENS: usize = 4000;

/// Captures a fresh snapshot of `page`, atomically replacing the worker's
/// in-page ref map (§3 invariant: a new snapshot invalidates every ref
/// issued by the previous one).
pub async fn capture(page: &Page, options: &SnapshotOptions) -> Result<Snapshot> {
    let script = js::build_snapshot_script(options.focus_region.as_deref());
    let result: serde_json::Value = page
        .evaluate(script)
        .await
        .context("failed to evaluate snapshot script")?
        .into_value()
        .context("failed to parse snapshot result")?;

    let snapshot_id = result["snapshotId"]
        .as_str()
        .context("snapshot result missing snapshotId")?
        .to_string();
    let url = result["url"].as_str().unwrap_or_default().to_string();
    let title = result["title"].as_str().unwrap_or_default().to_string();
    let root: SnapshotNode =
        serde_json::from_value(result["root"].clone()).context("failed to parse snapshot tree")?;

    Ok(Snapshot {
        snapshot_id,
        url,
        title,
        root,
    })
}

/// Renders the snapshot to the compact text format (§3, §6) bounded by
/// `max_tokens` (default 4000), estimating tokens as `ceil(chars/4)`.
pub fn format_snapshot(snapshot: &Snapshot, max_tokens: Option<usize>) -> String {
    let budget = max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
    let mut lines = render_lines(&snapshot.root, 0);
    prune_to_budget(&mut lines, budget);
    lines
        .into_iter()
        .map(|l| l.text)
        .collect::<Vec<_>>()
        .join("\n")
}

struct RenderedLine {
    text: String,
    depth: usize,
    has_ref: bool,
}

fn render_lines(node: &SnapshotNode, depth: usize) -> Vec<RenderedLine> {
    let mut out = Vec::new();
    let indent = "  ".repeat(depth);
    let mut line = String::new();
    line.push_str(&indent);
    line.push('[');
    if let Some(r) = &node.ref_ {
        line.push_str(r);
        line.push(' ');
    }
    line.push_str(&node.role);
    if let Some(name) = &node.name {
        if !name.is_empty() {
            line.push_str(&format!(" \"{name}\""));
        }
    }
    line.push(']');

    if let Some(value) = &node.value {
        if !value.is_empty() {
            line.push_str(&format!(" {value}"));
        }
    }

    if let Some(checked) = &node.checked {
        match checked {
            serde_json::Value::Bool(true) => line.push_str(" (checked)"),
            serde_json::Value::Bool(false) => line.push_str(" (unchecked)"),
            serde_json::Value::String(s) if s == "mixed" => line.push_str(" (mixed)"),
            _ => {}
        }
    }
    if node.disabled == Some(true) {
        line.push_str(" (disabled)");
    }
    if let Some(pressed) = node.pressed {
        line.push_str(if pressed { " (pressed)" } else { " (unpressed)" });
    }

    out.push(RenderedLine {
        text: line,
        depth,
        has_ref: node.ref_.is_some(),
    });

    for child in &node.children {
        out.extend(render_lines(child, depth + 1));
    }
    out
}

fn estimate_tokens(lines: &[RenderedLine]) -> usize {
    let chars: usize = lines.iter().map(|l| l.text.chars().count() + 1).sum();
    chars.div_ceil(4)
}

/// Prunes deepest non-ref-bearing leaves first, per §4.2's "prune deepest
/// leaves first, then non-interactive siblings, preserving all interactive
/// refs' first occurrence".
fn prune_to_budget(lines: &mut Vec<RenderedLine>, budget: usize) {
    if budget == 0 {
        return;
    }
    while estimate_tokens(lines) > budget {
        let Some(victim) = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.has_ref)
            .max_by_key(|(_, l)| l.depth)
            .map(|(i, _)| i)
        else {
            break; // nothing left to prune; keep every interactive ref
        };
        lines.remove(victim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(role: &str, name: Option<&str>, ref_: Option<&str>, children: Vec<SnapshotNode>) -> SnapshotNode {
        SnapshotNode {
            role: role.to_string(),
            name: name.map(str::to_string),
            ref_: ref_.map(str::to_string),
            value: None,
            checked: None,
            selected: None,
            disabled: None,
            expanded: None,
            pressed: None,
            children,
        }
    }

    #[test]
    fn renders_ref_role_and_name() {
        let snap = Snapshot {
            snapshot_id: "s1".into(),
            url: "https://x".into(),
            title: "t".into(),
            root: node("generic", None, None, vec![node("button", Some("Bold"), Some("@e1"), vec![])]),
        };
        let text = format_snapshot(&snap, None);
        assert!(text.contains("[@e1 button \"Bold\"]"));
    }

    #[test]
    fn disabled_and_pressed_tags_render() {
        let mut btn = node("button", Some("Save"), Some("@e2"), vec![]);
        btn.disabled = Some(true);
        btn.pressed = Some(false);
        let snap = Snapshot {
            snapshot_id: "s1".into(),
            url: String::new(),
            title: String::new(),
            root: btn,
        };
        let text = format_snapshot(&snap, None);
        assert!(text.contains("(disabled)"));
        assert!(text.contains("(unpressed)"));
    }

    #[test]
    fn pruning_never_drops_ref_bearing_lines() {
        let mut children = vec![];
        for i in 0..200 {
            children.push(node(
                "paragraph",
                Some(&"filler text ".repeat(20)),
                None,
                vec![],
            ));
            if i == 150 {
                children.push(node("button", Some("Submit"), Some("@e1"), vec![]));
            }
        }
        let snap = Snapshot {
            snapshot_id: "s1".into(),
            url: String::new(),
            title: String::new(),
            root: node("generic", None, None, children),
        };
        let text = format_snapshot(&snap, Some(50));
        assert!(text.contains("@e1"));
    }
}
