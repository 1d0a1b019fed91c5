//! In-page JavaScript the snapshot engine evaluates through CDP
//! (`Page::evaluate`, following the teacher's `tools/snapshot.rs` /
//! `selectors/text.rs` idiom of building a JS source string with `format!`
//! and parsing the returned JSON).
//!
//! The script does the DOM-dependent work only: traversal, visibility,
//! interactivity, role/name resolution, and ref assignment. It returns a
//! plain JSON tree; token-budget pruning and text rendering (§4.2) happen
//! back in Rust where they're deterministic and unit-testable without a
//! browser.

/// Builds the snapshot-capture script. `focus_region`, when given, scopes
/// traversal to the first matching landmark (§4.2).
pub fn build_snapshot_script(focus_region: Option<&str>) -> String {
    let focus_region_js = match focus_region {
        Some(r) => serde_json::to_string(r).unwrap_or_else(|_| "null".to_string()),
        None => "null".to_string(),
    };

    format!(
        r#"(() => {{
    const FOCUS_REGION = {focus_region_js};

    const INTERACTIVE_TAGS = new Set(['a', 'button', 'select', 'textarea', 'summary']);
    const INTERACTIVE_ROLES = new Set([
        'button', 'link', 'checkbox', 'radio', 'switch', 'tab', 'menuitem',
        'option', 'combobox', 'slider', 'spinbutton', 'textbox', 'searchbox'
    ]);
    const LANDMARK_ROLES = {{
        nav: 'navigation', main: 'main', aside: 'complementary',
        footer: 'contentinfo', header: 'banner'
    }};
    const LANDMARK_ALIASES = {{
        sidebar: 'complementary', navigation: 'navigation', main: 'main',
        complementary: 'complementary', contentinfo: 'contentinfo', banner: 'banner'
    }};

    window.__remixRefMap = new Map();
    window.__remixSnapshotId = 'snap-' + Date.now() + '-' + Math.random().toString(36).slice(2);
    let nextRef = 1;

    function isDisplayNone(el) {{
        const style = getComputedStyle(el);
        return style.display === 'none';
    }}

    function isVisible(el) {{
        let node = el;
        let sawVisibleOverride = false;
        while (node && node.nodeType === 1) {{
            const style = getComputedStyle(node);
            if (style.display === 'none') return false;
            if (style.opacity === '0') return false;
            if (node === el && style.visibility === 'visible') sawVisibleOverride = true;
            if (style.visibility === 'hidden' && node !== el && !sawVisibleOverride) return false;
            if (style.visibility === 'hidden' && node === el) {{
                // own node hidden; only a visible descendant rescues children,
                // not the node itself
                return false;
            }}
            node = node.parentElement;
        }}
        return true;
    }}

    function inputRole(el) {{
        const type = (el.getAttribute('type') || 'text').toLowerCase();
        switch (type) {{
            case 'checkbox': return 'checkbox';
            case 'radio': return 'radio';
            case 'number': return 'spinbutton';
            case 'range': return 'slider';
            case 'image': return 'button';
            case 'hidden': return null;
            case 'button': case 'submit': case 'reset': return 'button';
            default: return 'textbox';
        }}
    }}

    function nativeRole(el) {{
        const tag = el.tagName.toLowerCase();
        if (tag === 'input') return inputRole(el);
        if (tag === 'button') return 'button';
        if (tag === 'a') return el.hasAttribute('href') ? 'link' : 'generic';
        if (tag === 'select') return el.multiple ? 'listbox' : 'combobox';
        if (tag === 'textarea') return 'textbox';
        if (tag === 'summary') return 'button';
        if (tag === 'fieldset') return 'group';
        if (tag === 'progress') return 'progressbar';
        if (tag === 'meter') return 'meter';
        if (tag === 'output') return 'status';
        if (/^h[1-6]$/.test(tag)) return 'heading';
        if (LANDMARK_ROLES[tag]) return LANDMARK_ROLES[tag];
        return null;
    }}

    function explicitRole(el) {{
        const r = el.getAttribute('role');
        if (!r) return null;
        const lower = r.toLowerCase();
        if (lower === 'presentation' || lower === 'none') return 'presentation';
        if (LANDMARK_ALIASES[lower]) return LANDMARK_ALIASES[lower];
        return lower;
    }}

    function roleOf(el) {{
        const explicit = explicitRole(el);
        if (explicit) return explicit;
        return nativeRole(el);
    }}

    function isInteractiveRole(role) {{
        return INTERACTIVE_ROLES.has(role);
    }}

    function isInteractive(el, role) {{
        const tag = el.tagName.toLowerCase();
        if (tag === 'input' && (el.getAttribute('type') || '').toLowerCase() === 'hidden') return false;
        if (INTERACTIVE_TAGS.has(tag) && role !== null) {{
            if (tag === 'a' && !el.hasAttribute('href')) return false;
            return true;
        }}
        if (tag === 'input') return true;
        if (el.isContentEditable) return true;
        if (role && isInteractiveRole(role)) return true;
        return false;
    }}

    function isDisabled(el) {{
        if (el.disabled) return true;
        const aria = el.getAttribute('aria-disabled');
        if (aria && aria.toLowerCase() === 'true') return true;
        let p = el.parentElement;
        while (p) {{
            if (p.tagName.toLowerCase() === 'optgroup' && p.disabled) return true;
            if (p.tagName.toLowerCase() === 'fieldset' && p.disabled) return true;
            p = p.parentElement;
        }}
        return false;
    }}

    function textOf(el) {{
        return (el.textContent || '').trim().replace(/\s+/g, ' ');
    }}

    function labelTextFor(el) {{
        if (el.labels && el.labels.length > 0) {{
            return textOf(el.labels[0]);
        }}
        if (el.id) {{
            const lbl = document.querySelector(`label[for="${{CSS.escape(el.id)}}"]`);
            if (lbl) return textOf(lbl);
        }}
        const parentLabel = el.closest('label');
        if (parentLabel) return textOf(parentLabel);
        return null;
    }}

    function accessibleName(el) {{
        const labelledby = el.getAttribute('aria-labelledby');
        if (labelledby) {{
            const ids = labelledby.split(/\s+/).filter(Boolean);
            const parts = ids.map(id => document.getElementById(id)).filter(Boolean).map(textOf).filter(Boolean);
            if (parts.length === ids.length && parts.length > 0) return parts.join(' ');
        }}
        const ariaLabel = el.getAttribute('aria-label');
        if (ariaLabel && ariaLabel.trim()) return ariaLabel.trim();

        const label = labelTextFor(el);
        if (label) return label;

        if (el.tagName.toLowerCase() === 'img') {{
            const alt = el.getAttribute('alt');
            if (alt !== null && alt.trim()) return alt.trim();
        }}
        const title = el.getAttribute('title');
        if (title && title.trim()) return title.trim();

        const placeholder = el.getAttribute('placeholder');
        if (placeholder && placeholder.trim()) return placeholder.trim();

        const text = textOf(el);
        return text || null;
    }}

    function valueAndState(el, role) {{
        const out = {{}};
        const tag = el.tagName.toLowerCase();
        if (role === 'textbox' || role === 'spinbutton' || role === 'slider' || role === 'searchbox') {{
            out.value = el.value !== undefined ? String(el.value) : null;
        }}
        if (el.isContentEditable) {{
            out.value = textOf(el);
        }}
        if (role === 'checkbox' || role === 'radio' || role === 'switch') {{
            if (el.indeterminate) {{
                out.checked = 'mixed';
            }} else if (typeof el.checked === 'boolean') {{
                out.checked = el.checked;
            }} else {{
                const ariaChecked = (el.getAttribute('aria-checked') || '').toLowerCase();
                out.checked = ariaChecked === 'mixed' ? 'mixed' : ariaChecked === 'true';
            }}
        }}
        if (tag === 'select') {{
            const selected = Array.from(el.selectedOptions || []).map(o => textOf(o));
            out.value = selected.join(', ');
        }}
        if (tag === 'progress') {{
            out.value = `${{el.value}}/${{el.max}}`;
        }}
        if (tag === 'meter') {{
            out.value = String(el.value);
        }}
        const pressed = el.getAttribute('aria-pressed');
        if (pressed !== null) out.pressed = pressed.toLowerCase() === 'true';
        const expanded = el.getAttribute('aria-expanded');
        if (expanded !== null) out.expanded = expanded.toLowerCase() === 'true';
        return out;
    }}

    function isSemanticContainer(role) {{
        return role === 'navigation' || role === 'main' || role === 'complementary'
            || role === 'contentinfo' || role === 'banner' || role === 'group'
            || role === 'status' || role === 'progressbar' || role === 'meter';
    }}

    function visit(el) {{
        if (el.nodeType !== 1) return null;
        const tag = el.tagName.toLowerCase();
        if (tag === 'template' || tag === 'script' || tag === 'style') return null;
        if (isDisplayNone(el)) return null;

        let role = roleOf(el);
        const presentation = role === 'presentation';
        if (presentation) role = null;

        const interactive = !presentation && isInteractive(el, role);
        const visible = isVisible(el);

        // Assign this node's ref before descending so ref numbering is
        // document-order pre-order: an ancestor always gets a lower
        // number than its interactive descendants.
        let ref_ = null;
        let disabled;
        if (interactive && visible) {{
            ref_ = '@e' + (nextRef++);
            window.__remixRefMap.set(ref_, el);
            disabled = isDisabled(el);
        }}

        const children = [];
        for (const child of el.children) {{
            const node = visit(child);
            if (node) children.push(node);
        }}
        if (el.shadowRoot) {{
            for (const child of el.shadowRoot.children) {{
                const node = visit(child);
                if (node) children.push(node);
            }}
        }}

        if (!visible && children.length === 0) return null;
        if (!role && !interactive && children.length === 0) return null;
        if (!role && !interactive && !isSemanticContainer(role)) {{
            if (children.length === 0) return null;
            if (children.length === 1) return children[0];
            return {{ role: 'generic', name: null, children }};
        }}

        const node = {{ role: role || 'generic', children }};
        if (ref_) {{
            node.ref = ref_;
            node.disabled = disabled;
        }}
        node.name = accessibleName(el);
        Object.assign(node, valueAndState(el, role));
        return node;
    }}

    function findFocusRoot() {{
        if (!FOCUS_REGION) return document.body;
        const alias = LANDMARK_ALIASES[FOCUS_REGION.toLowerCase()] || FOCUS_REGION.toLowerCase();
        const bySemanticTag = document.querySelector(FOCUS_REGION.toLowerCase());
        if (bySemanticTag) return bySemanticTag;
        const byRole = document.querySelector(`[role="${{alias}}"]`);
        if (byRole) return byRole;
        return document.body;
    }}

    const root = visit(findFocusRoot()) || {{ role: 'generic', name: null, children: [] }};

    return {{
        snapshotId: window.__remixSnapshotId,
        url: location.href,
        title: document.title,
        root
    }};
}})()"#
    )
}
