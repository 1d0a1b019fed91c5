//! Parsing and validation for opaque element handles (`@e<n>`, §3).
//!
//! This supersedes the teacher's `selectors::r#ref` module: the teacher's
//! bare `eN` / `ref=eN` / `[ref=eN]` forms addressed a CSS-selector
//! fallback that the spec's opaque-handle model does not have (§9, "Opaque
//! handles over selectors"). There is exactly one valid ref syntax now.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    #[error("Invalid ref '{0}'. Refs look like @e1, @e2, ...")]
    InvalidFormat(String),
    #[error("Ref '{0}' not found, call page_snapshot again.")]
    NotFound(String),
}

/// True iff `s` matches `^@e\d+$` (§8 property 1).
pub fn is_valid_ref(s: &str) -> bool {
    let Some(rest) = s.strip_prefix("@e") else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Parses a ref string, rejecting anything that isn't `@e<digits>`.
pub fn parse_ref(s: &str) -> Result<String, RefError> {
    let trimmed = s.trim();
    if is_valid_ref(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(RefError::InvalidFormat(trimmed.to_string()))
    }
}

/// Formats the `n`-th ref issued by a snapshot, 1-indexed (§4.2).
pub fn format_ref(n: u32) -> String {
    format!("@e{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_refs() {
        assert!(is_valid_ref("@e1"));
        assert!(is_valid_ref("@e42"));
    }

    #[test]
    fn rejects_malformed_refs() {
        for bad in ["e1", "@1", "@e", "@e-1", "[ref=e1]", "ref=e1", ""] {
            assert!(!is_valid_ref(bad), "expected {bad:?} to be invalid");
        }
    }

    #[test]
    fn parse_ref_round_trips_format_ref() {
        for n in [1u32, 2, 100] {
            let s = format_ref(n);
            assert_eq!(parse_ref(&s).unwrap(), s);
        }
    }

    #[test]
    fn parse_ref_rejects_css_selectors() {
        let err = parse_ref("#submit-btn").unwrap_err();
        assert!(matches!(err, RefError::InvalidFormat(_)));
    }
}
