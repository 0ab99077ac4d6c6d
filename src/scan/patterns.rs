// src/scan/patterns.rs

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{FunnelError, Result};

/// Compile include globs into a set.
///
/// An empty list means "every file is a candidate" and yields `None`.
pub fn build_include_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|e| {
            FunnelError::ConfigError(format!("invalid include glob {pat:?}: {e}"))
        })?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| FunnelError::ConfigError(format!("building include globset: {e}")))?;
    Ok(Some(set))
}

/// Whether `rel` (relative, `/`-separated) should be classified at all.
pub fn is_included(include: Option<&GlobSet>, rel: &str) -> bool {
    include.is_none_or(|set| set.is_match(rel))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_glob_matches_at_any_depth() {
        let set = build_include_set(&["**/*.js".to_string()]).unwrap();
        assert!(is_included(set.as_ref(), "amd.js"));
        assert!(is_included(set.as_ref(), "scope/lib/amd.js"));
        assert!(!is_included(set.as_ref(), "styles.css"));
    }

    #[test]
    fn no_patterns_includes_everything() {
        let set = build_include_set(&[]).unwrap();
        assert!(set.is_none());
        assert!(is_included(None, "anything.txt"));
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let err = build_include_set(&["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, FunnelError::ConfigError(msg) if msg.contains("src/[")));
    }
}
