// src/scan/path_utils.rs

//! Utility functions for path handling during the scan.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if `path` is not below `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_string_lossy().replace('\\', "/"))
}

/// Number of directories between the root and a relative path.
///
/// `"a.js"` is depth 0, `"scope/a.js"` is depth 1.
pub fn depth_of(rel: &str) -> usize {
    rel.matches('/').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_str_strips_root_and_normalises() {
        let root = Path::new("/in");
        assert_eq!(
            relative_str(root, Path::new("/in/scope/amd.js")).as_deref(),
            Some("scope/amd.js")
        );
        assert_eq!(relative_str(root, Path::new("/elsewhere/a.js")), None);
        assert_eq!(relative_str(root, root), None);
    }

    #[test]
    fn depth_counts_directory_levels() {
        assert_eq!(depth_of("amd.js"), 0);
        assert_eq!(depth_of("scope/amd.js"), 1);
        assert_eq!(depth_of("scope/lib/amd.js"), 2);
    }
}
