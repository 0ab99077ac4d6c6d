// src/scan/mod.rs

//! Candidate enumeration and content classification.
//!
//! This module is responsible for:
//! - Listing the regular files under the input root that the traversal scope
//!   allows the predicate to look at.
//! - Grouping them into [`ScanGroup`]s that can be classified independently.
//! - Reading each candidate and applying the match predicate ([`classify`]).
//!
//! It does **not** touch the output directory; that is the projector's job.

pub mod classify;
pub mod path_utils;
pub mod patterns;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use tracing::{debug, warn};

use crate::errors::{FunnelError, Result};
use crate::fs::FileSystem;
use crate::types::TraversalScope;

pub use classify::classify;
pub use patterns::{build_include_set, is_included};

use path_utils::{depth_of, relative_str};

/// Maximum directory depth examined under [`TraversalScope::Shallow`].
pub const SHALLOW_MAX_DEPTH: usize = 1;

/// A file the predicate will look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path relative to the input root, `/`-separated.
    pub rel: String,
    /// Full path used for reading.
    pub path: PathBuf,
}

/// Files classified together, in order.
///
/// With `stop_at_first_match`, the rest of the group is left unexamined once
/// one file matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanGroup {
    pub files: Vec<Candidate>,
    pub stop_at_first_match: bool,
}

impl ScanGroup {
    fn single(candidate: Candidate) -> Self {
        Self {
            files: vec![candidate],
            stop_at_first_match: false,
        }
    }
}

/// Everything one build pass will classify.
#[derive(Debug, Clone, Default)]
pub struct ScanPlan {
    pub groups: Vec<ScanGroup>,
}

impl ScanPlan {
    pub fn candidate_count(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum()
    }
}

/// Build the scan plan for `root` under the given traversal scope.
///
/// Candidates are always in canonical (sorted) order, both across and within
/// groups.
pub fn plan_scan(
    fs: &dyn FileSystem,
    root: &Path,
    scope: TraversalScope,
    include: Option<&GlobSet>,
) -> Result<ScanPlan> {
    let groups = match scope {
        TraversalScope::Unrestricted => list_files(fs, root)?
            .into_iter()
            .filter(|c| is_included(include, &c.rel))
            .map(ScanGroup::single)
            .collect(),
        TraversalScope::Shallow => shallow_groups(fs, root, include)?,
    };

    let plan = ScanPlan { groups };
    debug!(
        ?scope,
        groups = plan.groups.len(),
        candidates = plan.candidate_count(),
        "planned scan"
    );
    Ok(plan)
}

/// Collect every regular file below `root`, sorted by relative path.
pub fn list_files(fs: &dyn FileSystem, root: &Path) -> Result<Vec<Candidate>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in read_dir_sorted(fs, &dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Some(rel) = relative_str(root, &path) {
                    files.push(Candidate { rel, path });
                }
            } else {
                warn!(?path, "skipping entry that is neither a file nor a directory");
            }
        }
    }

    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(files)
}

/// The "scoped addon" walk: root files are classified one by one; each
/// first-level directory is one group that stops at its first match.
/// Nothing deeper than [`SHALLOW_MAX_DEPTH`] is looked at.
fn shallow_groups(
    fs: &dyn FileSystem,
    root: &Path,
    include: Option<&GlobSet>,
) -> Result<Vec<ScanGroup>> {
    let mut groups: Vec<ScanGroup> = Vec::new();
    let mut subtrees: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();

    for candidate in list_files(fs, root)? {
        if depth_of(&candidate.rel) > SHALLOW_MAX_DEPTH || !is_included(include, &candidate.rel) {
            continue;
        }
        match candidate.rel.split_once('/') {
            Some((dir, _)) => subtrees.entry(dir.to_string()).or_default().push(candidate),
            None => groups.push(ScanGroup::single(candidate)),
        }
    }

    groups.extend(subtrees.into_values().map(|files| ScanGroup {
        files,
        stop_at_first_match: true,
    }));
    groups.sort_by(|a, b| a.files[0].rel.cmp(&b.files[0].rel));
    Ok(groups)
}

fn read_dir_sorted(fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs.read_dir(dir).map_err(|e| FunnelError::io(dir, e))?;
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn rels(plan: &ScanPlan) -> Vec<Vec<&str>> {
        plan.groups
            .iter()
            .map(|g| g.files.iter().map(|c| c.rel.as_str()).collect())
            .collect()
    }

    fn sample_tree() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/in/b.js", "export {};");
        fs.add_file("/in/a.js", "define(");
        fs.add_file("/in/scope/z.js", "define(");
        fs.add_file("/in/scope/y.js", "define(");
        fs.add_file("/in/scope/lib/deep.js", "define(");
        fs.add_file("/in/other/lib/deep.js", "define(");
        fs
    }

    #[test]
    fn unrestricted_lists_every_file_individually() {
        let fs = sample_tree();
        let plan = plan_scan(&fs, Path::new("/in"), TraversalScope::Unrestricted, None).unwrap();

        assert_eq!(
            rels(&plan),
            vec![
                vec!["a.js"],
                vec!["b.js"],
                vec!["other/lib/deep.js"],
                vec!["scope/lib/deep.js"],
                vec!["scope/y.js"],
                vec!["scope/z.js"],
            ]
        );
        assert!(plan.groups.iter().all(|g| !g.stop_at_first_match));
    }

    #[test]
    fn shallow_groups_first_level_directories() {
        let fs = sample_tree();
        let plan = plan_scan(&fs, Path::new("/in"), TraversalScope::Shallow, None).unwrap();

        // `other/` has no direct files, so it contributes no group.
        assert_eq!(
            rels(&plan),
            vec![vec!["a.js"], vec!["b.js"], vec!["scope/y.js", "scope/z.js"]]
        );
        assert!(plan.groups[2].stop_at_first_match);
        assert_eq!(plan.candidate_count(), 4);
    }

    #[test]
    fn include_globs_filter_candidates() {
        let fs = sample_tree();
        fs.add_file("/in/readme.md", "define(");
        let include = build_include_set(&["**/*.js".to_string()]).unwrap();
        let plan = plan_scan(
            &fs,
            Path::new("/in"),
            TraversalScope::Unrestricted,
            include.as_ref(),
        )
        .unwrap();

        assert!(plan
            .groups
            .iter()
            .flat_map(|g| &g.files)
            .all(|c| c.rel.ends_with(".js")));
    }

    #[test]
    fn dangling_links_are_skipped() {
        let fs = sample_tree();
        fs.symlink(Path::new("/nowhere/x.js"), Path::new("/in/dangling.js"))
            .unwrap();

        let files = list_files(&fs, Path::new("/in")).unwrap();
        assert!(files.iter().all(|c| c.rel != "dangling.js"));
        assert_eq!(files.len(), 6);
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let fs = MockFileSystem::new();
        let err = list_files(&fs, Path::new("/missing")).unwrap_err();
        assert!(matches!(err, FunnelError::IoError { .. }));
    }
}
