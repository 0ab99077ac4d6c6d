// src/scan/classify.rs

//! Concurrent classification of a [`ScanPlan`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::errors::{FunnelError, Result};
use crate::fs::FileSystem;
use crate::predicate::MatchPredicate;

use super::{ScanGroup, ScanPlan};

/// Read every candidate in `plan` and return the sorted list of relative
/// paths the predicate matched.
///
/// Groups run concurrently on the blocking pool; files inside a group run in
/// order. If any group fails, the error of the earliest group (in plan order)
/// is returned and nothing is excluded.
pub async fn classify(
    fs: Arc<dyn FileSystem>,
    predicate: Arc<dyn MatchPredicate>,
    plan: ScanPlan,
) -> Result<Vec<String>> {
    let group_count = plan.groups.len();
    let mut set = JoinSet::new();

    for (index, group) in plan.groups.into_iter().enumerate() {
        let fs = Arc::clone(&fs);
        let predicate = Arc::clone(&predicate);
        set.spawn_blocking(move || (index, classify_group(fs.as_ref(), predicate.as_ref(), &group)));
    }

    let mut results: Vec<Option<Result<Vec<String>>>> = (0..group_count).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        let (index, result) =
            joined.map_err(|e| FunnelError::Other(anyhow!("classification task failed: {e}")))?;
        results[index] = Some(result);
    }

    let mut excluded = Vec::new();
    for result in results.into_iter().flatten() {
        excluded.extend(result?);
    }
    excluded.sort();
    excluded.dedup();
    Ok(excluded)
}

/// Classify one group sequentially.
pub fn classify_group(
    fs: &dyn FileSystem,
    predicate: &dyn MatchPredicate,
    group: &ScanGroup,
) -> Result<Vec<String>> {
    let mut excluded = Vec::new();

    for candidate in &group.files {
        let content = fs
            .read(&candidate.path)
            .map_err(|e| FunnelError::io(&candidate.path, e))?;

        if evaluate(predicate, &candidate.rel, &content)? {
            debug!(file = %candidate.rel, "predicate matched; excluding");
            excluded.push(candidate.rel.clone());
            if group.stop_at_first_match {
                trace!(file = %candidate.rel, "first match in subtree; stopping scan");
                break;
            }
        } else {
            trace!(file = %candidate.rel, "predicate did not match; retaining");
        }
    }

    Ok(excluded)
}

/// Run the predicate, turning both errors and panics into `PredicateError`.
fn evaluate(predicate: &dyn MatchPredicate, rel: &str, content: &[u8]) -> Result<bool> {
    match panic::catch_unwind(AssertUnwindSafe(|| predicate.matches(content))) {
        Ok(Ok(matched)) => Ok(matched),
        Ok(Err(err)) => Err(FunnelError::PredicateError {
            path: rel.to_string(),
            message: format!("{err:#}"),
        }),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "predicate panicked".to_string());
            Err(FunnelError::PredicateError {
                path: rel.to_string(),
                message: format!("panicked: {message}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::predicate::{FnPredicate, MarkerPredicate};
    use crate::scan::plan_scan;
    use crate::types::TraversalScope;
    use std::path::Path;

    fn tree() -> Arc<MockFileSystem> {
        let fs = MockFileSystem::new();
        fs.add_file("/in/amd.js", "define('amd', function() {});");
        fs.add_file("/in/es6.js", "export { es6 } from './es6';");
        fs.add_file("/in/scope/a.js", "define('a', function() {});");
        fs.add_file("/in/scope/b.js", "define('b', function() {});");
        fs.add_file("/in/scope/lib/c.js", "define('c', function() {});");
        Arc::new(fs)
    }

    #[tokio::test]
    async fn unrestricted_excludes_every_match_sorted() {
        let fs = tree();
        let plan = plan_scan(&*fs, Path::new("/in"), TraversalScope::Unrestricted, None).unwrap();
        let excluded = classify(fs, Arc::new(MarkerPredicate::amd()), plan).await.unwrap();

        assert_eq!(excluded, vec!["amd.js", "scope/a.js", "scope/b.js", "scope/lib/c.js"]);
    }

    #[tokio::test]
    async fn shallow_stops_each_subtree_at_first_match() {
        let fs = tree();
        let plan = plan_scan(&*fs, Path::new("/in"), TraversalScope::Shallow, None).unwrap();
        let excluded = classify(fs, Arc::new(MarkerPredicate::amd()), plan).await.unwrap();

        assert_eq!(excluded, vec!["amd.js", "scope/a.js"]);
    }

    #[tokio::test]
    async fn predicate_panic_becomes_predicate_error() {
        let fs = tree();
        let plan = plan_scan(&*fs, Path::new("/in"), TraversalScope::Unrestricted, None).unwrap();
        let predicate = FnPredicate::new(|content: &[u8]| {
            if content.starts_with(b"export") {
                panic!("cannot classify exports");
            }
            Ok(false)
        });

        let err = classify(fs, Arc::new(predicate), plan).await.unwrap_err();
        match err {
            FunnelError::PredicateError { path, message } => {
                assert_eq!(path, "es6.js");
                assert!(message.contains("cannot classify exports"));
            }
            other => panic!("expected PredicateError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn earliest_failing_group_wins() {
        let fs = tree();
        fs.fail_reads_of("/in/scope/b.js");
        fs.fail_reads_of("/in/es6.js");
        let plan = plan_scan(&*fs, Path::new("/in"), TraversalScope::Unrestricted, None).unwrap();

        let err = classify(fs, Arc::new(MarkerPredicate::amd()), plan).await.unwrap_err();
        match err {
            FunnelError::IoError { path, .. } => assert_eq!(path, Path::new("/in/es6.js")),
            other => panic!("expected IoError, got {other:?}"),
        }
    }
}
