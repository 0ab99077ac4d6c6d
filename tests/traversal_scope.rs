// tests/traversal_scope.rs
//
// Traversal policy checks on the in-memory filesystem.

use std::sync::Arc;

use amd_funnel::fs::FileSystem;
use amd_funnel::fs::mock::MockFileSystem;
use amd_funnel::{ContentFilter, FunnelOptions, TraversalScope};
use amd_funnel_test_utils::{init_tracing, tree, RecordingObserver};

const AMD: &str = "define('amd', function() {});";
const ES6: &str = "export { es6 } from './es6';";

fn mock_funnel(
    fs: &Arc<MockFileSystem>,
    scope: TraversalScope,
    observer: &RecordingObserver,
) -> ContentFilter {
    let shared: Arc<dyn FileSystem> = fs.clone();
    let options = FunnelOptions::new()
        .with_traversal_scope(scope)
        .on_excluded(observer.callback());
    ContentFilter::with_fs(shared, "/in", "/out", options)
}

#[tokio::test]
async fn one_level_scoped_marker_is_excluded() {
    init_tracing();

    for scope in [TraversalScope::Shallow, TraversalScope::Unrestricted] {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/in/scope/amd.js", AMD);
        let observer = RecordingObserver::new();

        let outcome = mock_funnel(&fs, scope, &observer).build().await.unwrap();

        assert_eq!(outcome.excluded, vec!["scope/amd.js"], "{scope:?}");
        assert!(fs.snapshot("/out").is_empty(), "{scope:?}");
    }
}

#[tokio::test]
async fn shallow_scope_retains_markers_two_levels_deep() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/in/scope/lib/amd.js", AMD);
    let observer = RecordingObserver::new();

    let outcome = mock_funnel(&fs, TraversalScope::Shallow, &observer)
        .build()
        .await
        .unwrap();

    assert!(outcome.excluded.is_empty());
    assert_eq!(outcome.candidates, 0);
    assert_eq!(fs.snapshot("/out"), tree(&[("scope/lib/amd.js", AMD)]));
    assert_eq!(observer.calls(), vec![Vec::<String>::new()]);
}

#[tokio::test]
async fn unrestricted_scope_finds_deep_markers() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/in/scope/lib/amd.js", AMD);
    let observer = RecordingObserver::new();

    let outcome = mock_funnel(&fs, TraversalScope::Unrestricted, &observer)
        .build()
        .await
        .unwrap();

    assert_eq!(outcome.excluded, vec!["scope/lib/amd.js"]);
    assert!(fs.snapshot("/out").is_empty());
}

#[tokio::test]
async fn first_match_stops_the_subtree_scan() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/in/scope/a.js", AMD);
    fs.add_file("/in/scope/b.js", AMD);
    fs.add_file("/in/scope/lib/c.js", AMD);
    let observer = RecordingObserver::new();

    let outcome = mock_funnel(&fs, TraversalScope::Shallow, &observer)
        .build()
        .await
        .unwrap();

    assert_eq!(outcome.excluded, vec!["scope/a.js"]);
    assert_eq!(
        fs.snapshot("/out"),
        tree(&[("scope/b.js", AMD), ("scope/lib/c.js", AMD)])
    );
}

#[tokio::test]
async fn root_files_are_not_short_circuited() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/in/a.js", AMD);
    fs.add_file("/in/b.js", AMD);
    fs.add_file("/in/es6.js", ES6);
    fs.add_file("/in/scope/amd.js", AMD);
    fs.add_file("/in/other/amd.js", AMD);
    let observer = RecordingObserver::new();

    let outcome = mock_funnel(&fs, TraversalScope::Shallow, &observer)
        .build()
        .await
        .unwrap();

    assert_eq!(
        outcome.excluded,
        vec!["a.js", "b.js", "other/amd.js", "scope/amd.js"]
    );
    assert_eq!(fs.snapshot("/out"), tree(&[("es6.js", ES6)]));
}

#[tokio::test]
async fn subtree_first_match_is_recomputed_every_build() {
    init_tracing();

    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/in/scope/a.js", AMD);
    fs.add_file("/in/scope/b.js", AMD);
    let observer = RecordingObserver::new();
    let mut f = mock_funnel(&fs, TraversalScope::Shallow, &observer);

    f.build().await.unwrap();
    assert_eq!(fs.snapshot("/out"), tree(&[("scope/b.js", AMD)]));

    // a.js is no longer AMD, so b.js becomes the first match.
    fs.add_file("/in/scope/a.js", ES6);
    f.build().await.unwrap();

    assert_eq!(fs.snapshot("/out"), tree(&[("scope/a.js", ES6)]));
    assert_eq!(
        observer.calls(),
        vec![vec!["scope/a.js".to_string()], vec!["scope/b.js".to_string()]]
    );
}
