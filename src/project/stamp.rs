// src/project/stamp.rs

use std::collections::{BTreeSet, HashMap};

use blake3::Hasher;
use tracing::debug;

use crate::fs::FileStamp;

/// Compute the hash of a file's content.
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}

/// What the projector last wrote for one output entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub stamp: FileStamp,
    pub hash: String,
}

/// Per-entry fingerprints of the last successful projection.
///
/// This is what lets a rebuild skip re-reading files whose stamp did not move.
#[derive(Debug, Default)]
pub struct FingerprintCache {
    entries: HashMap<String, Fingerprint>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, rel: &str) -> Option<&Fingerprint> {
        self.entries.get(rel)
    }

    pub fn insert(&mut self, rel: String, fingerprint: Fingerprint) {
        self.entries.insert(rel, fingerprint);
    }

    /// Drop an entry. Returns whether it was present.
    pub fn remove(&mut self, rel: &str) -> bool {
        let removed = self.entries.remove(rel).is_some();
        if removed {
            debug!("invalidated fingerprint for {rel}");
        }
        removed
    }

    /// Paths recorded in the cache that are not in `keep`.
    pub fn stale(&self, keep: &BTreeSet<String>) -> Vec<String> {
        let mut stale: Vec<String> = self
            .entries
            .keys()
            .filter(|k| !keep.contains(*k))
            .cloned()
            .collect();
        stale.sort();
        stale
    }

    /// Drop every entry below directory `dir`. Returns how many went.
    pub fn remove_under(&mut self, dir: &str) -> usize {
        let prefix = format!("{dir}/");
        let before = self.entries.len();
        self.entries.retain(|rel, _| !rel.starts_with(&prefix));
        before - self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_blake3_hex() {
        // blake3 hash of "hello world"
        assert_eq!(
            content_hash(b"hello world"),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn stale_lists_entries_missing_from_keep_set() {
        let mut cache = FingerprintCache::new();
        let fp = Fingerprint {
            stamp: FileStamp {
                len: 1,
                modified: None,
            },
            hash: content_hash(b"x"),
        };
        cache.insert("b.js".into(), fp.clone());
        cache.insert("a.js".into(), fp.clone());
        cache.insert("keep.js".into(), fp);

        let keep: BTreeSet<String> = ["keep.js".to_string()].into_iter().collect();
        assert_eq!(cache.stale(&keep), vec!["a.js", "b.js"]);
        assert!(cache.remove("a.js"));
        assert!(!cache.remove("a.js"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn remove_under_only_drops_entries_below_the_directory() {
        let mut cache = FingerprintCache::new();
        let fp = Fingerprint {
            stamp: FileStamp {
                len: 1,
                modified: None,
            },
            hash: content_hash(b"x"),
        };
        cache.insert("lib".into(), fp.clone());
        cache.insert("lib/x.js".into(), fp.clone());
        cache.insert("lib/deep/y.js".into(), fp.clone());
        cache.insert("library.js".into(), fp);

        assert_eq!(cache.remove_under("lib"), 2);
        assert!(cache.get("lib").is_some());
        assert!(cache.get("library.js").is_some());
        assert_eq!(cache.len(), 2);
    }
}
