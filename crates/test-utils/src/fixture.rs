use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Build an expected tree from `(relative path, content)` pairs.
pub fn tree(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A temporary input directory plus a sibling output location.
///
/// The output directory is not created up front; the projector owns it.
pub struct TreeFixture {
    dir: TempDir,
}

impl TreeFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("creating fixture tempdir")?,
        })
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    /// Create the (possibly empty) input directory.
    pub fn create_input(&self) -> Result<()> {
        fs::create_dir_all(self.input()).context("creating input dir")
    }

    /// Write files below the input directory, creating parents as needed.
    pub fn write(&self, files: &[(&str, &str)]) -> Result<()> {
        for (rel, content) in files {
            let path = self.input().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content).with_context(|| format!("writing {:?}", path))?;
        }
        Ok(())
    }

    pub fn remove(&self, rel: &str) -> Result<()> {
        let path = self.input().join(rel);
        fs::remove_file(&path).with_context(|| format!("removing {:?}", path))
    }

    pub fn read_input(&self) -> Result<BTreeMap<String, String>> {
        read_tree(&self.input())
    }

    pub fn read_output(&self) -> Result<BTreeMap<String, String>> {
        read_tree(&self.output())
    }
}

/// Read every file below `root` (following symlinks) keyed by `/`-separated
/// relative path. A missing root reads as an empty tree.
pub fn read_tree(root: &Path) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    if !root.exists() {
        return Ok(out);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).with_context(|| format!("reading dir {:?}", dir))? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path
                    .strip_prefix(root)?
                    .to_string_lossy()
                    .replace('\\', "/");
                let content =
                    fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
                out.insert(rel, content);
            }
        }
    }
    Ok(out)
}
