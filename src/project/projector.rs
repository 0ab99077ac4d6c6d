// src/project/projector.rs

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{FunnelError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::scan::{Candidate, list_files};
use crate::types::MaterializeMode;

use super::stamp::{FingerprintCache, Fingerprint, content_hash};
use super::{Change, Materializer, ProjectionReport};

/// Default [`Materializer`]: mirrors the input tree minus exclusions.
///
/// Between builds it remembers a fingerprint per output entry. An entry whose
/// input stamp did not move is neither re-read nor re-written; one whose stamp
/// moved is re-hashed and only re-written if the content actually differs.
/// The first build starts from an empty output directory.
pub struct SelectiveProjector {
    fs: Arc<dyn FileSystem>,
    input: PathBuf,
    output: PathBuf,
    exclude: Vec<String>,
    mode: MaterializeMode,
    cache: FingerprintCache,
    primed: bool,
}

impl fmt::Debug for SelectiveProjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectiveProjector")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("mode", &self.mode)
            .field("entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl SelectiveProjector {
    /// Projector on the real filesystem, copying files.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self::with_fs(Arc::new(RealFileSystem), input, output)
    }

    pub fn with_fs(
        fs: Arc<dyn FileSystem>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            input: input.into(),
            output: output.into(),
            exclude: Vec::new(),
            mode: MaterializeMode::default(),
            cache: FingerprintCache::new(),
            primed: false,
        }
    }

    pub fn with_mode(mut self, mode: MaterializeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Wipe whatever a previous process left in the output directory.
    fn prime(&mut self) -> Result<()> {
        self.fs
            .remove_dir_all(&self.output)
            .map_err(|e| FunnelError::io(&self.output, e))?;
        self.fs
            .create_dir_all(&self.output)
            .map_err(|e| FunnelError::io(&self.output, e))?;
        self.cache = FingerprintCache::new();
        self.primed = true;
        debug!(output = ?self.output, "primed empty output directory");
        Ok(())
    }

    /// Clear output entries whose kind blocks placing a file at `rel`: a file
    /// or link sitting where a parent directory must go, or a directory
    /// sitting where the file must go.
    fn clear_conflicts(&mut self, rel: &str) -> Result<()> {
        if let Some((parent, _)) = rel.rsplit_once('/') {
            let mut prefix = String::new();
            for part in parent.split('/') {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(part);

                let path = self.output.join(&prefix);
                if self.fs.is_file(&path) {
                    warn!(file = %prefix, "removing output file in the way of a directory");
                    self.fs
                        .remove_file(&path)
                        .map_err(|e| FunnelError::io(&path, e))?;
                    self.cache.remove(&prefix);
                }
            }
        }

        let dest = self.output.join(rel);
        if self.fs.is_dir(&dest) {
            warn!(file = %rel, "removing output directory in the way of a file");
            self.fs
                .remove_dir_all(&dest)
                .map_err(|e| FunnelError::io(&dest, e))?;
            self.cache.remove_under(rel);
        }
        Ok(())
    }

    /// Put one retained file into the output tree.
    fn place(&self, candidate: &Candidate, content: &[u8]) -> Result<()> {
        let dest = self.output.join(&candidate.rel);
        match self.mode {
            MaterializeMode::Copy => self
                .fs
                .write(&dest, content)
                .map_err(|e| FunnelError::io(&dest, e)),
            MaterializeMode::Symlink => {
                let target = self
                    .fs
                    .canonicalize(&candidate.path)
                    .map_err(|e| FunnelError::io(&candidate.path, e))?;
                self.fs
                    .symlink(&target, &dest)
                    .map_err(|e| FunnelError::io(&dest, e))
            }
        }
    }

    /// Remove directories emptied by an unlink, up to (not including) the
    /// output root.
    fn prune_empty_parents(&self, rel: &str) -> Result<()> {
        let dest = self.output.join(rel);
        let mut dir = dest.parent();
        while let Some(current) = dir {
            if current == self.output || !current.starts_with(&self.output) {
                break;
            }
            if !self.fs.is_dir(current) {
                break;
            }
            let removed = self
                .fs
                .remove_dir_if_empty(current)
                .map_err(|e| FunnelError::io(current, e))?;
            if !removed {
                break;
            }
            dir = current.parent();
        }
        Ok(())
    }
}

impl Materializer for SelectiveProjector {
    fn input_path(&self) -> &Path {
        &self.input
    }

    fn output_path(&self) -> &Path {
        &self.output
    }

    fn exclude_mut(&mut self) -> &mut Vec<String> {
        &mut self.exclude
    }

    fn build(&mut self) -> Result<ProjectionReport> {
        if !self.fs.is_dir(&self.input) {
            return Err(FunnelError::ConfigError(format!(
                "input path {:?} is not a directory",
                self.input
            )));
        }

        let files = list_files(self.fs.as_ref(), &self.input)?;

        if !self.primed {
            self.prime()?;
        }

        let excluded: HashSet<&str> = self.exclude.iter().map(String::as_str).collect();
        let retained: Vec<Candidate> = files
            .into_iter()
            .filter(|c| !excluded.contains(c.rel.as_str()))
            .collect();
        let keep: BTreeSet<String> = retained.iter().map(|c| c.rel.clone()).collect();
        let mut report = ProjectionReport::default();

        // Stale entries go first so their paths are free for entries that
        // changed kind (file `lib` becoming directory `lib/`, or back).
        for rel in self.cache.stale(&keep) {
            let dest = self.output.join(&rel);
            self.fs
                .remove_file(&dest)
                .map_err(|e| FunnelError::io(&dest, e))?;
            self.cache.remove(&rel);
            self.prune_empty_parents(&rel)?;
            debug!(file = %rel, "unlinked");
            report.changes.insert(rel, Change::Unlink);
        }

        for candidate in retained {
            let stamp = self
                .fs
                .stat(&candidate.path)
                .map_err(|e| FunnelError::io(&candidate.path, e))?;

            let previous = self.cache.get(&candidate.rel).cloned();
            if previous.as_ref().is_some_and(|fp| fp.stamp == stamp) {
                report.unchanged += 1;
                continue;
            }

            let content = self
                .fs
                .read(&candidate.path)
                .map_err(|e| FunnelError::io(&candidate.path, e))?;
            let hash = content_hash(&content);

            let change = match &previous {
                None => Some(Change::Create),
                Some(fp) if fp.hash != hash => Some(Change::Update),
                Some(_) => None,
            };

            match change {
                Some(change) => {
                    self.clear_conflicts(&candidate.rel)?;
                    self.place(&candidate, &content)?;
                    debug!(file = %candidate.rel, ?change, "projected");
                    report.changes.insert(candidate.rel.clone(), change);
                }
                None => report.unchanged += 1,
            }

            self.cache.insert(candidate.rel, Fingerprint { stamp, hash });
        }

        info!(
            created = report.count(Change::Create),
            updated = report.count(Change::Update),
            unlinked = report.count(Change::Unlink),
            unchanged = report.unchanged,
            "projection complete"
        );
        Ok(report)
    }
}
