// src/filter/mod.rs

//! The content-sniffing filter node.
//!
//! Each build pass:
//! 1. forgets the previous exclusion set;
//! 2. checks the input root (lazily, so construction never fails);
//! 3. plans and runs classification under the configured traversal scope;
//! 4. hands the sorted exclusion set to the [`Materializer`] and lets it
//!    update the output directory;
//! 5. notifies the `on_excluded` observer, once, with the same sorted set.
//!
//! A failure in steps 1–3 returns before the materializer is touched, so the
//! previous output tree stays exactly as it was.

pub mod options;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span};

use crate::errors::{FunnelError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::project::{Materializer, ProjectionReport, SelectiveProjector};
use crate::scan::{build_include_set, classify, plan_scan};

pub use options::{ExclusionObserver, FunnelOptions};

/// Result of one successful build pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Sorted relative paths left out of the output.
    pub excluded: Vec<String>,
    /// Number of files the predicate was applied to or could have been.
    pub candidates: usize,
    pub projection: ProjectionReport,
}

/// Build-graph node that drops files whose content matches a predicate.
///
/// Not safe for concurrent builds; `build` takes `&mut self` so the borrow
/// checker enforces one pass at a time.
pub struct ContentFilter<M = SelectiveProjector> {
    fs: Arc<dyn FileSystem>,
    materializer: M,
    options: FunnelOptions,
    input_paths: Vec<PathBuf>,
    excluded: Vec<String>,
}

impl<M: Materializer + std::fmt::Debug> std::fmt::Debug for ContentFilter<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFilter")
            .field("materializer", &self.materializer)
            .field("options", &self.options)
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

impl ContentFilter<SelectiveProjector> {
    /// Filter over the real filesystem with the default projector.
    pub fn new(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        options: FunnelOptions,
    ) -> Self {
        Self::with_fs(Arc::new(RealFileSystem), input_root, output_root, options)
    }

    /// Filter and default projector sharing an injected filesystem.
    pub fn with_fs(
        fs: Arc<dyn FileSystem>,
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        options: FunnelOptions,
    ) -> Self {
        let projector = SelectiveProjector::with_fs(Arc::clone(&fs), input_root, output_root)
            .with_mode(options.materialize_mode);
        Self::with_materializer(projector, fs, options)
    }
}

impl<M: Materializer> ContentFilter<M> {
    /// Filter delegating projection to a caller-supplied engine.
    ///
    /// `fs` is only used for classification reads.
    pub fn with_materializer(materializer: M, fs: Arc<dyn FileSystem>, options: FunnelOptions) -> Self {
        let input_paths = vec![materializer.input_path().to_path_buf()];
        Self {
            fs,
            materializer,
            options,
            input_paths,
            excluded: Vec::new(),
        }
    }

    pub fn input_root(&self) -> &Path {
        self.materializer.input_path()
    }

    pub fn input_paths(&self) -> &[PathBuf] {
        &self.input_paths
    }

    pub fn output_path(&self) -> &Path {
        self.materializer.output_path()
    }

    pub fn options(&self) -> &FunnelOptions {
        &self.options
    }

    pub fn materializer(&self) -> &M {
        &self.materializer
    }

    /// Exclusion set decided by the most recent build (empty before the first
    /// build and after a failed one).
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Run one build pass.
    pub async fn build(&mut self) -> Result<BuildOutcome> {
        let span = info_span!(
            "funnel",
            annotation = self.options.annotation.as_deref().unwrap_or("amd-funnel")
        );
        self.build_pass().instrument(span).await
    }

    async fn build_pass(&mut self) -> Result<BuildOutcome> {
        self.excluded.clear();

        let root = self.input_root().to_path_buf();
        if !self.fs.is_dir(&root) {
            return Err(FunnelError::ConfigError(format!(
                "input root {:?} is not a directory",
                root
            )));
        }
        let include = build_include_set(&self.options.include)?;

        let plan = plan_scan(
            self.fs.as_ref(),
            &root,
            self.options.traversal_scope,
            include.as_ref(),
        )?;
        let candidates = plan.candidate_count();
        debug!(
            predicate = %self.options.predicate.describe(),
            candidates,
            "classifying candidates"
        );

        let excluded = classify(
            Arc::clone(&self.fs),
            Arc::clone(&self.options.predicate),
            plan,
        )
        .await?;

        *self.materializer.exclude_mut() = excluded.clone();
        let projection = self.materializer.build()?;
        self.excluded = excluded;

        info!(
            candidates,
            excluded = self.excluded.len(),
            changes = projection.changes.len(),
            "build complete"
        );

        if let Some(observer) = &self.options.on_excluded {
            observer(&self.excluded);
        }

        Ok(BuildOutcome {
            excluded: self.excluded.clone(),
            candidates,
            projection,
        })
    }
}
