// src/node.rs

//! Host build-graph contract.
//!
//! A host tool drives nodes through this trait: it knows where a node reads
//! from and writes to, and asks it to rebuild. The host guarantees at most one
//! in-flight build per node.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::errors::Result;
use crate::filter::ContentFilter;
use crate::project::Materializer;

/// A node in a staged build graph.
pub trait BuildNode: Send {
    /// Directories this node reads.
    fn input_paths(&self) -> &[PathBuf];

    /// Directory this node owns and writes.
    fn output_path(&self) -> &Path;

    /// Bring the output up to date with the current inputs.
    fn build(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

impl<M: Materializer> BuildNode for ContentFilter<M> {
    fn input_paths(&self) -> &[PathBuf] {
        ContentFilter::input_paths(self)
    }

    fn output_path(&self) -> &Path {
        ContentFilter::output_path(self)
    }

    fn build(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move { ContentFilter::build(self).await.map(|_| ()) })
    }
}
