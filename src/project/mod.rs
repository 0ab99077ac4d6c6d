// src/project/mod.rs

//! Selective materialization: projecting the input tree, minus an exclusion
//! list, into the output directory.
//!
//! The filter only talks to the [`Materializer`] trait, so a host tool can
//! plug in its own engine. [`SelectiveProjector`] is the default one.

pub mod projector;
pub mod stamp;

use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::Result;

pub use projector::SelectiveProjector;

/// One observable difference in the output tree after a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Create,
    Update,
    Unlink,
}

/// What a single projection did to the output directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    /// Output-relative path -> change, in canonical order.
    pub changes: BTreeMap<String, Change>,
    /// Entries left exactly as they were.
    pub unchanged: usize,
}

impl ProjectionReport {
    /// True when the build left the output untouched.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn count(&self, kind: Change) -> usize {
        self.changes.values().filter(|c| **c == kind).count()
    }
}

/// Engine contract for incremental selective projection.
///
/// The caller replaces the exclusion list through [`exclude_mut`] and then
/// calls [`build`]. Implementations own the output directory exclusively.
///
/// [`exclude_mut`]: Materializer::exclude_mut
/// [`build`]: Materializer::build
pub trait Materializer: Send {
    fn input_path(&self) -> &Path;
    fn output_path(&self) -> &Path;

    /// Relative, `/`-separated paths to leave out of the output.
    fn exclude_mut(&mut self) -> &mut Vec<String>;

    /// Bring the output directory in line with the input minus exclusions.
    fn build(&mut self) -> Result<ProjectionReport>;
}
