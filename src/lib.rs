// src/lib.rs

//! Build-pipeline node that splits a source tree by a content sniff.
//!
//! Some upstream producers hand over trees that mix plain sources with files
//! already compiled into an AMD `define(...)` wrapper. Compiling those again
//! corrupts them, so this node forwards only the files whose content does
//! *not* match a predicate and reports the ones it dropped.
//!
//! ```no_run
//! use amd_funnel::{ContentFilter, FunnelOptions, TraversalScope};
//!
//! # async fn demo() -> amd_funnel::errors::Result<()> {
//! let options = FunnelOptions::new()
//!     .with_traversal_scope(TraversalScope::Shallow)
//!     .on_excluded(|paths| println!("excluded: {paths:?}"));
//! let mut funnel = ContentFilter::new("addon-tree", "dist/addon-tree", options);
//! funnel.build().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod filter;
pub mod fs;
pub mod logging;
pub mod node;
pub mod predicate;
pub mod project;
pub mod scan;
pub mod types;

pub use errors::{FunnelError, Result};
pub use filter::{BuildOutcome, ContentFilter, ExclusionObserver, FunnelOptions};
pub use node::BuildNode;
pub use predicate::{AMD_MARKER, FnPredicate, MarkerPredicate, MatchPredicate, PatternPredicate};
pub use project::{Change, Materializer, ProjectionReport, SelectiveProjector};
pub use types::{LogLevel, MaterializeMode, TraversalScope};
