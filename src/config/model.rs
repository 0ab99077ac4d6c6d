// src/config/model.rs

use serde::Deserialize;

use crate::predicate::AMD_MARKER;
use crate::types::{MaterializeMode, TraversalScope};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [funnel]
/// marker = "define("
/// traversal_scope = "shallow"
/// include = ["**/*.js"]
/// materialize_mode = "copy"
/// annotation = "addon-tree"
/// ```
///
/// Every key is optional; an empty file gives the default AMD funnel.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawFunnelConfig {
    #[serde(default)]
    pub funnel: FunnelSection,
}

/// `[funnel]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunnelSection {
    /// Literal prefix marking files to exclude.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Regex that must match at the start of the content. Overrides `marker`.
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub traversal_scope: TraversalScope,

    /// Globs restricting which files are classified. Empty means all files.
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub materialize_mode: MaterializeMode,

    #[serde(default)]
    pub annotation: Option<String>,
}

fn default_marker() -> String {
    AMD_MARKER.to_string()
}

impl Default for FunnelSection {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            pattern: None,
            traversal_scope: TraversalScope::default(),
            include: Vec::new(),
            materialize_mode: MaterializeMode::default(),
            annotation: None,
        }
    }
}

/// Validated configuration. Only obtainable through `TryFrom<RawFunnelConfig>`.
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    funnel: FunnelSection,
}

impl FunnelConfig {
    pub(crate) fn new_unchecked(funnel: FunnelSection) -> Self {
        Self { funnel }
    }

    pub fn funnel(&self) -> &FunnelSection {
        &self.funnel
    }
}
