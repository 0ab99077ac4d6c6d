// src/filter/options.rs

use std::fmt;
use std::sync::Arc;

use anyhow::Result as AnyResult;

use crate::config::FunnelConfig;
use crate::errors::{FunnelError, Result};
use crate::predicate::{FnPredicate, MarkerPredicate, MatchPredicate, PatternPredicate};
use crate::types::{MaterializeMode, TraversalScope};

/// Callback told which relative paths a build excluded.
pub type ExclusionObserver = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Construction options for [`super::ContentFilter`].
#[derive(Clone)]
pub struct FunnelOptions {
    pub predicate: Arc<dyn MatchPredicate>,
    pub traversal_scope: TraversalScope,
    /// Glob patterns restricting which files are classified at all. Empty
    /// means every file.
    pub include: Vec<String>,
    pub on_excluded: Option<ExclusionObserver>,
    /// Label for this node in logs.
    pub annotation: Option<String>,
    pub materialize_mode: MaterializeMode,
}

impl Default for FunnelOptions {
    fn default() -> Self {
        Self {
            predicate: Arc::new(MarkerPredicate::amd()),
            traversal_scope: TraversalScope::default(),
            include: Vec::new(),
            on_excluded: None,
            annotation: None,
            materialize_mode: MaterializeMode::default(),
        }
    }
}

impl fmt::Debug for FunnelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunnelOptions")
            .field("predicate", &self.predicate.describe())
            .field("traversal_scope", &self.traversal_scope)
            .field("include", &self.include)
            .field("on_excluded", &self.on_excluded.is_some())
            .field("annotation", &self.annotation)
            .field("materialize_mode", &self.materialize_mode)
            .finish()
    }
}

impl FunnelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate(mut self, predicate: impl MatchPredicate + 'static) -> Self {
        self.predicate = Arc::new(predicate);
        self
    }

    pub fn with_predicate_fn<F>(self, f: F) -> Self
    where
        F: Fn(&[u8]) -> AnyResult<bool> + Send + Sync + 'static,
    {
        self.with_predicate(FnPredicate::new(f))
    }

    pub fn with_traversal_scope(mut self, scope: TraversalScope) -> Self {
        self.traversal_scope = scope;
        self
    }

    pub fn with_include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn on_excluded<F>(mut self, observer: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.on_excluded = Some(Arc::new(observer));
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_materialize_mode(mut self, mode: MaterializeMode) -> Self {
        self.materialize_mode = mode;
        self
    }

    /// Options described by a validated config file.
    ///
    /// A `pattern` takes precedence over `marker`.
    pub fn from_config(cfg: &FunnelConfig) -> Result<Self> {
        let section = cfg.funnel();
        let mut options = Self::new()
            .with_traversal_scope(section.traversal_scope)
            .with_include(section.include.iter().cloned())
            .with_materialize_mode(section.materialize_mode);

        options = match &section.pattern {
            Some(pattern) => options.with_predicate(
                PatternPredicate::new(pattern)
                    .map_err(|e| FunnelError::ConfigError(format!("invalid pattern: {e}")))?,
            ),
            None => options.with_predicate(
                MarkerPredicate::new(section.marker.as_bytes())
                    .map_err(|e| FunnelError::ConfigError(format!("invalid marker: {e}")))?,
            ),
        };

        if let Some(annotation) = &section.annotation {
            options = options.with_annotation(annotation.clone());
        }
        Ok(options)
    }
}
