// src/config/validate.rs

use crate::config::model::{FunnelConfig, RawFunnelConfig};
use crate::errors::{FunnelError, Result};
use crate::predicate::{MarkerPredicate, PatternPredicate};
use crate::scan::build_include_set;

impl TryFrom<RawFunnelConfig> for FunnelConfig {
    type Error = crate::errors::FunnelError;

    fn try_from(raw: RawFunnelConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(FunnelConfig::new_unchecked(raw.funnel))
    }
}

fn validate_raw_config(cfg: &RawFunnelConfig) -> Result<()> {
    validate_predicate(cfg)?;
    validate_include(cfg)?;
    Ok(())
}

fn validate_predicate(cfg: &RawFunnelConfig) -> Result<()> {
    match &cfg.funnel.pattern {
        Some(pattern) => {
            PatternPredicate::new(pattern).map_err(|e| {
                FunnelError::ConfigError(format!("[funnel].pattern is not a valid regex: {e}"))
            })?;
        }
        None => {
            MarkerPredicate::new(cfg.funnel.marker.as_bytes()).map_err(|e| {
                FunnelError::ConfigError(format!("[funnel].marker is invalid: {e}"))
            })?;
        }
    }
    Ok(())
}

fn validate_include(cfg: &RawFunnelConfig) -> Result<()> {
    build_include_set(&cfg.funnel.include)?;
    Ok(())
}
