// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{FunnelConfig, RawFunnelConfig};
use crate::errors::{FunnelError, Result};

/// Parse TOML into a `RawFunnelConfig` without semantic validation.
pub fn load_from_str(contents: &str) -> Result<RawFunnelConfig> {
    let config: RawFunnelConfig = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from a given path and return the raw `RawFunnelConfig`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to also
/// check markers, patterns and globs.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawFunnelConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| FunnelError::io(path, e))?;
    load_from_str(&contents)
}

/// Load a configuration file from path and run validation.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<FunnelConfig> {
    let raw_config = load_from_path(&path)?;
    let config = FunnelConfig::try_from(raw_config)?;
    Ok(config)
}
