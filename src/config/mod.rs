// src/config/mod.rs

//! Optional TOML configuration for the funnel.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk or a string (`loader.rs`).
//! - Validate markers, patterns and globs up front (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_from_str};
pub use model::{FunnelConfig, FunnelSection, RawFunnelConfig};
