// src/logging.rs

//! Logging setup for `amd-funnel` using `tracing` + `tracing-subscriber`.
//!
//! The funnel is embedded in a host build tool, which normally owns the
//! global subscriber. This helper exists for hosts that don't.
//!
//! Priority for determining the log level:
//! 1. explicit `LogLevel` argument (if provided)
//! 2. `AMD_FUNNEL_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR.

use anyhow::{Result, anyhow};
use tracing_subscriber::fmt;

use crate::types::LogLevel;

pub const LOG_ENV_VAR: &str = "AMD_FUNNEL_LOG";

/// Initialise global logging subscriber.
///
/// Fails if another global subscriber is already installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let level = match level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    s.parse::<LogLevel>().ok().map(level_from_log_level)
}
