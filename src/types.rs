use std::str::FromStr;
use serde::Deserialize;

/// How far the filter looks for marked files below the input root.
///
/// - `Unrestricted`: every file at any depth is classified (default).
/// - `Shallow`: only root files and files exactly one directory deep are
///   classified, and each first-level directory stops at its first match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalScope {
    Shallow,
    Unrestricted,
}

impl Default for TraversalScope {
    fn default() -> Self {
        TraversalScope::Unrestricted
    }
}

impl FromStr for TraversalScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shallow" => Ok(TraversalScope::Shallow),
            "unrestricted" => Ok(TraversalScope::Unrestricted),
            other => Err(format!(
                "invalid traversal_scope: {other} (expected \"shallow\" or \"unrestricted\")"
            )),
        }
    }
}

/// How retained files are placed in the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterializeMode {
    /// Write a byte-for-byte copy of each retained file.
    Copy,
    /// Link each output entry to the input file. Falls back to `Copy` where
    /// symlinks are unavailable.
    Symlink,
}

impl Default for MaterializeMode {
    fn default() -> Self {
        MaterializeMode::Copy
    }
}

impl FromStr for MaterializeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copy" => Ok(MaterializeMode::Copy),
            "symlink" => Ok(MaterializeMode::Symlink),
            other => Err(format!(
                "invalid materialize_mode: {other} (expected \"copy\" or \"symlink\")"
            )),
        }
    }
}

/// Verbosity accepted by [`crate::logging::init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("invalid log level: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_scope_parses_case_insensitively() {
        assert_eq!(" Shallow ".parse::<TraversalScope>(), Ok(TraversalScope::Shallow));
        assert_eq!("UNRESTRICTED".parse::<TraversalScope>(), Ok(TraversalScope::Unrestricted));
        assert!("deep".parse::<TraversalScope>().is_err());
    }

    #[test]
    fn defaults_match_plain_funnel_behaviour() {
        assert_eq!(TraversalScope::default(), TraversalScope::Unrestricted);
        assert_eq!(MaterializeMode::default(), MaterializeMode::Copy);
    }

    #[test]
    fn log_level_accepts_warning_alias() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
