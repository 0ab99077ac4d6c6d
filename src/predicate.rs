// src/predicate.rs

//! Content predicates deciding which files the funnel drops.
//!
//! A predicate sees the full raw bytes of one file and answers "exclude?".
//! Predicates must be deterministic: the funnel re-runs them on every build
//! and relies on equal input giving equal answers.

use std::fmt;

use anyhow::{Result, bail};
use regex::bytes::Regex;

/// Prefix emitted by transpilers that wrap output in an AMD `define(...)` call.
pub const AMD_MARKER: &str = "define(";

/// Decides from raw file content whether a file is excluded.
pub trait MatchPredicate: Send + Sync {
    /// `Ok(true)` means "exclude this file". An `Err` aborts the build.
    fn matches(&self, content: &[u8]) -> Result<bool>;

    /// Short label used in logs.
    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

/// Matches content starting with a fixed literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPredicate {
    marker: Vec<u8>,
}

impl MarkerPredicate {
    /// Fails on an empty marker, which would match every file.
    pub fn new(marker: impl Into<Vec<u8>>) -> Result<Self> {
        let marker = marker.into();
        if marker.is_empty() {
            bail!("marker must not be empty");
        }
        Ok(Self { marker })
    }

    /// The default predicate: content begins with [`AMD_MARKER`].
    pub fn amd() -> Self {
        Self {
            marker: AMD_MARKER.as_bytes().to_vec(),
        }
    }
}

impl Default for MarkerPredicate {
    fn default() -> Self {
        Self::amd()
    }
}

impl MatchPredicate for MarkerPredicate {
    fn matches(&self, content: &[u8]) -> Result<bool> {
        Ok(content.starts_with(&self.marker))
    }

    fn describe(&self) -> String {
        format!("starts with {:?}", String::from_utf8_lossy(&self.marker))
    }
}

/// Matches content where a regular expression matches at offset zero.
///
/// Useful when the producer may emit a BOM, a license banner or leading
/// whitespace before the wrapper.
#[derive(Debug, Clone)]
pub struct PatternPredicate {
    pattern: String,
    anchored: Regex,
}

impl PatternPredicate {
    pub fn new(pattern: &str) -> Result<Self> {
        // Validate on its own first so errors point at the caller's pattern.
        Regex::new(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            anchored: Regex::new(&format!("^(?:{pattern})"))?,
        })
    }
}

impl MatchPredicate for PatternPredicate {
    fn matches(&self, content: &[u8]) -> Result<bool> {
        Ok(self.anchored.is_match(content))
    }

    fn describe(&self) -> String {
        format!("matches /{}/ at start", self.pattern)
    }
}

/// Wraps a closure as a predicate.
pub struct FnPredicate<F> {
    f: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&[u8]) -> Result<bool> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredicate").finish_non_exhaustive()
    }
}

impl<F> MatchPredicate for FnPredicate<F>
where
    F: Fn(&[u8]) -> Result<bool> + Send + Sync,
{
    fn matches(&self, content: &[u8]) -> Result<bool> {
        (self.f)(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amd_marker_only_matches_at_start() {
        let p = MarkerPredicate::amd();
        assert!(p.matches(b"define('amd', function() {});").unwrap());
        assert!(!p.matches(b"export { es6 } from './es6';").unwrap());
        assert!(!p.matches(b"  define('late', function() {});").unwrap());
        assert!(!p.matches(b"").unwrap());
    }

    #[test]
    fn pattern_predicate_requires_match_at_offset_zero() {
        let p = PatternPredicate::new(r"\s*define\(").unwrap();
        assert!(p.matches(b"\n  define('x', [], f);").unwrap());
        assert!(!p.matches(b"// define('x')").unwrap());
    }

    #[test]
    fn empty_marker_is_rejected() {
        assert!(MarkerPredicate::new("").is_err());
        let p = MarkerPredicate::new("System.register(").unwrap();
        assert!(p.matches(b"System.register([], f)").unwrap());
        assert!(!p.matches(b"define(").unwrap());
    }

    #[test]
    fn pattern_alternation_is_anchored_as_a_whole() {
        let p = PatternPredicate::new("define\\(|System\\.register\\(").unwrap();
        assert!(p.matches(b"System.register([], f)").unwrap());
        assert!(!p.matches(b"x = 1; define('late', f)").unwrap());
        assert!(!p.matches(&[b' '; 4096]).unwrap());
        assert_eq!(p.describe(), r"matches /define\(|System\.register\(/ at start");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(PatternPredicate::new("define(").is_err());
    }

    #[test]
    fn fn_predicate_propagates_errors() {
        let p = FnPredicate::new(|content: &[u8]| {
            if content.is_empty() {
                bail!("empty input");
            }
            Ok(content[0] == b'd')
        });
        assert!(p.matches(b"define(").unwrap());
        assert!(p.matches(b"").is_err());
    }
}
