//! Scan configuration types.

use std::time::Duration;

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::element::OwnerId;
use crate::error::ScanError;

/// Range length at or below which a task scans serially instead of forking.
pub const DEFAULT_LEAF_THRESHOLD: usize = 100;

/// Upper bound on one scan's wall time: two minutes.
pub const DEFAULT_TIMEOUT_MS: u64 = 2 * 60 * 1000;

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Largest range a single task processes without splitting.
    #[builder(default = "DEFAULT_LEAF_THRESHOLD")]
    #[serde(default = "default_leaf_threshold")]
    pub leaf_threshold: usize,

    /// Number of worker threads (0 = available parallelism).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Maximum wall time for one scan, in milliseconds.
    #[builder(default = "DEFAULT_TIMEOUT_MS")]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Allow root-context elements to be reported as eligible.
    #[builder(default = "false")]
    #[serde(default)]
    pub allow_unsafe: bool,

    /// Glob patterns naming the scanner's own elements.
    #[builder(default = "default_family_patterns()")]
    #[serde(default = "default_family_patterns")]
    pub family_patterns: Vec<String>,

    /// Owning contexts whose elements belong to the scanner.
    #[builder(default)]
    #[serde(default)]
    pub family_owners: Vec<OwnerId>,

    /// Name prefix for worker threads.
    #[builder(default = "default_thread_name_prefix()")]
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

fn default_leaf_threshold() -> usize {
    DEFAULT_LEAF_THRESHOLD
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_family_patterns() -> Vec<String> {
    vec!["loadscan::*".to_string(), "loadscan_*".to_string()]
}

fn default_thread_name_prefix() -> String {
    "loadscan-worker".to_string()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.leaf_threshold == Some(0) {
            return Err("Leaf threshold must be at least 1".to_string());
        }
        if self.timeout_ms == Some(0) {
            return Err("Timeout must be greater than zero".to_string());
        }
        if let Some(ref patterns) = self.family_patterns {
            compile_patterns(patterns).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config with every default.
    pub fn new() -> Self {
        Self {
            leaf_threshold: DEFAULT_LEAF_THRESHOLD,
            threads: 0,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            allow_unsafe: false,
            family_patterns: default_family_patterns(),
            family_owners: Vec::new(),
            thread_name_prefix: default_thread_name_prefix(),
        }
    }

    /// The scan timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Compile the family patterns into a matcher set.
    ///
    /// Configs that bypassed the builder (e.g. deserialized ones) are
    /// validated here.
    pub fn family_globs(&self) -> Result<GlobSet, ScanError> {
        compile_patterns(&self.family_patterns)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_patterns(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
            message: format!("bad family pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ScanError::InvalidConfig {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .leaf_threshold(8usize)
            .threads(4usize)
            .timeout_ms(500u64)
            .allow_unsafe(true)
            .build()
            .unwrap();

        assert_eq!(config.leaf_threshold, 8);
        assert_eq!(config.threads, 4);
        assert_eq!(config.timeout(), Duration::from_millis(500));
        assert!(config.allow_unsafe);
        assert_eq!(config.family_patterns, default_family_patterns());
    }

    #[test]
    fn test_config_defaults() {
        let config = ScanConfig::new();
        assert_eq!(config.leaf_threshold, 100);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert!(!config.allow_unsafe);
        assert_eq!(config.threads, 0);
    }

    #[test]
    fn test_rejects_zero_threshold_and_timeout() {
        assert!(ScanConfig::builder().leaf_threshold(0usize).build().is_err());
        assert!(ScanConfig::builder().timeout_ms(0u64).build().is_err());
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let result = ScanConfig::builder()
            .family_patterns(vec!["agent[".to_string()])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_family_globs() {
        let globs = ScanConfig::new().family_globs().unwrap();
        assert!(globs.is_match("loadscan::engine::Task"));
        assert!(globs.is_match("loadscan_probe"));
        assert!(!globs.is_match("app::loadscan"));
    }
}
