//! Configuration file
//!
//! JSON, loaded once at startup, immutable afterwards. Every field has a
//! default so an empty object `{}` is a valid configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::control::ControlConfig;
use crate::failover::ReconcilerOptions;
use crate::observability::{Logger, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Interval between periodic reconciliation passes (default 5000ms)
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Pause between bootstrap attempts that found the cluster unavailable
    /// (default 500ms)
    #[serde(default = "default_bootstrap_retry_ms")]
    pub bootstrap_retry_ms: u64,

    /// Minimum log severity: trace, info, warn, error, fatal (default info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Operator control plane
    #[serde(default)]
    pub control: ControlConfig,
}

fn default_check_interval_ms() -> u64 {
    5000
}

fn default_bootstrap_retry_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            bootstrap_retry_ms: default_bootstrap_retry_ms(),
            log_level: default_log_level(),
            control: ControlConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.check_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "check_interval_ms must be > 0".to_string(),
            ));
        }

        self.severity()?;
        self.control.validate().map_err(ConfigError::Invalid)?;

        Ok(())
    }

    /// Interval between periodic passes
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// Parsed minimum log severity
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level.parse().map_err(ConfigError::Invalid)
    }

    /// Apply the configured minimum severity to the process logger
    pub fn init_logging(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }

    /// Options for constructing a reconciler
    pub fn reconciler_options(&self) -> ReconcilerOptions {
        ReconcilerOptions {
            bootstrap_retry: Duration::from_millis(self.bootstrap_retry_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.check_interval(), Duration::from_secs(5));
        assert_eq!(
            config.reconciler_options().bootstrap_retry,
            Duration::from_millis(500)
        );
        assert!(!config.control.enabled);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = Config::from_json(r#"{"check_interval_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let err = Config::from_json(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_init_logging_applies_default_level() {
        let config = Config::default();
        config.init_logging().unwrap();
        assert_eq!(Logger::min_severity(), Severity::Info);
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"check_interval_ms": 250, "log_level": "warn", "control": {{"enabled": true, "port": 9400}}}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.check_interval_ms, 250);
        assert_eq!(config.severity().unwrap(), Severity::Warn);
        assert!(config.control.enabled);
        assert_eq!(config.control.port, 9400);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
