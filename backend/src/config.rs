//! Guide configuration file and environment support.
//!
//! Configuration is read from a TOML file and can be overridden with
//! environment variables:
//!
//! ```toml
//! [timeline]
//! past_days_to_display = 1
//!
//! [worker]
//! boost_interval_ms = 1000
//! steady_interval_ms = 5000
//! boost_threshold = 4
//! immediate_run_wait_ms = 100
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ErrorContext, GuideError, GuideResult};

/// Upper bound for `timeline.past_days_to_display` (ten years).
pub const MAX_PAST_DAYS_TO_DISPLAY: u32 = 3650;

/// Complete guide configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideConfig {
    #[serde(default)]
    pub timeline: TimelineSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
}

/// Display window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// How many days of past schedule data the grid may show.
    #[serde(default = "default_past_days_to_display")]
    pub past_days_to_display: u32,
}

/// Refresh worker cadence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSettings {
    #[serde(default = "default_boost_interval_ms")]
    pub boost_interval_ms: u64,
    #[serde(default = "default_steady_interval_ms")]
    pub steady_interval_ms: u64,
    /// Unchanged cycles required before leaving boost mode.
    #[serde(default = "default_boost_threshold")]
    pub boost_threshold: u32,
    /// Upper bound on how long a forced refresh waits for the cycle to finish.
    #[serde(default = "default_immediate_run_wait_ms")]
    pub immediate_run_wait_ms: u64,
}

fn default_past_days_to_display() -> u32 {
    1
}

fn default_boost_interval_ms() -> u64 {
    1000
}

fn default_steady_interval_ms() -> u64 {
    5000
}

fn default_boost_threshold() -> u32 {
    4
}

fn default_immediate_run_wait_ms() -> u64 {
    100
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            past_days_to_display: default_past_days_to_display(),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            boost_interval_ms: default_boost_interval_ms(),
            steady_interval_ms: default_steady_interval_ms(),
            boost_threshold: default_boost_threshold(),
            immediate_run_wait_ms: default_immediate_run_wait_ms(),
        }
    }
}

impl WorkerSettings {
    pub fn boost_interval(&self) -> Duration {
        Duration::from_millis(self.boost_interval_ms)
    }

    pub fn steady_interval(&self) -> Duration {
        Duration::from_millis(self.steady_interval_ms)
    }

    pub fn immediate_run_wait(&self) -> Duration {
        Duration::from_millis(self.immediate_run_wait_ms)
    }
}

impl GuideConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if the file cannot be read, parsed, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> GuideResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GuideError::ConfigurationError {
                message: format!("Failed to read config file: {}", e),
                context: ErrorContext::new("from_file").with_details(path.display().to_string()),
            }
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> GuideResult<Self> {
        let config: GuideConfig = toml::from_str(content).map_err(|e| {
            GuideError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `guide.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> GuideResult<Self> {
        let search_paths = [
            PathBuf::from("guide.toml"),
            PathBuf::from("backend/guide.toml"),
            PathBuf::from("../guide.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(GuideError::configuration(
            "No guide.toml found in standard locations",
        ))
    }

    /// Apply environment variable overrides on top of `self`.
    ///
    /// # Environment Variables
    /// - `GUIDE_PAST_DAYS`: past days to display
    /// - `GUIDE_BOOST_INTERVAL_MS`: boost mode sleep interval
    /// - `GUIDE_STEADY_INTERVAL_MS`: steady state sleep interval
    /// - `GUIDE_BOOST_THRESHOLD`: unchanged cycles before steady state
    /// - `GUIDE_IMMEDIATE_RUN_WAIT_MS`: bounded wait of a forced refresh
    ///
    /// # Errors
    /// Returns an error if a variable is set but not a valid number, or the
    /// resulting configuration fails validation.
    pub fn with_env_overrides(mut self) -> GuideResult<Self> {
        if let Some(v) = env_number("GUIDE_PAST_DAYS")? {
            self.timeline.past_days_to_display = v;
        }
        if let Some(v) = env_number("GUIDE_BOOST_INTERVAL_MS")? {
            self.worker.boost_interval_ms = v;
        }
        if let Some(v) = env_number("GUIDE_STEADY_INTERVAL_MS")? {
            self.worker.steady_interval_ms = v;
        }
        if let Some(v) = env_number("GUIDE_BOOST_THRESHOLD")? {
            self.worker.boost_threshold = v;
        }
        if let Some(v) = env_number("GUIDE_IMMEDIATE_RUN_WAIT_MS")? {
            self.worker.immediate_run_wait_ms = v;
        }
        self.validate()?;
        Ok(self)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> GuideResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> GuideResult<()> {
        if self.timeline.past_days_to_display > MAX_PAST_DAYS_TO_DISPLAY {
            return Err(GuideError::configuration(format!(
                "past_days_to_display ({}) must not exceed {}",
                self.timeline.past_days_to_display, MAX_PAST_DAYS_TO_DISPLAY
            )));
        }
        let w = &self.worker;
        if w.boost_interval_ms == 0 || w.steady_interval_ms == 0 {
            return Err(GuideError::configuration(
                "worker intervals must be greater than zero",
            ));
        }
        if w.steady_interval_ms < w.boost_interval_ms {
            return Err(GuideError::configuration(format!(
                "steady_interval_ms ({}) must not be shorter than boost_interval_ms ({})",
                w.steady_interval_ms, w.boost_interval_ms
            )));
        }
        if w.boost_threshold == 0 {
            return Err(GuideError::configuration(
                "boost_threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> GuideResult<Option<T>> {
    let raw = match env::var(key) {
        Ok(raw) => raw,
        Err(_) => return Ok(None),
    };
    match raw.trim().parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(GuideError::ConfigurationError {
            message: format!("{} must be a valid number", key),
            context: ErrorContext::new("with_env_overrides").with_details(raw),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GuideConfig::default();
        assert_eq!(config.timeline.past_days_to_display, 1);
        assert_eq!(config.worker.boost_interval(), Duration::from_secs(1));
        assert_eq!(config.worker.steady_interval(), Duration::from_secs(5));
        assert_eq!(config.worker.boost_threshold, 4);
        assert_eq!(config.worker.immediate_run_wait(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[timeline]
past_days_to_display = 7

[worker]
boost_interval_ms = 250
steady_interval_ms = 2000
boost_threshold = 6
immediate_run_wait_ms = 50
"#;

        let config = GuideConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.timeline.past_days_to_display, 7);
        assert_eq!(config.worker.boost_interval_ms, 250);
        assert_eq!(config.worker.steady_interval_ms, 2000);
        assert_eq!(config.worker.boost_threshold, 6);
        assert_eq!(config.worker.immediate_run_wait_ms, 50);
    }

    #[test]
    fn test_parse_partial_config_fills_defaults() {
        let toml = r#"
[timeline]
past_days_to_display = 3
"#;

        let config = GuideConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.timeline.past_days_to_display, 3);
        assert_eq!(config.worker, WorkerSettings::default());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = GuideConfig::from_toml_str("").unwrap();
        assert_eq!(config, GuideConfig::default());
    }

    #[test]
    fn test_rejects_steady_shorter_than_boost() {
        let toml = r#"
[worker]
boost_interval_ms = 5000
steady_interval_ms = 1000
"#;

        let err = GuideConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, GuideError::ConfigurationError { .. }));
        assert!(err.to_string().contains("steady_interval_ms"));
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let mut config = GuideConfig::default();
        config.worker.boost_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_excessive_past_days() {
        let err = GuideConfig::from_toml_str("[timeline]\npast_days_to_display = 4000000000\n")
            .unwrap_err();
        assert!(matches!(err, GuideError::ConfigurationError { .. }));
        assert!(err.to_string().contains("past_days_to_display"));

        let mut config = GuideConfig::default();
        config.timeline.past_days_to_display = MAX_PAST_DAYS_TO_DISPLAY;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut config = GuideConfig::default();
        config.worker.boost_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = GuideConfig::from_toml_str("[worker\nboost = ").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = GuideConfig::from_file("/definitely/not/here/guide.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
        assert_eq!(err.context().operation.as_deref(), Some("from_file"));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.toml");
        std::fs::write(&path, "[timeline]\npast_days_to_display = 14\n").unwrap();

        let config = GuideConfig::from_file(&path).unwrap();
        assert_eq!(config.timeline.past_days_to_display, 14);
    }
}
