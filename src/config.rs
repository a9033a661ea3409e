//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and field is optional; an empty file yields the defaults.
//!
//! ```toml
//! [engine]
//! deadzone = 0.15
//! trigger_threshold = 0.5
//! smoothing = false
//! smooth_factor = 0.5
//! auto_start = true
//!
//! [poll]
//! rate_hz = 60
//!
//! [source]
//! input_dir = "/dev/input"
//! rescan_interval_ms = 1000
//!
//! [logging]
//! level = "info"
//! # file = "./logs/gc-input.log"
//!
//! [telemetry]
//! enabled = false
//! path = "./events.jsonl"
//! include_poll = false
//! ```

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::engine::EngineOptions;
use crate::error::{GcInputError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineOptions,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Tick loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

/// Input device discovery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path; logs go to stdout when unset.
    #[serde(default)]
    pub file: Option<String>,
}

/// Event telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_telemetry_path")]
    pub path: String,

    #[serde(default)]
    pub include_poll: bool,
}

// Default value functions
fn default_rate_hz() -> u32 { 60 }

fn default_input_dir() -> String { "/dev/input".to_string() }
fn default_rescan_interval_ms() -> u64 { 1000 }

fn default_log_level() -> String { "info".to_string() }

fn default_telemetry_path() -> String { "./events.jsonl".to_string() }

impl Default for PollConfig {
    fn default() -> Self {
        Self { rate_hz: default_rate_hz() }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            rescan_interval_ms: default_rescan_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_telemetry_path(),
            include_poll: false,
        }
    }
}

/// Accepted values for `logging.level`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gc_input::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate engine options
        for (name, value) in [
            ("deadzone", self.engine.deadzone),
            ("trigger_threshold", self.engine.trigger_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be between 0.0 and 1.0", name)));
            }
        }

        if self.engine.smooth_factor <= 0.0 || self.engine.smooth_factor > 1.0 {
            return Err(invalid("smooth_factor must be greater than 0.0 and at most 1.0"));
        }

        // Validate timing fields
        if self.poll.rate_hz == 0 || self.poll.rate_hz > 1000 {
            return Err(invalid("rate_hz must be between 1 and 1000"));
        }

        if self.source.rescan_interval_ms == 0 || self.source.rescan_interval_ms > 60000 {
            return Err(invalid("rescan_interval_ms must be between 1 and 60000"));
        }

        if self.source.input_dir.is_empty() {
            return Err(invalid("input_dir cannot be empty"));
        }

        // Validate logging
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        if matches!(&self.logging.file, Some(file) if file.is_empty()) {
            return Err(invalid("log file cannot be empty when set"));
        }

        // Validate telemetry
        if self.telemetry.enabled && self.telemetry.path.is_empty() {
            return Err(invalid("telemetry path cannot be empty when enabled"));
        }

        Ok(())
    }
}

fn invalid(message: impl std::fmt::Display) -> GcInputError {
    GcInputError::Config(toml::de::Error::custom(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_default_config() {
        let config = create_valid_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.engine, EngineOptions::default());
        assert_eq!(config.poll.rate_hz, 60);
        assert_eq!(config.source.input_dir, "/dev/input");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
        assert!(!config.telemetry.enabled);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[engine]
deadzone = 0.2
smoothing = true
smooth_factor = 0.3

[poll]
rate_hz = 120

[source]
input_dir = "/tmp/input"

[logging]
level = "debug"

[telemetry]
enabled = true
include_poll = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.engine.deadzone, 0.2);
        assert!(config.engine.smoothing);
        assert_eq!(config.engine.smooth_factor, 0.3);
        assert_eq!(config.engine.trigger_threshold, 0.5);
        assert_eq!(config.poll.rate_hz, 120);
        assert_eq!(config.source.input_dir, "/tmp/input");
        assert_eq!(config.source.rescan_interval_ms, 1000);
        assert_eq!(config.logging.level, "debug");
        assert!(config.telemetry.enabled);
        assert!(config.telemetry.include_poll);
        assert_eq!(config.telemetry.path, "./events.jsonl");
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/gc-input.toml");
        assert!(matches!(result, Err(GcInputError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml("[engine\ndeadzone = ");
        assert!(matches!(result, Err(GcInputError::Config(_))));
    }

    #[test]
    fn test_invalid_deadzone() {
        let mut config = create_valid_config();
        config.engine.deadzone = 1.5;
        assert!(config.validate().is_err());

        config.engine.deadzone = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deadzone_bounds_are_valid() {
        for value in [0.0, 1.0] {
            let mut config = create_valid_config();
            config.engine.deadzone = value;
            assert!(config.validate().is_ok(), "deadzone {} should be valid", value);
        }
    }

    #[test]
    fn test_invalid_trigger_threshold() {
        let mut config = create_valid_config();
        config.engine.trigger_threshold = 1.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_smooth_factor() {
        let mut config = create_valid_config();
        config.engine.smooth_factor = 0.0;
        assert!(config.validate().is_err());

        config.engine.smooth_factor = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_rate() {
        let mut config = create_valid_config();
        config.poll.rate_hz = 0;
        assert!(config.validate().is_err());

        config.poll.rate_hz = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_rescan_interval() {
        let mut config = create_valid_config();
        config.source.rescan_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_input_dir() {
        let mut config = create_valid_config();
        config.source.input_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = create_valid_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_log_file() {
        let mut config = create_valid_config();
        config.logging.file = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_telemetry_path_when_enabled() {
        let mut config = create_valid_config();
        config.telemetry.path = String::new();
        assert!(config.validate().is_ok());

        config.telemetry.enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_rate_hz(), 60);
        assert_eq!(default_input_dir(), "/dev/input");
        assert_eq!(default_rescan_interval_ms(), 1000);
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_telemetry_path(), "./events.jsonl");
    }
}
