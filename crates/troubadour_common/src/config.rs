//! Troubadour Configuration
//!
//! Configuration lives in /etc/troubadour/config.toml. Every key has a serde
//! default, so a missing file or a partial file is valid. The display-test
//! timing table is configuration, never hard-coded in the sequencer.

use crate::error::ConfigError;
use crate::wizard::TestPattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// System configuration directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/troubadour";
const CONFIG_FILE: &str = "config.toml";

/// Display-test timing table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTestConfig {
    /// Exposure of each timed pattern in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Ordered pattern list; the final entry is held until acknowledged
    #[serde(default = "default_patterns")]
    pub patterns: Vec<TestPattern>,
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_patterns() -> Vec<TestPattern> {
    vec![
        TestPattern::Red,
        TestPattern::Green,
        TestPattern::Blue,
        TestPattern::Calibration,
    ]
}

impl Default for DisplayTestConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            patterns: default_patterns(),
        }
    }
}

impl DisplayTestConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Where and how qualification records are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    #[serde(default = "default_record_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_record_prefix")]
    pub prefix: String,

    #[serde(default = "default_record_extension")]
    pub extension: String,
}

fn default_record_dir() -> PathBuf {
    PathBuf::from("troubadour_logs")
}

fn default_record_prefix() -> String {
    "troubadour".to_string()
}

fn default_record_extension() -> String {
    "json".to_string()
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            dir: default_record_dir(),
            prefix: default_record_prefix(),
            extension: default_record_extension(),
        }
    }
}

/// OS commands offered after a serial mismatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationConfig {
    #[serde(default = "default_reboot_command")]
    pub reboot_command: Vec<String>,

    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: Vec<String>,
}

fn default_reboot_command() -> Vec<String> {
    vec!["systemctl".to_string(), "reboot".to_string()]
}

fn default_shutdown_command() -> Vec<String> {
    vec!["systemctl".to_string(), "poweroff".to_string()]
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            reboot_command: default_reboot_command(),
            shutdown_command: default_shutdown_command(),
        }
    }
}

/// Presentation loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick period in milliseconds (valid: 10-1000)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    100
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl UiConfig {
    /// Clamp tick_ms to valid range (10-1000)
    pub fn effective_tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.clamp(10, 1000))
    }
}

/// Diagnostic logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Explicit trace file; discovered when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Complete Troubadour configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TroubadourConfig {
    #[serde(default)]
    pub display_test: DisplayTestConfig,

    #[serde(default)]
    pub record: RecordConfig,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl TroubadourConfig {
    /// Load config from the given file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tables the wizard cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display_test.patterns.is_empty() {
            return Err(ConfigError::Invalid(
                "display_test.patterns must list at least one pattern".to_string(),
            ));
        }
        if self.display_test.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "display_test.interval_ms must be positive".to_string(),
            ));
        }
        if self.escalation.reboot_command.is_empty() || self.escalation.shutdown_command.is_empty()
        {
            return Err(ConfigError::Invalid(
                "escalation commands must not be empty".to_string(),
            ));
        }
        if self.record.prefix.is_empty() || self.record.extension.is_empty() {
            return Err(ConfigError::Invalid(
                "record.prefix and record.extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the default config file path
pub fn config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIG_DIR).join(CONFIG_FILE)
}
