//! Configuration management for Tribeca
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{Result, TribecaError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default cadence for reading last-known cloud-cached vehicle data (seconds)
pub const DEFAULT_SCAN_INTERVAL: u64 = 300;

/// Minimum allowed cloud fetch cadence (seconds)
pub const MIN_SCAN_INTERVAL: u64 = 60;

/// Default cadence for commanding a live poll of the physical vehicle (seconds)
pub const DEFAULT_HARD_POLL_INTERVAL: u64 = 7200;

/// Minimum allowed live poll cadence (seconds)
pub const MIN_HARD_POLL_INTERVAL: u64 = 300;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// MySubaru account credentials
    pub account: AccountConfig,

    /// Polling cadence configuration
    #[serde(default)]
    pub polling: PollingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Web server binding configuration
    #[serde(default)]
    pub web: WebConfig,
}

/// MySubaru account credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account username (email address)
    pub username: String,

    /// Account password
    pub password: String,

    /// Registered device identifier for this client
    pub device_id: String,

    /// PIN authorizing remote commands
    pub pin: String,
}

/// Polling cadence configuration
///
/// Two independent intervals: `scan_interval_secs` controls how often the
/// coordinator asks the cloud for its last-known data, and
/// `hard_poll_interval_secs` throttles how often a live poll of the physical
/// vehicle is commanded. Live polls are expensive and rate-limited upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Cloud data fetch cadence in seconds
    pub scan_interval_secs: u64,

    /// Live vehicle poll cadence in seconds
    pub hard_poll_interval_secs: u64,
}

impl PollingConfig {
    /// Soft interval as a [`Duration`]
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    /// Hard interval as a [`Duration`]
    pub fn hard_poll_interval(&self) -> Duration {
        Duration::from_secs(self.hard_poll_interval_secs)
    }

    /// Validate the configured intervals against their minimums
    pub fn validate(&self) -> Result<()> {
        if self.scan_interval_secs < MIN_SCAN_INTERVAL {
            return Err(TribecaError::validation(
                "polling.scan_interval_secs".to_string(),
                format!("Must be at least {} seconds", MIN_SCAN_INTERVAL),
            ));
        }
        if self.hard_poll_interval_secs < MIN_HARD_POLL_INTERVAL {
            return Err(TribecaError::validation(
                "polling.hard_poll_interval_secs".to_string(),
                format!("Must be at least {} seconds", MIN_HARD_POLL_INTERVAL),
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (or directory for rotated files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            device_id: String::new(),
            pin: String::new(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: DEFAULT_SCAN_INTERVAL,
            hard_poll_interval_secs: DEFAULT_HARD_POLL_INTERVAL,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/tribeca.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8092,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: AccountConfig::default(),
            polling: PollingConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "tribeca_config.yaml",
            "/data/tribeca_config.yaml",
            "/etc/tribeca/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.account.username.is_empty() {
            return Err(TribecaError::validation(
                "account.username",
                "Username cannot be empty",
            ));
        }

        if self.account.password.is_empty() {
            return Err(TribecaError::validation(
                "account.password",
                "Password cannot be empty",
            ));
        }

        if self.account.device_id.is_empty() {
            return Err(TribecaError::validation(
                "account.device_id",
                "Device identifier cannot be empty",
            ));
        }

        if self.account.pin.is_empty() {
            return Err(TribecaError::validation(
                "account.pin",
                "PIN cannot be empty",
            ));
        }

        self.polling.validate()?;

        if self.web.port == 0 {
            return Err(TribecaError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> Config {
        let mut config = Config::default();
        config.account.username = "user@example.com".to_string();
        config.account.password = "hunter2".to_string();
        config.account.device_id = "1612345678901".to_string();
        config.account.pin = "1234".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.polling.scan_interval_secs, DEFAULT_SCAN_INTERVAL);
        assert_eq!(
            config.polling.hard_poll_interval_secs,
            DEFAULT_HARD_POLL_INTERVAL
        );
        assert_eq!(config.web.port, 8092);
    }

    #[test]
    fn test_config_validation() {
        let config = populated();
        assert!(config.validate().is_ok());

        // Missing credentials
        let mut bad = populated();
        bad.account.username = String::new();
        assert!(bad.validate().is_err());

        // Soft interval below minimum
        let mut bad = populated();
        bad.polling.scan_interval_secs = MIN_SCAN_INTERVAL - 1;
        assert!(bad.validate().is_err());

        // Hard interval below minimum
        let mut bad = populated();
        bad.polling.hard_poll_interval_secs = MIN_HARD_POLL_INTERVAL - 1;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_interval_durations() {
        let polling = PollingConfig::default();
        assert_eq!(polling.scan_interval(), Duration::from_secs(300));
        assert_eq!(polling.hard_poll_interval(), Duration::from_secs(7200));
    }

    #[test]
    fn test_config_serialization() {
        let config = populated();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.account.username, deserialized.account.username);
        assert_eq!(config.polling, deserialized.polling);
    }
}
