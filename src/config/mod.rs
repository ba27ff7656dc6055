//! Configuration for the swatchbooth kiosk
//!
//! Deployment-fixed options live in a TOML file: serial baud rate, the
//! device-name patterns used to pick the sensor port, the overrun byte
//! threshold, reconnect backoff and post-capture settle delay, and the
//! overrun recovery strategy.
//!
//! # File Location
//!
//! By default the config is read from the platform data directory:
//! - **Linux**: `~/.local/share/rs.swatchbooth/swatchbooth.toml`
//! - **macOS**: `~/Library/Application Support/rs.swatchbooth/swatchbooth.toml`
//! - **Windows**: `%APPDATA%\rs.swatchbooth\swatchbooth.toml`
//!
//! A missing file yields defaults; a malformed one is an error (a kiosk
//! silently running with wrong thresholds is worse than failing to start).

use crate::error::{Result, SwatchboothError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "rs.swatchbooth";

/// Config filename inside the app data directory
pub const CONFIG_FILE: &str = "swatchbooth.toml";

/// Sensor wire speed, fixed per deployment
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Overrun threshold in bytes, roughly one full RGB message.
/// Calibrated empirically on the deployed reader, not computed.
pub const DEFAULT_BACKLOG_LIMIT: u32 = 14;

/// Backoff before a reconnection attempt after a link fault
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 1_000;

/// Pause after a capture event before sampling resumes
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 10_000;

/// Upper bound on a single blocking line read
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 200;

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Default path of the config file, if the data dir is known
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// How the supervisor recovers once the backlog exceeds the limit.
///
/// Both observed deployment variants are supported; which one a station
/// uses is a per-deployment choice, not a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverrunStrategy {
    /// Drop all pending bytes (and any buffered partial line) and resume
    /// reading in place
    #[default]
    DiscardAndResume,
    /// Drop the backlog, then ask the external process supervisor for a
    /// cold restart; guarantees no partial-line state survives
    RequestRestart,
}

/// Serial link options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Wire speed; fixed per deployment
    pub baud_rate: u32,
    /// Device-name prefixes the sensor may enumerate under; a port matches
    /// when its name is `<prefix><digits>`
    pub port_patterns: Vec<String>,
    /// Upper bound on a single blocking line read, in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            port_patterns: vec!["/dev/ttyACM".to_string(), "COM".to_string()],
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Sample loop timing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Backlog size above which overrun recovery runs, in bytes
    pub backlog_limit: u32,
    /// Delay before a reconnection attempt, in milliseconds
    pub reconnect_delay_ms: u64,
    /// Pause after a capture event, in milliseconds
    pub settle_delay_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            backlog_limit: DEFAULT_BACKLOG_LIMIT,
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl SamplingConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Fault recovery options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RecoveryConfig {
    /// What to do when the backlog exceeds the limit
    pub overrun_strategy: OverrunStrategy,
}

/// Complete kiosk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SwatchboothError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            SwatchboothError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist yet
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            tracing::warn!("could not determine app data directory, using defaults");
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SwatchboothError::Config(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SwatchboothError::Config(format!("failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            SwatchboothError::Config(format!("failed to write {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment_constants() {
        let config = AppConfig::default();
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.sampling.backlog_limit, 14);
        assert_eq!(config.sampling.reconnect_delay(), Duration::from_secs(1));
        assert_eq!(config.sampling.settle_delay(), Duration::from_secs(10));
        assert_eq!(
            config.recovery.overrun_strategy,
            OverrunStrategy::DiscardAndResume
        );
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = AppConfig::default();
        config.serial.baud_rate = 9_600;
        config.recovery.overrun_strategy = OverrunStrategy::RequestRestart;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[sampling]\nbacklog_limit = 64\n").unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.sampling.backlog_limit, 64);
        assert_eq!(loaded.serial.baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "serial = \"nope").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }
}
