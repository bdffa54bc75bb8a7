//! Tracker configuration
//!
//! Loaded from and saved to JSON. Every field has a default so a partial file
//! only overrides what it names.

use crate::core::{DEFAULT_ALERT_DURATION_SECS, DEFAULT_MIN_DISTANCE_M};
use crate::source::PositionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Serialization {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum distance between breadcrumbs (meters)
    pub min_distance_m: f64,
    /// Lifetime of an undismissed urgent alert (seconds)
    pub alert_duration_secs: u64,
    /// How often the runtime sweeps expired alerts (milliseconds)
    pub expiry_tick_ms: u64,
    /// Profile used while tracking
    pub watch_options: PositionOptions,
    /// Profile used for one-shot position requests
    pub current_options: PositionOptions,
    /// Where tracking/voice toggles persist; in-memory when unset
    pub state_path: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
            alert_duration_secs: DEFAULT_ALERT_DURATION_SECS,
            expiry_tick_ms: 1_000,
            watch_options: PositionOptions::watch(),
            current_options: PositionOptions::one_shot(),
            state_path: None,
        }
    }
}

impl TrackerConfig {
    /// Load and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;
        let config: TrackerConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Serialization {
                path: path_str,
                source,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialization {
                path: path_str.clone(),
                source,
            })?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path_str,
            source,
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.min_distance_m.is_finite() || self.min_distance_m <= 0.0 {
            return Err(invalid(
                "min_distance_m",
                self.min_distance_m,
                "must be a positive number of meters",
            ));
        }
        if self.alert_duration_secs == 0 {
            return Err(invalid("alert_duration_secs", 0, "must be at least one second"));
        }
        if self.expiry_tick_ms == 0 {
            return Err(invalid("expiry_tick_ms", 0, "must be greater than zero"));
        }
        for (name, options) in [
            ("watch_options.timeout_ms", &self.watch_options),
            ("current_options.timeout_ms", &self.current_options),
        ] {
            if options.timeout_ms == 0 {
                return Err(invalid(name, 0, "must be greater than zero"));
            }
        }
        Ok(())
    }

    pub fn alert_duration(&self) -> Duration {
        Duration::from_secs(self.alert_duration_secs)
    }

    pub fn expiry_tick(&self) -> Duration {
        Duration::from_millis(self.expiry_tick_ms)
    }

    pub fn with_min_distance(mut self, min_distance_m: f64) -> Self {
        self.min_distance_m = min_distance_m;
        self
    }

    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
