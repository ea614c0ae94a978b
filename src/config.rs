// Analysis configuration
// Thresholds shared by preprocessing, jump detection and RSI calculation

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// Immutable per-run analysis settings
/// Passed by value into every trial, so parallel trials never share state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Low-pass filter cutoff frequency (Hz)
    pub cutoff_hz: f64,

    /// Height above ground level that separates contact from flight (m)
    pub rel_thresh_m: f64,

    /// Minimum vertical displacement during flight for a valid jump (m)
    pub jump_height_thresh_m: f64,

    /// Minimum velocity peak magnitude, both directions (m/s)
    pub vel_peak_thresh_mps: f64,

    /// Maximum velocity magnitude at the moment of ground contact (m/s)
    pub vel_contact_thresh_mps: f64,

    /// Gravitational acceleration for the flight-time height estimate (m/s^2)
    pub gravity_mps2: f64,

    /// Window before a candidate contact searched for the drop velocity peak (s)
    pub contact_lookback_s: f64,

    /// Trailing window averaged for the standing ground level (s)
    pub ground_window_s: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            cutoff_hz: 15.0,
            rel_thresh_m: 0.05,
            jump_height_thresh_m: 0.05,
            vel_peak_thresh_mps: 1.0,
            vel_contact_thresh_mps: 0.2,
            gravity_mps2: 9.81,
            contact_lookback_s: 0.4,
            ground_window_s: 1.5,
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a JSON file
    /// Fields missing from the file keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the pipeline meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("cutoff_hz", self.cutoff_hz),
            ("gravity_mps2", self.gravity_mps2),
            ("contact_lookback_s", self.contact_lookback_s),
            ("ground_window_s", self.ground_window_s),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        let non_negative = [
            ("rel_thresh_m", self.rel_thresh_m),
            ("jump_height_thresh_m", self.jump_height_thresh_m),
            ("vel_peak_thresh_mps", self.vel_peak_thresh_mps),
            ("vel_contact_thresh_mps", self.vel_contact_thresh_mps),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }

        Ok(())
    }
}
