// Signal preprocessing
// Filters raw toe positions, derives velocity and estimates the standing ground level

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::signal::filter::{ButterworthLowpass, FILTER_ORDER};

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("Trial too short: {len} samples (need at least {min})")]
    TooShort { len: usize, min: usize },

    #[error("Length mismatch: expected {expected} samples, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Time is not strictly increasing at sample {index}")]
    NonIncreasingTime { index: usize },

    #[error("Non-finite sample at index {index}")]
    NonFinite { index: usize },

    #[error("Cutoff {cutoff_hz} Hz must be in (0, {nyquist_hz}) Hz")]
    InvalidCutoff { cutoff_hz: f64, nyquist_hz: f64 },

    #[error("Unsupported filter order: {0}")]
    InvalidOrder(usize),
}

/// Raw per-trial kinematics: one time base and a vertical toe position per limb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSignals {
    /// Sample times in seconds, strictly increasing and uniformly spaced
    pub time: Vec<f64>,

    /// Left toe vertical position (m)
    pub left: Vec<f64>,

    /// Right toe vertical position (m)
    pub right: Vec<f64>,
}

impl TrialSignals {
    /// Check structural invariants and return the sample interval
    pub fn validate(&self) -> Result<f64, SignalError> {
        for channel in [&self.left, &self.right] {
            if channel.len() != self.time.len() {
                return Err(SignalError::LengthMismatch {
                    expected: self.time.len(),
                    found: channel.len(),
                });
            }
            if let Some(index) = channel.iter().position(|v| !v.is_finite()) {
                return Err(SignalError::NonFinite { index });
            }
        }

        sample_interval(&self.time)
    }
}

/// Mean successive difference of the time base
pub fn sample_interval(time: &[f64]) -> Result<f64, SignalError> {
    if time.len() < 2 {
        return Err(SignalError::TooShort {
            len: time.len(),
            min: 2,
        });
    }

    if let Some(index) = time.iter().position(|t| !t.is_finite()) {
        return Err(SignalError::NonFinite { index });
    }

    for i in 1..time.len() {
        if time[i] <= time[i - 1] {
            return Err(SignalError::NonIncreasingTime { index: i });
        }
    }

    Ok((time[time.len() - 1] - time[0]) / (time.len() - 1) as f64)
}

/// Numerical derivative with respect to a uniform step
/// Central differences inside, one-sided differences at both ends
pub fn gradient(values: &[f64], dt: f64) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let mut out = Vec::with_capacity(n);
    out.push((values[1] - values[0]) / dt);
    for i in 1..n - 1 {
        out.push((values[i + 1] - values[i - 1]) / (2.0 * dt));
    }
    out.push((values[n - 1] - values[n - 2]) / dt);

    out
}

/// Mean of the last `round(window_s * sample_rate)` samples
/// The window is clamped to the signal, so short trials average what they have
pub fn ground_level(filtered: &[f64], sample_rate: f64, window_s: f64) -> f64 {
    if filtered.is_empty() {
        return 0.0;
    }

    let window = ((window_s * sample_rate).round() as usize).clamp(1, filtered.len());
    let tail = &filtered[filtered.len() - window..];

    tail.iter().sum::<f64>() / tail.len() as f64
}

/// Preprocessed signals for one limb
#[derive(Debug, Clone)]
pub struct LimbSignal {
    /// Zero-phase low-pass filtered position (m)
    pub filtered: Vec<f64>,

    /// Velocity of the filtered position (m/s)
    pub velocity: Vec<f64>,

    /// Standing ground level (m)
    pub ground: f64,
}

/// Filter one limb's raw position and derive velocity and ground level
pub fn preprocess_limb(
    raw: &[f64],
    dt: f64,
    config: &AnalysisConfig,
) -> Result<LimbSignal, SignalError> {
    let sample_rate = 1.0 / dt;
    let filter = ButterworthLowpass::new(FILTER_ORDER, config.cutoff_hz, sample_rate)?;

    let filtered = filter.filtfilt(raw);
    let velocity = gradient(&filtered, dt);
    let ground = ground_level(&filtered, sample_rate, config.ground_window_s);

    Ok(LimbSignal {
        filtered,
        velocity,
        ground,
    })
}
