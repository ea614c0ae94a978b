// Reactive jump detection
// Single forward pass over filtered toe position with an explicit state machine:
// WaitingGc -> WaitingTo -> WaitingLd -> (validate) -> WaitingGc

use crate::config::AnalysisConfig;
use crate::events::types::JumpEvent;
use crate::signal::LimbSignal;

/// Scanner state, carrying the indices found so far for the current candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorState {
    /// Looking for ground contact after a drop
    WaitingGc,

    /// Foot on the ground, waiting for toe-off
    WaitingTo { gc: usize },

    /// In flight, waiting for landing
    WaitingLd { gc: usize, to: usize },
}

/// Why a candidate flight phase was discarded
#[derive(Debug, Clone, PartialEq)]
pub enum GateFailure {
    /// Position range during flight below `jump_height_thresh_m`
    Displacement { displacement_m: f64 },

    /// Velocity never changes sign during flight (monotonic drift)
    NoSignChange,

    /// Push-off or descent velocity below `vel_peak_thresh_mps`
    WeakVelocityPeak { max_mps: f64, min_mps: f64 },
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Check a flight phase `[to, ld)` against the plausibility gates, in order:
/// displacement, velocity sign change, then velocity peaks in both directions
pub fn validate_flight(
    position: &[f64],
    velocity: &[f64],
    to: usize,
    ld: usize,
    config: &AnalysisConfig,
) -> Result<(), GateFailure> {
    let end = ld.min(position.len()).min(velocity.len());
    if to >= end {
        return Err(GateFailure::Displacement {
            displacement_m: 0.0,
        });
    }

    let pos_segment = &position[to..end];
    let (pos_min, pos_max) = min_max(pos_segment);
    let displacement_m = pos_max - pos_min;
    if displacement_m < config.jump_height_thresh_m {
        return Err(GateFailure::Displacement { displacement_m });
    }

    let vel_segment = &velocity[to..end];
    if !vel_segment.windows(2).any(|w| sign(w[0]) != sign(w[1])) {
        return Err(GateFailure::NoSignChange);
    }

    let (min_mps, max_mps) = min_max(vel_segment);
    if max_mps < config.vel_peak_thresh_mps || min_mps.abs() < config.vel_peak_thresh_mps {
        return Err(GateFailure::WeakVelocityPeak { max_mps, min_mps });
    }

    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Ground-contact / toe-off / landing detector for one limb
#[derive(Debug, Clone)]
pub struct JumpDetector {
    config: AnalysisConfig,

    /// Samples searched before a candidate contact for the drop velocity peak
    lookback_samples: usize,
}

impl JumpDetector {
    /// Create a detector for signals sampled at `sample_rate` Hz
    pub fn new(config: AnalysisConfig, sample_rate: f64) -> Self {
        let lookback_samples = (config.contact_lookback_s * sample_rate).round() as usize;
        JumpDetector {
            config,
            lookback_samples,
        }
    }

    /// Ground contact: a strong downward velocity in the lookback window,
    /// and near-zero velocity at the sample itself
    fn is_contact(&self, velocity: &[f64], i: usize) -> bool {
        let window = &velocity[i.saturating_sub(self.lookback_samples)..=i];
        let dropped = window
            .iter()
            .any(|&v| v <= -self.config.vel_peak_thresh_mps);

        dropped && velocity[i].abs() <= self.config.vel_contact_thresh_mps
    }

    /// Detect validated jumps in chronological order
    /// An empty result is a normal outcome for trials without reactive jumps
    pub fn detect(&self, position: &[f64], velocity: &[f64], ground: f64) -> Vec<JumpEvent> {
        let threshold = ground + self.config.rel_thresh_m;
        let n = position.len().min(velocity.len());

        let mut jumps = Vec::new();
        let mut state = DetectorState::WaitingGc;

        for i in 1..n {
            let grounded = position[i] <= threshold;

            state = match state {
                DetectorState::WaitingGc if grounded && self.is_contact(velocity, i) => {
                    DetectorState::WaitingTo { gc: i }
                }
                DetectorState::WaitingTo { gc } if !grounded => DetectorState::WaitingLd { gc, to: i },
                DetectorState::WaitingLd { gc, to } if grounded => {
                    match validate_flight(position, velocity, to, i, &self.config) {
                        Ok(()) => jumps.push(JumpEvent::new(gc, to, i)),
                        Err(reason) => {
                            log::debug!(
                                "Rejected jump candidate gc={} to={} ld={}: {:?}",
                                gc,
                                to,
                                i,
                                reason
                            );
                        }
                    }
                    DetectorState::WaitingGc
                }
                unchanged => unchanged,
            };
        }

        jumps
    }

    /// Detect jumps on a preprocessed limb
    pub fn detect_limb(&self, limb: &LimbSignal) -> Vec<JumpEvent> {
        self.detect(&limb.filtered, &limb.velocity, limb.ground)
    }
}

/// Convenience wrapper: detect jumps on a preprocessed limb
pub fn detect_jumps(limb: &LimbSignal, sample_rate: f64, config: &AnalysisConfig) -> Vec<JumpEvent> {
    JumpDetector::new(*config, sample_rate).detect_limb(limb)
}
