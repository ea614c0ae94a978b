// Reactive Strength Index calculation
// Two height estimates per jump: flight time (h = g * t^2 / 8) and detected peak displacement

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::events::{JumpEvent, Limb};

/// Per-jump metrics for one limb
/// Every metric is optional: unset means undefined, not zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiRecord {
    /// Jump ordinal, starting at 1 in detection order
    pub jump: u32,

    pub limb: Limb,

    /// Ground contact time, toe-off minus ground contact (s)
    pub gct: Option<f64>,

    /// Jump height from flight time (m)
    pub peak_height_flight: Option<f64>,

    /// Peak flight position above the mean contact-phase position (m)
    pub peak_height_detected: Option<f64>,

    /// peak_height_flight / gct
    pub rsi_flight: Option<f64>,

    /// peak_height_detected / gct
    pub rsi_peak: Option<f64>,
}

/// Converts detected jump events into RSI records
#[derive(Debug, Clone, Copy)]
pub struct RsiCalculator {
    /// Gravitational acceleration (m/s^2)
    gravity: f64,
}

impl RsiCalculator {
    pub fn new(gravity: f64) -> Self {
        RsiCalculator { gravity }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.gravity_mps2)
    }

    /// Compute metrics for a single jump
    /// Missing or out-of-range indices leave the dependent metrics unset
    pub fn compute_jump(
        &self,
        time: &[f64],
        position: &[f64],
        jump: &JumpEvent,
        ordinal: u32,
        limb: Limb,
    ) -> RsiRecord {
        let n = time.len().min(position.len());
        let valid = |idx: Option<usize>| idx.filter(|&i| i < n);
        let (gc, to, ld) = (valid(jump.gc), valid(jump.to), valid(jump.ld));

        let gct = gc.zip(to).map(|(gc, to)| time[to] - time[gc]);
        let flight_time = to.zip(ld).map(|(to, ld)| time[ld] - time[to]);

        let peak_height_flight = flight_time
            .filter(|&t| t > 0.0)
            .map(|t| self.gravity * t * t / 8.0);

        let peak = to
            .zip(ld)
            .filter(|(to, ld)| to < ld)
            .map(|(to, ld)| max(&position[to..ld]));
        let baseline = gc
            .zip(to)
            .filter(|(gc, to)| gc < to)
            .map(|(gc, to)| mean(&position[gc..to]));
        let peak_height_detected = peak.zip(baseline).map(|(peak, base)| peak - base);

        // RSI only for a known, positive contact time
        let contact = gct.filter(|&t| t > 0.0);
        let rsi_flight = contact
            .zip(peak_height_flight)
            .map(|(gct, h)| h / gct);
        let rsi_peak = contact
            .zip(peak_height_detected)
            .map(|(gct, h)| h / gct);

        RsiRecord {
            jump: ordinal,
            limb,
            gct,
            peak_height_flight,
            peak_height_detected,
            rsi_flight,
            rsi_peak,
        }
    }

    /// Compute metrics for every jump of one limb, numbered from 1
    pub fn compute_rsi_for_jumps(
        &self,
        time: &[f64],
        position: &[f64],
        jumps: &[JumpEvent],
        limb: Limb,
    ) -> Vec<RsiRecord> {
        jumps
            .iter()
            .zip(1..)
            .map(|(jump, ordinal)| self.compute_jump(time, position, jump, ordinal, limb))
            .collect()
    }
}

impl Default for RsiCalculator {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
