// Single-trial processing
// preprocess -> detect -> RSI -> bilateral combine, stamped with subject and trial

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::events::{JumpDetector, JumpEvent, Limb};
use crate::rsi::{combine_limbs, CombineStatus, CombinedRecord, RowKind, RsiCalculator};
use crate::signal::{preprocess_limb, SignalError, TrialSignals};

/// Errors that abort one trial (never the whole batch)
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("Failed to read trial file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse kinematic record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid trial signals: {0}")]
    Signal(#[from] SignalError),

    #[error("Trial worker failed: {0}")]
    Worker(String),
}

/// Output columns, in order
pub const RESULT_COLUMNS: [&str; 10] = [
    "Subject",
    "Trial",
    "Jump",
    "Limb",
    "GCT",
    "PeakHeight_Flight",
    "PeakHeight_Detected",
    "RSI_Flight",
    "RSI_Peak",
    "Asymmetry_Peak%",
];

/// One row of the final results table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Subject")]
    pub subject: String,

    #[serde(rename = "Trial")]
    pub trial: u32,

    #[serde(rename = "Jump")]
    pub jump: u32,

    #[serde(rename = "Limb")]
    pub limb: RowKind,

    #[serde(rename = "GCT")]
    pub gct: Option<f64>,

    #[serde(rename = "PeakHeight_Flight")]
    pub peak_height_flight: Option<f64>,

    #[serde(rename = "PeakHeight_Detected")]
    pub peak_height_detected: Option<f64>,

    #[serde(rename = "RSI_Flight")]
    pub rsi_flight: Option<f64>,

    #[serde(rename = "RSI_Peak")]
    pub rsi_peak: Option<f64>,

    #[serde(rename = "Asymmetry_Peak%")]
    pub asymmetry_peak_pct: Option<f64>,
}

impl ResultRow {
    pub fn from_combined(subject: &str, trial: u32, record: CombinedRecord) -> Self {
        ResultRow {
            subject: subject.to_string(),
            trial,
            jump: record.jump,
            limb: record.kind,
            gct: record.gct,
            peak_height_flight: record.peak_height_flight,
            peak_height_detected: record.peak_height_detected,
            rsi_flight: record.rsi_flight,
            rsi_peak: record.rsi_peak,
            asymmetry_peak_pct: record.asymmetry_peak_pct,
        }
    }
}

/// Everything produced for one trial
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub rows: Vec<ResultRow>,
    pub left_jumps: Vec<JumpEvent>,
    pub right_jumps: Vec<JumpEvent>,
    pub status: CombineStatus,
}

impl TrialOutcome {
    /// Number of limbs (0-2) without a single validated jump
    pub fn limbs_without_jumps(&self) -> usize {
        [&self.left_jumps, &self.right_jumps]
            .iter()
            .filter(|jumps| jumps.is_empty())
            .count()
    }
}

/// Run the full analysis for one trial
pub fn process_trial(
    signals: &TrialSignals,
    subject: &str,
    trial: u32,
    config: &AnalysisConfig,
) -> Result<TrialOutcome, TrialError> {
    let dt = signals.validate()?;
    let sample_rate = 1.0 / dt;

    let left = preprocess_limb(&signals.left, dt, config)?;
    let right = preprocess_limb(&signals.right, dt, config)?;

    let detector = JumpDetector::new(*config, sample_rate);
    let left_jumps = detector.detect_limb(&left);
    let right_jumps = detector.detect_limb(&right);

    log::info!(
        "{} trial {}: {} left / {} right jumps ({:.0} Hz)",
        subject,
        trial,
        left_jumps.len(),
        right_jumps.len(),
        sample_rate
    );

    let calculator = RsiCalculator::from_config(config);
    let left_records =
        calculator.compute_rsi_for_jumps(&signals.time, &left.filtered, &left_jumps, Limb::Left);
    let right_records =
        calculator.compute_rsi_for_jumps(&signals.time, &right.filtered, &right_jumps, Limb::Right);

    let table = combine_limbs(&left_records, &right_records);
    let rows = table
        .rows
        .into_iter()
        .map(|record| ResultRow::from_combined(subject, trial, record))
        .collect();

    Ok(TrialOutcome {
        rows,
        left_jumps,
        right_jumps,
        status: table.status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{drop_jump_position, time_axis};

    const FS: f64 = 100.0;

    fn trial(left_height: Option<f64>, right_height: Option<f64>) -> TrialSignals {
        let len = drop_jump_position(FS, 0.3).len();
        let limb = |height: Option<f64>| match height {
            Some(h) => drop_jump_position(FS, h),
            None => vec![0.0; len],
        };

        TrialSignals {
            time: time_axis(len, FS),
            left: limb(left_height),
            right: limb(right_height),
        }
    }

    #[test]
    fn test_filtered_drop_jump_detected() {
        let outcome = process_trial(&trial(Some(0.3), None), "s1", 1, &AnalysisConfig::default())
            .unwrap();

        assert_eq!(outcome.left_jumps.len(), 1);
        let jump = outcome.left_jumps[0];
        assert!(jump.is_ordered());

        // Raw-signal indices are (80, 108, 153); filtering moves them by a few samples
        let near = |idx: Option<usize>, expected: usize| idx.unwrap().abs_diff(expected) <= 3;
        assert!(near(jump.gc, 80), "gc = {:?}", jump.gc);
        assert!(near(jump.to, 108), "to = {:?}", jump.to);
        assert!(near(jump.ld, 153), "ld = {:?}", jump.ld);
    }

    #[test]
    fn test_single_limb_trial_rows() {
        let outcome = process_trial(&trial(Some(0.3), None), "s1", 2, &AnalysisConfig::default())
            .unwrap();

        assert_eq!(outcome.status, CombineStatus::SingleLimb(Limb::Left));
        assert_eq!(outcome.limbs_without_jumps(), 1);
        assert_eq!(outcome.rows.len(), 1);

        let row = &outcome.rows[0];
        assert_eq!((row.subject.as_str(), row.trial, row.jump), ("s1", 2, 1));
        assert_eq!(row.limb, RowKind::Left);

        let gct = row.gct.unwrap();
        assert!(gct > 0.2 && gct < 0.35, "gct = {}", gct);
        let height = row.peak_height_detected.unwrap();
        assert!(height > 0.25 && height < 0.32, "height = {}", height);
        assert!(row.rsi_peak.unwrap() > 0.0);
        assert!(row.asymmetry_peak_pct.is_none());
    }

    #[test]
    fn test_bilateral_trial_rows() {
        let outcome = process_trial(
            &trial(Some(0.3), Some(0.25)),
            "s1",
            1,
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.status, CombineStatus::Bilateral);
        assert_eq!(outcome.rows.len(), 3);

        let combined = &outcome.rows[2];
        assert_eq!(combined.limb, RowKind::Combined);
        let asym = combined.asymmetry_peak_pct.unwrap();
        assert!(asym > 0.0 && asym < 50.0, "asymmetry = {}", asym);
    }

    #[test]
    fn test_flat_trial_has_empty_table() {
        let outcome = process_trial(&trial(None, None), "s1", 1, &AnalysisConfig::default())
            .unwrap();

        assert_eq!(outcome.status, CombineStatus::NoJumps);
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.limbs_without_jumps(), 2);
    }

    #[test]
    fn test_structural_failure_is_an_error() {
        let signals = TrialSignals {
            time: vec![0.0, 0.01, 0.02],
            left: vec![0.0; 3],
            right: vec![0.0; 2],
        };
        let result = process_trial(&signals, "s1", 1, &AnalysisConfig::default());
        assert!(matches!(
            result,
            Err(TrialError::Signal(SignalError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn test_result_columns_match_serialized_names() {
        let row = ResultRow {
            subject: "s1".to_string(),
            trial: 1,
            jump: 1,
            limb: RowKind::Combined,
            gct: Some(0.25),
            peak_height_flight: None,
            peak_height_detected: None,
            rsi_flight: None,
            rsi_peak: None,
            asymmetry_peak_pct: Some(40.0),
        };
        let value = serde_json::to_value(&row).unwrap();
        let object = value.as_object().unwrap();

        for column in RESULT_COLUMNS {
            assert!(object.contains_key(column), "missing column {}", column);
        }
        assert_eq!(object["Limb"], "Combined");
    }
}
