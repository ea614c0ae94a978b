// RSI Analyser - Reactive Strength Index from toe kinematics
// Module declarations

pub mod config;
pub mod events;
pub mod pipeline;
pub mod plots;
pub mod rsi;
pub mod signal;
pub mod state;

#[cfg(test)]
mod test_support;

pub use config::{AnalysisConfig, ConfigError};
pub use events::{detect_jumps, JumpDetector, JumpEvent, Limb};
pub use pipeline::{batch_process, process_trial, BatchReport, ResultRow, TrialError};
pub use rsi::{combine_limbs, CombinedRecord, RowKind, RsiCalculator, RsiRecord};
pub use signal::{SignalError, TrialSignals};
