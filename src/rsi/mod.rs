// RSI module
// Per-limb Reactive Strength Index, bilateral combination and normative bands

pub mod bilateral;
pub mod calculator;
pub mod normative;

pub use bilateral::{asymmetry_pct, combine_limbs, BilateralTable, CombineStatus, CombinedRecord, RowKind};
pub use calculator::{RsiCalculator, RsiRecord};
pub use normative::{summarize_by_subject, RsiCategory, SubjectSummary};
