// Pipeline execution and monitoring module
// Loads trials, runs the per-trial analysis and batches it over a data directory

pub mod batch;
pub mod loader;
pub mod trace;
pub mod trial;

pub use batch::{batch_process, plan_trials, BatchReport, SkippedTrial, TrialJob};
pub use loader::{find_trial_files, load_trial, parse_trial, subject_for_path, KinematicRecord};
pub use trace::{read_trace_file, TraceBuilder, TraceEntry, TraceError, TraceWriter};
pub use trial::{process_trial, ResultRow, TrialError, TrialOutcome, RESULT_COLUMNS};
