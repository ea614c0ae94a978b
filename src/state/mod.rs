// State management module
// Handles result files written to the output directory

pub mod storage;

pub use storage::{
    calculate_sha256, results_dir, store_file, timestamp_suffix, write_results_csv,
    write_summary_csv, StorageError, StoredFile, SUMMARY_COLUMNS,
};
