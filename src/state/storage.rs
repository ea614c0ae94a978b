// File system operations for storing result tables
use chrono::Local;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pipeline::{ResultRow, RESULT_COLUMNS};
use crate::rsi::SubjectSummary;

/// Summary table columns, in order
pub const SUMMARY_COLUMNS: [&str; 5] = [
    "Subject",
    "Jumps",
    "Mean_RSI_Peak",
    "Median_RSI_Peak",
    "Category",
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A file written to disk together with its content hash
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub sha256: String,
}

/// Ensure the output directory exists
pub fn results_dir(dir: &Path) -> StorageResult<PathBuf> {
    fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

/// Local-time suffix used in output file names (YYYYmmdd_HHMMSS)
pub fn timestamp_suffix() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Store a file in the output directory and return its path and SHA256 hash
pub fn store_file(dir: &Path, filename: &str, data: &[u8]) -> StorageResult<StoredFile> {
    let dir = results_dir(dir)?;
    let file_path = dir.join(filename);
    let mut file = fs::File::create(&file_path)?;
    file.write_all(data)?;

    Ok(StoredFile {
        path: file_path,
        sha256: calculate_sha256(data),
    })
}

/// Calculate SHA256 hash of data
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// Header is written by hand so an empty table still carries its schema
fn encode_csv<T: Serialize>(columns: &[&str], rows: &[T]) -> StorageResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))
}

/// Write the long-format results table as `rsi_results_<suffix>.csv`
pub fn write_results_csv(
    dir: &Path,
    rows: &[ResultRow],
    suffix: &str,
) -> StorageResult<StoredFile> {
    let data = encode_csv(&RESULT_COLUMNS, rows)?;
    let stored = store_file(dir, &format!("rsi_results_{}.csv", suffix), &data)?;
    log::info!(
        "Wrote {} result rows to {} (sha256 {})",
        rows.len(),
        stored.path.display(),
        stored.sha256
    );
    Ok(stored)
}

/// Write the per-subject summary as `rsi_subject_summary_<suffix>.csv`
pub fn write_summary_csv(
    dir: &Path,
    summaries: &[SubjectSummary],
    suffix: &str,
) -> StorageResult<StoredFile> {
    let data = encode_csv(&SUMMARY_COLUMNS, summaries)?;
    let stored = store_file(dir, &format!("rsi_subject_summary_{}.csv", suffix), &data)?;
    log::info!(
        "Wrote {} subject summaries to {}",
        summaries.len(),
        stored.path.display()
    );
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsi::{RowKind, RsiCategory};
    use tempfile::TempDir;

    fn row(kind: RowKind, asymmetry: Option<f64>) -> ResultRow {
        ResultRow {
            subject: "s1".to_string(),
            trial: 1,
            jump: 1,
            limb: kind,
            gct: Some(0.25),
            peak_height_flight: Some(0.3),
            peak_height_detected: Some(0.29),
            rsi_flight: Some(1.2),
            rsi_peak: Some(1.16),
            asymmetry_peak_pct: asymmetry,
        }
    }

    #[test]
    fn test_calculate_sha256() {
        let data = b"hello world";
        let hash = calculate_sha256(data);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_timestamp_suffix_format() {
        let suffix = timestamp_suffix();
        assert_eq!(suffix.len(), 15);
        assert_eq!(suffix.as_bytes()[8], b'_');
        assert!(suffix.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_store_file_creates_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("results/nested");
        let stored = store_file(&dir, "out.txt", b"hello world").unwrap();

        assert_eq!(fs::read(&stored.path).unwrap(), b"hello world");
        assert_eq!(stored.sha256, calculate_sha256(b"hello world"));
    }

    #[test]
    fn test_empty_results_keep_header() {
        let temp_dir = TempDir::new().unwrap();
        let stored = write_results_csv(temp_dir.path(), &[], "20240101_120000").unwrap();

        assert!(stored.path.ends_with("rsi_results_20240101_120000.csv"));
        let contents = fs::read_to_string(&stored.path).unwrap();
        assert_eq!(contents.trim_end(), RESULT_COLUMNS.join(","));
    }

    #[test]
    fn test_results_csv_rows() {
        let temp_dir = TempDir::new().unwrap();
        let rows = vec![row(RowKind::Left, None), row(RowKind::Combined, Some(40.0))];
        let stored = write_results_csv(temp_dir.path(), &rows, "x").unwrap();

        let contents = fs::read_to_string(&stored.path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "s1,1,1,Left,0.25,0.3,0.29,1.2,1.16,");
        assert!(lines[2].starts_with("s1,1,1,Combined,"));
        assert!(lines[2].ends_with(",40.0"));
    }

    #[test]
    fn test_summary_csv() {
        let temp_dir = TempDir::new().unwrap();
        let summaries = vec![SubjectSummary {
            subject: "s1".to_string(),
            jumps: 2,
            mean_rsi_peak: Some(1.0),
            median_rsi_peak: Some(1.0),
            category: Some(RsiCategory::Average),
        }];
        let stored = write_summary_csv(temp_dir.path(), &summaries, "x").unwrap();

        let contents = fs::read_to_string(&stored.path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], SUMMARY_COLUMNS.join(","));
        assert_eq!(lines[1], "s1,2,1.0,1.0,Average");
    }
}
