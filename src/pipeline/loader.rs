// Trial ingestion
// Locates per-subject trial files and reads the stored toe kinematics

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::pipeline::trial::TrialError;
use crate::signal::TrialSignals;

/// File extension of stored kinematic records
pub const TRIAL_EXTENSION: &str = "json";

/// Subject name used when a trial file sits directly in the data root
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Stored kinematic record, as exported by the motion-capture model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicRecord {
    pub body_kinematics: BodyKinematics,
}

/// Body kinematics channels used for jump analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyKinematics {
    /// Sample times (s)
    pub time: Vec<f64>,

    /// Left toe vertical translation (m)
    pub toes_l_ty: Vec<f64>,

    /// Right toe vertical translation (m)
    pub toes_r_ty: Vec<f64>,
}

impl From<KinematicRecord> for TrialSignals {
    fn from(record: KinematicRecord) -> Self {
        let body = record.body_kinematics;
        TrialSignals {
            time: body.time,
            left: body.toes_l_ty,
            right: body.toes_r_ty,
        }
    }
}

/// Parse a kinematic record from raw JSON bytes
pub fn parse_trial(data: &[u8]) -> Result<TrialSignals, TrialError> {
    let record: KinematicRecord = serde_json::from_slice(data)?;
    Ok(record.into())
}

/// Read a kinematic record from disk
pub fn load_trial(path: &Path) -> Result<TrialSignals, TrialError> {
    let data = fs::read(path)?;
    parse_trial(&data)
}

/// Recursively collect trial files under `root`, sorted by path
pub fn find_trial_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_trial_files(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_trial_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_trial_files(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(TRIAL_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

/// Subject name for a trial file: the first directory below the data root
pub fn subject_for_path(root: &Path, path: &Path) -> String {
    let Ok(relative) = path.strip_prefix(root) else {
        return UNKNOWN_SUBJECT.to_string();
    };

    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(subject), Some(_)) => subject.as_os_str().to_string_lossy().into_owned(),
        _ => UNKNOWN_SUBJECT.to_string(),
    }
}
