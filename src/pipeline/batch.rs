// Batch processing
// Runs every trial under the data root in parallel; a failing trial is logged and skipped

use std::io;
use std::path::{Path, PathBuf};

use crate::config::AnalysisConfig;
use crate::pipeline::loader::{find_trial_files, load_trial, subject_for_path};
use crate::pipeline::trace::{TraceBuilder, TraceEntry, TraceWriter};
use crate::pipeline::trial::{process_trial, ResultRow, TrialError, TrialOutcome};

/// One trial file scheduled for processing
#[derive(Debug, Clone, PartialEq)]
pub struct TrialJob {
    pub subject: String,
    /// 1-based trial number within the subject
    pub trial: u32,
    pub path: PathBuf,
}

/// A trial that could not be processed
#[derive(Debug, Clone)]
pub struct SkippedTrial {
    pub subject: String,
    pub trial: u32,
    pub path: PathBuf,
    pub reason: String,
}

/// Aggregate result of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Concatenated result rows, in trial order
    pub rows: Vec<ResultRow>,
    pub trials_processed: usize,
    pub skipped: Vec<SkippedTrial>,
    /// Limbs (summed over trials) that produced no validated jump
    pub limbs_without_jumps: usize,
}

/// Discover trial files, grouped by subject in first-seen order
/// Trials are numbered from 1 within each subject, in path order
pub fn plan_trials(root: &Path) -> io::Result<Vec<TrialJob>> {
    let mut by_subject: Vec<(String, Vec<PathBuf>)> = Vec::new();

    for path in find_trial_files(root)? {
        let subject = subject_for_path(root, &path);
        match by_subject.iter_mut().find(|(name, _)| *name == subject) {
            Some((_, paths)) => paths.push(path),
            None => by_subject.push((subject, vec![path])),
        }
    }

    let jobs = by_subject
        .into_iter()
        .flat_map(|(subject, paths)| {
            paths.into_iter().zip(1..).map(move |(path, trial)| TrialJob {
                subject: subject.clone(),
                trial,
                path,
            })
        })
        .collect();

    Ok(jobs)
}

fn run_job(job: &TrialJob, config: &AnalysisConfig) -> Result<TrialOutcome, TrialError> {
    let signals = load_trial(&job.path)?;
    process_trial(&signals, &job.subject, job.trial, config)
}

/// Process all trials under `root`
///
/// Only a failure to list the data root aborts the batch. Per-trial failures
/// end up in `BatchReport::skipped`.
pub async fn batch_process(
    root: &Path,
    config: AnalysisConfig,
    trace: Option<&TraceWriter>,
) -> io::Result<BatchReport> {
    let jobs = plan_trials(root)?;
    let total = jobs.len();
    log::info!("Found {} trial files under {}", total, root.display());

    let mut entries = vec![TraceBuilder::batch()
        .start(format!("Processing {} trials", total))
        .with_data(serde_json::json!({ "root": root.display().to_string() }))];

    let handles: Vec<_> = jobs
        .iter()
        .cloned()
        .map(|job| tokio::task::spawn_blocking(move || run_job(&job, &config)))
        .collect();

    let mut report = BatchReport::default();
    for (idx, (job, handle)) in jobs.into_iter().zip(handles).enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(TrialError::Worker(e.to_string())),
        };
        let progress = (idx + 1) as f32 / total as f32;

        match result {
            Ok(outcome) => {
                entries.push(trial_entry(&job, progress, &outcome));
                report.trials_processed += 1;
                report.limbs_without_jumps += outcome.limbs_without_jumps();
                report.rows.extend(outcome.rows);
            }
            Err(e) => {
                log::error!(
                    "Skipping {} trial {} ({}): {}",
                    job.subject,
                    job.trial,
                    job.path.display(),
                    e
                );
                entries.push(
                    TraceBuilder::trial(job.subject.clone(), job.trial)
                        .progress(progress, "Skipped")
                        .with_data(serde_json::json!({
                            "path": job.path.display().to_string(),
                            "reason": e.to_string(),
                        })),
                );
                report.skipped.push(SkippedTrial {
                    subject: job.subject,
                    trial: job.trial,
                    path: job.path,
                    reason: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Batch complete: {} trials processed, {} skipped, {} rows, {} limbs without jumps",
        report.trials_processed,
        report.skipped.len(),
        report.rows.len(),
        report.limbs_without_jumps
    );

    entries.push(TraceBuilder::batch().complete("Batch complete").with_data(
        serde_json::json!({
            "processed": report.trials_processed,
            "skipped": report.skipped.len(),
            "rows": report.rows.len(),
        }),
    ));

    if let Some(writer) = trace {
        if let Err(e) = writer.write_batch(&entries) {
            log::warn!("Failed to write trace {}: {}", writer.path().display(), e);
        }
    }

    Ok(report)
}

fn trial_entry(job: &TrialJob, progress: f32, outcome: &TrialOutcome) -> TraceEntry {
    TraceBuilder::trial(job.subject.clone(), job.trial)
        .progress(progress, "Processed")
        .with_data(serde_json::json!({
            "path": job.path.display().to_string(),
            "left_jumps": outcome.left_jumps.len(),
            "right_jumps": outcome.right_jumps.len(),
            "rows": outcome.rows.len(),
        }))
}
