use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueHint};
use tracing_subscriber::EnvFilter;

use rsi_analyser::pipeline::{batch_process, ResultRow, TraceWriter, RESULT_COLUMNS};
use rsi_analyser::plots::{plot_gct_vs_peak_height, plot_rsi_normative};
use rsi_analyser::rsi::{summarize_by_subject, RowKind};
use rsi_analyser::state::{timestamp_suffix, write_results_csv, write_summary_csv};
use rsi_analyser::AnalysisConfig;

const HEAD_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(author, version, about = "Reactive Strength Index analysis of drop-jump trials", long_about = None)]
struct Cli {
    /// Data directory with one sub-folder of trial files per subject
    #[arg(default_value = "Data", value_hint = ValueHint::DirPath)]
    data_dir: PathBuf,

    /// Folder receiving the result tables
    #[arg(short, long, default_value = "results", value_hint = ValueHint::DirPath)]
    output: PathBuf,

    /// JSON file with analysis settings (missing fields keep their defaults)
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Low-pass cutoff frequency (Hz)
    #[arg(long)]
    cutoff: Option<f64>,

    /// Contact/flight height threshold above ground (m)
    #[arg(long)]
    rel_thresh: Option<f64>,

    /// Minimum flight displacement (m)
    #[arg(long)]
    jump_height_thresh: Option<f64>,

    /// Minimum velocity peak magnitude (m/s)
    #[arg(long)]
    vel_peak_thresh: Option<f64>,

    /// Maximum velocity magnitude at ground contact (m/s)
    #[arg(long)]
    vel_contact_thresh: Option<f64>,

    /// Row kind feeding the per-subject summary and the plots (Left, Right, Combined)
    #[arg(long, default_value = "Combined", value_parser = parse_row_kind)]
    summary_limb: RowKind,

    /// Skip the PNG charts
    #[arg(long)]
    no_plots: bool,

    /// Append a JSONL progress trace to this file
    #[arg(long, value_hint = ValueHint::FilePath)]
    trace: Option<PathBuf>,

    /// Enable debug logging (gate rejections)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_row_kind(value: &str) -> Result<RowKind, String> {
    RowKind::from_string(value).ok_or_else(|| format!("unknown row kind '{}'", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = build_config(&cli)?;
    log::debug!("Analysis config: {:?}", config);

    if !cli.data_dir.is_dir() {
        return Err(anyhow!(
            "data directory {} does not exist",
            cli.data_dir.display()
        ));
    }

    let trace = cli.trace.clone().map(TraceWriter::new);
    let report = batch_process(&cli.data_dir, config, trace.as_ref())
        .await
        .with_context(|| format!("failed to scan {}", cli.data_dir.display()))?;

    let suffix = timestamp_suffix();
    let results = write_results_csv(&cli.output, &report.rows, &suffix)
        .with_context(|| format!("failed to write results to {}", cli.output.display()))?;

    let summaries = summarize_by_subject(
        report
            .rows
            .iter()
            .filter(|row| row.limb == cli.summary_limb)
            .map(|row| (row.subject.as_str(), row.rsi_peak)),
    );
    let summary = write_summary_csv(&cli.output, &summaries, &suffix)
        .with_context(|| format!("failed to write summary to {}", cli.output.display()))?;

    if !cli.no_plots {
        // Plot failures are logged, never fatal
        let charts = [
            plot_gct_vs_peak_height(&report.rows, cli.summary_limb, &cli.output, &suffix),
            plot_rsi_normative(&report.rows, cli.summary_limb, &cli.output, &suffix),
        ];
        for chart in charts {
            match chart {
                Ok(path) => println!("Plot: {}", path.display()),
                Err(e) => log::warn!("Skipping plot: {}", e),
            }
        }
    }

    print_head(&report.rows);
    println!();
    println!("Results: {} (sha256 {})", results.path.display(), results.sha256);
    println!("Summary: {}", summary.path.display());

    log::info!(
        "{} trials processed, {} skipped, {} limbs without jumps",
        report.trials_processed,
        report.skipped.len(),
        report.limbs_without_jumps
    );

    Ok(())
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(v) = cli.cutoff {
        config.cutoff_hz = v;
    }
    if let Some(v) = cli.rel_thresh {
        config.rel_thresh_m = v;
    }
    if let Some(v) = cli.jump_height_thresh {
        config.jump_height_thresh_m = v;
    }
    if let Some(v) = cli.vel_peak_thresh {
        config.vel_peak_thresh_mps = v;
    }
    if let Some(v) = cli.vel_contact_thresh {
        config.vel_contact_thresh_mps = v;
    }

    config.validate().context("invalid analysis settings")?;
    Ok(config)
}

fn print_head(rows: &[ResultRow]) {
    println!("{}", RESULT_COLUMNS.join("\t"));
    for row in rows.iter().take(HEAD_ROWS) {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.subject,
            row.trial,
            row.jump,
            row.limb,
            fmt_value(row.gct),
            fmt_value(row.peak_height_flight),
            fmt_value(row.peak_height_detected),
            fmt_value(row.rsi_flight),
            fmt_value(row.rsi_peak),
            fmt_value(row.asymmetry_peak_pct),
        );
    }
    if rows.len() > HEAD_ROWS {
        println!("... {} more rows", rows.len() - HEAD_ROWS);
    }
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.3}", v))
}
