// PNG chart rendering
// GCT vs peak height scatter and per-subject RSI over the normative bands

use std::fs;
use std::panic;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use thiserror::Error;

use crate::pipeline::ResultRow;
use crate::plots::series::{padded_max, scatter_series, subject_rsi, ScatterSeries, SubjectRsi};
use crate::rsi::{RowKind, RsiCategory};

const SCATTER_SIZE: (u32, u32) = (1200, 720);
const NORMATIVE_SIZE: (u32, u32) = (1440, 720);

/// Top of the Excellent band when no value goes higher
const RSI_AXIS_FLOOR: f64 = 2.5;

/// Room on the right of the normative chart for band labels (x units)
const BAND_LABEL_WIDTH: f64 = 1.4;

const POINT_COLOR: RGBColor = RGBColor(135, 206, 235);

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("plotting error: {0}")]
    Render(String),

    #[error("plotting backend panicked")]
    Panicked,
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

fn band_color(category: RsiCategory) -> RGBColor {
    match category {
        RsiCategory::Poor => RGBColor(255, 204, 204),
        RsiCategory::BelowAverage => RGBColor(255, 255, 204),
        RsiCategory::Average => RGBColor(204, 255, 204),
        RsiCategory::Good => RGBColor(204, 229, 255),
        RsiCategory::Excellent => RGBColor(229, 204, 255),
    }
}

// Font lookup failures inside the backend can panic; keep them from taking the run down
fn render_guarded(path: PathBuf, draw: impl FnOnce(&Path) -> DrawResult) -> Result<PathBuf, PlotError> {
    panic::catch_unwind(panic::AssertUnwindSafe(|| draw(&path)))
        .map_err(|_| PlotError::Panicked)?
        .map_err(|e| PlotError::Render(e.to_string()))?;
    Ok(path)
}

/// Scatter of GCT against PeakHeight_Detected for rows of `kind`, one color per subject
/// Written as `gct_vs_peakheight_<suffix>.png`
pub fn plot_gct_vs_peak_height(
    rows: &[ResultRow],
    kind: RowKind,
    dir: &Path,
    suffix: &str,
) -> Result<PathBuf, PlotError> {
    fs::create_dir_all(dir)?;
    let series = scatter_series(rows, kind);
    let path = dir.join(format!("gct_vs_peakheight_{}.png", suffix));

    let path = render_guarded(path, |path| {
        let root = BitMapBackend::new(path, SCATTER_SIZE).into_drawing_area();
        draw_scatter(&root, &series)?;
        root.present()?;
        Ok(())
    })?;
    log::info!("Plot saved to {}", path.display());
    Ok(path)
}

/// Per-subject RSI_Peak for rows of `kind` over the normative bands,
/// with individual jumps, mean and 95% interval
/// Written as `rsi_peak_pointplot_<suffix>.png`
pub fn plot_rsi_normative(
    rows: &[ResultRow],
    kind: RowKind,
    dir: &Path,
    suffix: &str,
) -> Result<PathBuf, PlotError> {
    fs::create_dir_all(dir)?;
    let subjects = subject_rsi(rows, kind);
    let path = dir.join(format!("rsi_peak_pointplot_{}.png", suffix));

    let path = render_guarded(path, |path| {
        let root = BitMapBackend::new(path, NORMATIVE_SIZE).into_drawing_area();
        draw_normative(&root, &subjects)?;
        root.present()?;
        Ok(())
    })?;
    log::info!("Plot saved to {}", path.display());
    Ok(path)
}

fn draw_scatter(root: &DrawingArea<BitMapBackend<'_>, Shift>, series: &[ScatterSeries]) -> DrawResult {
    root.fill(&WHITE)?;

    let points = || series.iter().flat_map(|s| s.points.iter().copied());
    let x_max = padded_max(points().map(|(x, _)| x), 0.5);
    let y_max = padded_max(points().map(|(_, y)| y), 0.5);

    let mut chart = ChartBuilder::on(root)
        .caption("GCT vs. Peak Height", font(28.0))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Ground Contact Time (s)")
        .y_desc("Peak Height Detected (m)")
        .label_style(font(18.0))
        .draw()?;

    for (idx, subject) in series.iter().enumerate() {
        let color = Palette99::pick(idx).mix(1.0);
        chart
            .draw_series(
                subject
                    .points
                    .iter()
                    .map(|&point| Circle::new(point, 8, color.filled())),
            )?
            .label(subject.subject.clone())
            .legend(move |(x, y)| Circle::new((x + 10, y), 6, color.filled()));

        // Dark edge on every marker
        chart.draw_series(
            subject
                .points
                .iter()
                .map(|&point| Circle::new(point, 8, BLACK.stroke_width(1))),
        )?;
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .label_font(font(16.0))
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    Ok(())
}

/// Subject name for an x tick, or nothing between subjects
fn subject_tick(names: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    names.get(idx as usize).cloned().unwrap_or_default()
}

/// Deterministic horizontal spread so repeated values stay visible
fn jitter(n: usize) -> f64 {
    ((n % 5) as f64 - 2.0) * 0.05
}

fn draw_normative(root: &DrawingArea<BitMapBackend<'_>, Shift>, subjects: &[SubjectRsi]) -> DrawResult {
    root.fill(&WHITE)?;

    let count = subjects.len().max(1) as f64;
    let x_right = count - 0.5;
    let y_max = padded_max(
        subjects.iter().flat_map(|s| s.values.iter().copied()),
        RSI_AXIS_FLOOR,
    )
    .max(RSI_AXIS_FLOOR);
    let names: Vec<String> = subjects.iter().map(|s| s.subject.clone()).collect();

    let mut chart = ChartBuilder::on(root)
        .caption("RSI per subject with normative bands", font(28.0))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(-0.5..(x_right + BAND_LABEL_WIDTH), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(subjects.len() + 2)
        .x_label_formatter(&|x| subject_tick(&names, *x))
        .x_desc("Subject")
        .y_desc("Reactive Strength Index (RSI)")
        .label_style(font(18.0))
        .draw()?;

    for category in RsiCategory::ALL {
        let (lower, upper) = category.bounds();
        let upper = upper.min(y_max);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(-0.5, lower), (x_right, upper)],
            band_color(category).mix(0.3).filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            category.display_name(),
            (x_right + 0.1, (lower + upper) / 2.0),
            font(16.0).color(&BLACK),
        )))?;
    }

    for (idx, subject) in subjects.iter().enumerate() {
        let x = idx as f64;

        chart.draw_series(
            subject
                .values
                .iter()
                .enumerate()
                .map(|(n, &v)| Circle::new((x + jitter(n), v), 7, POINT_COLOR.mix(0.7).filled())),
        )?;

        let Some(mean) = subject.mean() else {
            continue;
        };
        let ci = subject.ci95();
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, mean - ci), (x, mean + ci)],
            BLACK.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(Circle::new((x, mean), 7, BLACK.filled())))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{:.2}", mean),
            (x, mean + 0.17),
            font(20.0).color(&BLACK),
        )))?;
    }

    Ok(())
}
