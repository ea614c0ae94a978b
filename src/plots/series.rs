// Chart data shaping
// Groups result rows per subject for the scatter and normative charts

use crate::pipeline::ResultRow;
use crate::rsi::RowKind;

/// z for a two-sided 95% normal interval
const Z_95: f64 = 1.96;

/// (GCT, PeakHeight_Detected) points of one subject
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub subject: String,
    pub points: Vec<(f64, f64)>,
}

/// RSI_Peak values of one subject
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRsi {
    pub subject: String,
    pub values: Vec<f64>,
}

impl SubjectRsi {
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Half width of the normal-approximation 95% interval of the mean
    /// Zero for fewer than two values
    pub fn ci95(&self) -> f64 {
        let n = self.values.len();
        let Some(mean) = self.mean() else {
            return 0.0;
        };
        if n < 2 {
            return 0.0;
        }

        let var = self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Z_95 * var.sqrt() / (n as f64).sqrt()
    }
}

fn group_by_subject<'a, T>(
    rows: impl IntoIterator<Item = (&'a str, Option<T>)>,
) -> Vec<(&'a str, Vec<T>)> {
    let mut grouped: Vec<(&str, Vec<T>)> = Vec::new();

    for (subject, value) in rows {
        let idx = match grouped.iter().position(|(s, _)| *s == subject) {
            Some(idx) => idx,
            None => {
                grouped.push((subject, Vec::new()));
                grouped.len() - 1
            }
        };
        if let Some(value) = value {
            grouped[idx].1.push(value);
        }
    }

    grouped
}

/// Scatter points per subject for rows of `kind`, subjects in first-seen order
/// Rows missing either coordinate are left out
pub fn scatter_series(rows: &[ResultRow], kind: RowKind) -> Vec<ScatterSeries> {
    let points = rows.iter().filter(|row| row.limb == kind).map(|row| {
        let point = row
            .gct
            .zip(row.peak_height_detected)
            .filter(|(x, y)| x.is_finite() && y.is_finite());
        (row.subject.as_str(), point)
    });

    group_by_subject(points)
        .into_iter()
        .map(|(subject, points)| ScatterSeries {
            subject: subject.to_string(),
            points,
        })
        .collect()
}

/// RSI_Peak values per subject for rows of `kind`, subjects in first-seen order
pub fn subject_rsi(rows: &[ResultRow], kind: RowKind) -> Vec<SubjectRsi> {
    let values = rows
        .iter()
        .filter(|row| row.limb == kind)
        .map(|row| (row.subject.as_str(), row.rsi_peak.filter(|v| v.is_finite())));

    group_by_subject(values)
        .into_iter()
        .map(|(subject, values)| SubjectRsi {
            subject: subject.to_string(),
            values,
        })
        .collect()
}

/// Axis upper bound: 10% above the largest value, or `floor` when there is nothing positive
pub fn padded_max(values: impl IntoIterator<Item = f64>, floor: f64) -> f64 {
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    if max > 0.0 {
        max * 1.1
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subject: &str, kind: RowKind, gct: Option<f64>, height: Option<f64>) -> ResultRow {
        ResultRow {
            subject: subject.to_string(),
            trial: 1,
            jump: 1,
            limb: kind,
            gct,
            peak_height_flight: height,
            peak_height_detected: height,
            rsi_flight: None,
            rsi_peak: gct.zip(height).map(|(g, h)| h / g),
            asymmetry_peak_pct: None,
        }
    }

    #[test]
    fn test_scatter_groups_by_subject_and_kind() {
        let rows = vec![
            row("s2", RowKind::Combined, Some(0.2), Some(0.3)),
            row("s1", RowKind::Combined, Some(0.25), Some(0.35)),
            row("s2", RowKind::Left, Some(0.5), Some(0.5)),
            row("s2", RowKind::Combined, None, Some(0.3)),
            row("s2", RowKind::Combined, Some(0.3), Some(0.4)),
        ];
        let series = scatter_series(&rows, RowKind::Combined);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].subject, "s2");
        assert_eq!(series[0].points, vec![(0.2, 0.3), (0.3, 0.4)]);
        assert_eq!(series[1].points, vec![(0.25, 0.35)]);
    }

    #[test]
    fn test_subject_rsi_statistics() {
        let rsi = SubjectRsi {
            subject: "s1".to_string(),
            values: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(rsi.mean(), Some(2.0));
        // sd = 1, n = 3
        assert!((rsi.ci95() - 1.96 / 3f64.sqrt()).abs() < 1e-12);

        let single = SubjectRsi {
            subject: "s2".to_string(),
            values: vec![1.4],
        };
        assert_eq!(single.ci95(), 0.0);

        let empty = SubjectRsi {
            subject: "s3".to_string(),
            values: Vec::new(),
        };
        assert_eq!(empty.mean(), None);
        assert_eq!(empty.ci95(), 0.0);
    }

    #[test]
    fn test_subject_rsi_keeps_subjects_without_values() {
        let rows = vec![
            row("s1", RowKind::Combined, None, None),
            row("s2", RowKind::Combined, Some(0.25), Some(0.3)),
        ];
        let subjects = subject_rsi(&rows, RowKind::Combined);

        assert_eq!(subjects.len(), 2);
        assert!(subjects[0].values.is_empty());
        assert!((subjects[1].values[0] - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_padded_max() {
        assert!((padded_max([0.2, 0.5, f64::NAN], 1.0) - 0.55).abs() < 1e-12);
        assert_eq!(padded_max([], 1.0), 1.0);
        assert_eq!(padded_max([-0.3, 0.0], 0.5), 0.5);
    }
}
