// Normative RSI bands and per-subject summaries
// Bands: Poor < 0.6, Below Average 0.6-0.8, Average 0.8-1.2, Good 1.2-1.8, Excellent > 1.8

use serde::{Deserialize, Serialize};

/// Normative Reactive Strength Index category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RsiCategory {
    Poor,
    BelowAverage,
    Average,
    Good,
    Excellent,
}

impl RsiCategory {
    /// All bands, lowest first
    pub const ALL: [RsiCategory; 5] = [
        RsiCategory::Poor,
        RsiCategory::BelowAverage,
        RsiCategory::Average,
        RsiCategory::Good,
        RsiCategory::Excellent,
    ];

    /// Band bounds `[lower, upper)`; Poor starts at zero and Excellent is open-ended
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            RsiCategory::Poor => (0.0, 0.6),
            RsiCategory::BelowAverage => (0.6, 0.8),
            RsiCategory::Average => (0.8, 1.2),
            RsiCategory::Good => (1.2, 1.8),
            RsiCategory::Excellent => (1.8, f64::INFINITY),
        }
    }

    /// Classify an RSI value (lower bounds inclusive)
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi < 0.6 {
            RsiCategory::Poor
        } else if rsi < 0.8 {
            RsiCategory::BelowAverage
        } else if rsi < 1.2 {
            RsiCategory::Average
        } else if rsi < 1.8 {
            RsiCategory::Good
        } else {
            RsiCategory::Excellent
        }
    }

    /// Human-readable label with the band range
    pub fn display_name(&self) -> &'static str {
        match self {
            RsiCategory::Poor => "Poor <0.6",
            RsiCategory::BelowAverage => "Below Avg 0.6-0.8",
            RsiCategory::Average => "Average 0.8-1.2",
            RsiCategory::Good => "Good 1.2-1.8",
            RsiCategory::Excellent => "Excellent >1.8",
        }
    }
}

/// RSI_Peak statistics for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSummary {
    #[serde(rename = "Subject")]
    pub subject: String,

    /// Number of jumps with a defined RSI_Peak
    #[serde(rename = "Jumps")]
    pub jumps: usize,

    #[serde(rename = "Mean_RSI_Peak")]
    pub mean_rsi_peak: Option<f64>,

    #[serde(rename = "Median_RSI_Peak")]
    pub median_rsi_peak: Option<f64>,

    /// Category of the mean
    #[serde(rename = "Category")]
    pub category: Option<RsiCategory>,
}

/// Summarize (subject, RSI_Peak) pairs, keeping subjects in first-seen order
/// Unset RSI values are skipped, but their subject still gets a summary
pub fn summarize_by_subject<'a>(
    values: impl IntoIterator<Item = (&'a str, Option<f64>)>,
) -> Vec<SubjectSummary> {
    let mut grouped: Vec<(&str, Vec<f64>)> = Vec::new();

    for (subject, rsi) in values {
        let idx = match grouped.iter().position(|(s, _)| *s == subject) {
            Some(idx) => idx,
            None => {
                grouped.push((subject, Vec::new()));
                grouped.len() - 1
            }
        };
        if let Some(rsi) = rsi.filter(|v| v.is_finite()) {
            grouped[idx].1.push(rsi);
        }
    }

    grouped
        .into_iter()
        .map(|(subject, mut rsi)| {
            rsi.sort_by(|a, b| a.total_cmp(b));
            let mean = (!rsi.is_empty()).then(|| rsi.iter().sum::<f64>() / rsi.len() as f64);
            let median = (!rsi.is_empty()).then(|| {
                let mid = rsi.len() / 2;
                if rsi.len() % 2 == 0 {
                    (rsi[mid - 1] + rsi[mid]) / 2.0
                } else {
                    rsi[mid]
                }
            });

            SubjectSummary {
                subject: subject.to_string(),
                jumps: rsi.len(),
                mean_rsi_peak: mean,
                median_rsi_peak: median,
                category: mean.map(RsiCategory::from_rsi),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(RsiCategory::from_rsi(0.0), RsiCategory::Poor);
        assert_eq!(RsiCategory::from_rsi(0.59), RsiCategory::Poor);
        assert_eq!(RsiCategory::from_rsi(0.6), RsiCategory::BelowAverage);
        assert_eq!(RsiCategory::from_rsi(0.8), RsiCategory::Average);
        assert_eq!(RsiCategory::from_rsi(1.2), RsiCategory::Good);
        assert_eq!(RsiCategory::from_rsi(1.8), RsiCategory::Excellent);
        assert_eq!(RsiCategory::from_rsi(3.0), RsiCategory::Excellent);
    }

    #[test]
    fn test_bounds_agree_with_classification() {
        for category in RsiCategory::ALL {
            let (lower, upper) = category.bounds();
            assert_eq!(RsiCategory::from_rsi(lower), category);
            if upper.is_finite() {
                assert_eq!(RsiCategory::from_rsi(upper - 1e-9), category);
            }
        }

        // Bands tile the axis without gaps
        for pair in RsiCategory::ALL.windows(2) {
            assert_eq!(pair[0].bounds().1, pair[1].bounds().0);
        }
    }

    #[test]
    fn test_display_names_carry_ranges() {
        assert_eq!(RsiCategory::Poor.display_name(), "Poor <0.6");
        assert_eq!(RsiCategory::Good.display_name(), "Good 1.2-1.8");
        assert_eq!(RsiCategory::Excellent.display_name(), "Excellent >1.8");
    }

    #[test]
    fn test_summary_per_subject() {
        let values = vec![
            ("subject1", Some(1.0)),
            ("subject2", Some(0.5)),
            ("subject1", Some(1.4)),
            ("subject1", None),
            ("subject1", Some(2.0)),
        ];
        let summaries = summarize_by_subject(values);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].subject, "subject1");
        assert_eq!(summaries[0].jumps, 3);
        assert!((summaries[0].mean_rsi_peak.unwrap() - 1.4666666666).abs() < 1e-6);
        assert_eq!(summaries[0].median_rsi_peak, Some(1.4));
        assert_eq!(summaries[0].category, Some(RsiCategory::Good));

        assert_eq!(summaries[1].category, Some(RsiCategory::Poor));
    }

    #[test]
    fn test_subject_without_values() {
        let summaries = summarize_by_subject(vec![("subject3", None)]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].jumps, 0);
        assert!(summaries[0].mean_rsi_peak.is_none());
        assert!(summaries[0].category.is_none());
    }
}
