// Plot module
// PNG charts of the result table: GCT vs peak height, and RSI over normative bands

pub mod charts;
pub mod series;

pub use charts::{plot_gct_vs_peak_height, plot_rsi_normative, PlotError};
pub use series::{scatter_series, subject_rsi, ScatterSeries, SubjectRsi};
