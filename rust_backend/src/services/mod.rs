//! Service layer for request-level orchestration.
//!
//! Services sit between raw record input and the rendering layer: they run the
//! preprocessing pipeline and the numeric algorithms for one request and assemble plain,
//! serializable results.

pub mod analysis;
pub mod distributions;

pub use analysis::{analyze, analyze_in, AnalysisReport, AnalysisRequest, TrendSeries};
pub use distributions::{
    compute_detail_data, compute_metric_summary, DetailModalData, MetricSummary,
};
