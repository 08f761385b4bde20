use chrono::TimeZone;
use serde::Serialize;

use crate::algorithms::aggregation::group_into_buckets;
use crate::algorithms::distribution::{
    coefficient_of_variation, histogram, padded_domain, AxisDomain, HistogramBin,
};
use crate::algorithms::stats::summarize;
use crate::core::domain::{BucketLevel, SummaryStats, WeatherDataPoint};
use crate::core::metrics::{MetricCatalog, MetricKey};
use crate::error::{AnalysisError, AnalysisResult};

/// Distribution overview of one metric across a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub metric: MetricKey,
    pub label: String,
    pub unit: String,
    pub stats: SummaryStats,
    pub coefficient_of_variation: Option<f64>,
    pub histogram: Option<Vec<HistogramBin>>,
    pub axis_domain: AxisDomain,
    /// Percentage of samples inside the metric's healthy range, when one is configured.
    pub healthy_share: Option<f64>,
}

/// Statistics snapshot of one metric within one aggregation bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailModalData {
    pub bucket_label: String,
    pub metric: MetricKey,
    /// `None` when no point in the bucket carries a value for the metric.
    pub summary: Option<SummaryStats>,
    /// Bucket points that carry a value for the metric.
    pub points: Vec<WeatherDataPoint>,
    pub histogram: Option<Vec<HistogramBin>>,
    pub coefficient_of_variation: Option<f64>,
}

fn metric_values<'a, I>(points: I, metric: MetricKey) -> Vec<f64>
where
    I: IntoIterator<Item = &'a WeatherDataPoint>,
{
    points.into_iter().filter_map(|p| p.metric(metric)).collect()
}

/// Compute the distribution overview for `metric`.
/// Returns `None` when no point carries a finite value for it.
pub fn compute_metric_summary(
    points: &[WeatherDataPoint],
    metric: MetricKey,
    catalog: &MetricCatalog,
) -> Option<MetricSummary> {
    let values = metric_values(points, metric);
    let stats = summarize(&values)?;
    let descriptor = catalog.describe(metric);

    let healthy_share = catalog.healthy_range(metric).map(|range| {
        let inside = values.iter().filter(|v| range.contains(**v)).count();
        inside as f64 / values.len() as f64 * 100.0
    });

    Some(MetricSummary {
        metric,
        label: descriptor.label,
        unit: descriptor.unit,
        axis_domain: padded_domain(stats.min, stats.max),
        coefficient_of_variation: coefficient_of_variation(&values),
        histogram: histogram(&values),
        healthy_share,
        stats,
    })
}

/// Compute the detail snapshot of `metric` for the bucket labelled `bucket_label`.
///
/// Buckets are rebuilt from the canonical points at `level` in `tz`, so the label must be
/// one produced by the aggregation of the same series.
pub fn compute_detail_data<Tz: TimeZone>(
    points: &[WeatherDataPoint],
    level: BucketLevel,
    bucket_label: &str,
    metric: MetricKey,
    tz: &Tz,
) -> AnalysisResult<DetailModalData> {
    let bucket = group_into_buckets(points, level, tz)
        .into_iter()
        .find(|b| b.label == bucket_label)
        .ok_or_else(|| {
            AnalysisError::InvalidParameter(format!(
                "no {} bucket labelled '{}'",
                level, bucket_label
            ))
        })?;

    let contributing: Vec<WeatherDataPoint> = bucket
        .points
        .into_iter()
        .filter(|p| p.metric(metric).is_some())
        .cloned()
        .collect();
    let values = metric_values(&contributing, metric);

    Ok(DetailModalData {
        bucket_label: bucket.label,
        metric,
        summary: summarize(&values),
        histogram: histogram(&values),
        coefficient_of_variation: coefficient_of_variation(&values),
        points: contributing,
    })
}
