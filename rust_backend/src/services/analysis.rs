use chrono::{Local, TimeZone};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::algorithms::aggregation::{aggregate_in, AggregatedSeries};
use crate::algorithms::periods::{aggregate_durations_in, segment};
use crate::algorithms::trends::{apply_trend, TrendOptions, TrendType, TrendedPoint};
use crate::core::domain::{
    AggregatedDataPoint, AggregatedDurationData, AggregationLevel, DayNightPeriod,
    DurationLevel, WeatherDataPoint,
};
use crate::core::metrics::{MetricCatalog, MetricKey};
use crate::parsing::RawSensorRecord;
use crate::preprocessing::{NormalizationStats, PreprocessConfig, PreprocessPipeline};
use crate::services::distributions::{compute_metric_summary, MetricSummary};

/// Parameters of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Metrics to trend and summarize. Empty means every numeric metric.
    #[serde(default)]
    pub metrics: Vec<MetricKey>,
    #[serde(default)]
    pub aggregation: AggregationLevel,
    #[serde(default)]
    pub trend: TrendType,
    #[serde(default)]
    pub trend_options: TrendOptions,
    #[serde(default)]
    pub duration_level: DurationLevel,
    #[serde(default)]
    pub selection: PreprocessConfig,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            aggregation: AggregationLevel::Raw,
            trend: TrendType::None,
            trend_options: TrendOptions::default(),
            duration_level: DurationLevel::Weekly,
            selection: PreprocessConfig::default(),
        }
    }
}

impl AnalysisRequest {
    /// Requested metrics, falling back to every numeric metric.
    pub fn effective_metrics(&self) -> Vec<MetricKey> {
        if self.metrics.is_empty() {
            MetricKey::ALL.to_vec()
        } else {
            let mut metrics: Vec<MetricKey> = Vec::with_capacity(self.metrics.len());
            for metric in &self.metrics {
                if !metrics.contains(metric) {
                    metrics.push(*metric);
                }
            }
            metrics
        }
    }
}

/// Trend overlay over the aggregated series of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrendSeries {
    Raw(Vec<TrendedPoint<WeatherDataPoint>>),
    Buckets(Vec<TrendedPoint<AggregatedDataPoint>>),
}

impl TrendSeries {
    /// Number of points carrying a trend value.
    pub fn trended_count(&self) -> usize {
        match self {
            TrendSeries::Raw(points) => points.iter().filter(|p| !p.trend.is_empty()).count(),
            TrendSeries::Buckets(points) => points.iter().filter(|p| !p.trend.is_empty()).count(),
        }
    }
}

/// Everything a rendering layer needs for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub normalization: NormalizationStats,
    pub filtered_out: usize,
    pub point_count: usize,
    pub aggregation: AggregationLevel,
    pub series: AggregatedSeries,
    /// Present only when a trend type other than `none` was requested.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub trends: BTreeMap<MetricKey, TrendSeries>,
    pub periods: Vec<DayNightPeriod>,
    pub durations: Vec<AggregatedDurationData>,
    pub summaries: Vec<MetricSummary>,
}

fn trend_series(
    series: &AggregatedSeries,
    metric: MetricKey,
    trend: TrendType,
    options: &TrendOptions,
) -> TrendSeries {
    match series {
        AggregatedSeries::Raw(points) => {
            TrendSeries::Raw(apply_trend(points, metric, trend, options))
        }
        AggregatedSeries::Buckets(buckets) => {
            TrendSeries::Buckets(apply_trend(buckets, metric, trend, options))
        }
    }
}

/// Run the full pipeline over `records`, interpreting timestamps in `tz`.
pub fn analyze_in<Tz: TimeZone>(
    records: &[RawSensorRecord],
    request: &AnalysisRequest,
    catalog: &MetricCatalog,
    tz: &Tz,
) -> AnalysisReport {
    let preprocessed =
        PreprocessPipeline::with_timezone(tz.clone(), request.selection.clone()).process(records);
    let points = preprocessed.points;
    let metrics = request.effective_metrics();

    let series = aggregate_in(&points, request.aggregation, tz);

    let mut trends = BTreeMap::new();
    if request.trend != TrendType::None {
        for &metric in &metrics {
            trends.insert(
                metric,
                trend_series(&series, metric, request.trend, &request.trend_options),
            );
        }
    }

    let periods = segment(&points);
    let durations = aggregate_durations_in(&periods, request.duration_level, tz);

    let summaries: Vec<MetricSummary> = metrics
        .iter()
        .filter_map(|&metric| compute_metric_summary(&points, metric, catalog))
        .collect();

    info!(
        "Analyzed {} records: {} points, {} series entries ({:?}), {} periods, {} summaries",
        records.len(),
        points.len(),
        series.len(),
        request.aggregation,
        periods.len(),
        summaries.len()
    );

    AnalysisReport {
        normalization: preprocessed.stats,
        filtered_out: preprocessed.filtered_out,
        point_count: points.len(),
        aggregation: request.aggregation,
        series,
        trends,
        periods,
        durations,
        summaries,
    }
}

/// Run the full pipeline in the host's local time zone.
pub fn analyze(
    records: &[RawSensorRecord],
    request: &AnalysisRequest,
    catalog: &MetricCatalog,
) -> AnalysisReport {
    analyze_in(records, request, catalog, &Local)
}
