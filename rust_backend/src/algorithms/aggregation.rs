//! Calendar-bucket aggregation of canonical points.
//!
//! Points are grouped by the local calendar window they fall into (hour, day, ISO week,
//! month). For every numeric metric with at least one finite sample in a bucket the
//! average, extrema and population standard deviation are reported; metrics without
//! samples are left out of that bucket entirely.

use chrono::{Local, TimeZone};
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::algorithms::stats::summarize;
use crate::core::domain::{
    AggregatedDataPoint, AggregationLevel, BucketLevel, BucketStats, WeatherDataPoint,
};
use crate::core::metrics::MetricKey;
use crate::time::{local_datetime, CalendarBucket};

/// A series after the requested aggregation step.
///
/// `Raw` is the identity passthrough used when no aggregation was asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AggregatedSeries {
    Raw(Vec<WeatherDataPoint>),
    Buckets(Vec<AggregatedDataPoint>),
}

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        match self {
            AggregatedSeries::Raw(points) => points.len(),
            AggregatedSeries::Buckets(buckets) => buckets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical points sharing one calendar window.
#[derive(Debug, Clone)]
pub struct PointBucket<'a> {
    pub key: CalendarBucket,
    pub label: String,
    /// Timestamp of the first point encountered in the bucket.
    pub representative_timestamp: i64,
    pub points: Vec<&'a WeatherDataPoint>,
}

/// Group points into calendar buckets, ordered by representative timestamp.
pub fn group_into_buckets<'a, Tz: TimeZone>(
    points: &'a [WeatherDataPoint],
    level: BucketLevel,
    tz: &Tz,
) -> Vec<PointBucket<'a>> {
    let mut index: HashMap<CalendarBucket, usize> = HashMap::new();
    let mut buckets: Vec<PointBucket<'a>> = Vec::new();

    for point in points {
        let Some(local) = local_datetime(point.timestamp, tz) else {
            warn!("Skipping point with out-of-range timestamp {}", point.timestamp);
            continue;
        };
        let key = CalendarBucket::for_bucket_level(&local, level);

        match index.get(&key) {
            Some(&i) => buckets[i].points.push(point),
            None => {
                index.insert(key, buckets.len());
                buckets.push(PointBucket {
                    key,
                    label: key.label(),
                    representative_timestamp: point.timestamp,
                    points: vec![point],
                });
            }
        }
    }

    buckets.sort_by_key(|b| b.representative_timestamp);
    buckets
}

/// Statistics of every numeric metric with at least one finite sample.
pub fn bucket_statistics(points: &[&WeatherDataPoint]) -> BTreeMap<MetricKey, BucketStats> {
    let mut stats = BTreeMap::new();

    for key in MetricKey::ALL {
        let values: Vec<f64> = points.iter().filter_map(|p| p.metric(key)).collect();
        if let Some(summary) = summarize(&values) {
            stats.insert(
                key,
                BucketStats {
                    avg: summary.avg,
                    min: summary.min,
                    max: summary.max,
                    std_dev: summary.std_dev,
                },
            );
        }
    }

    stats
}

/// Aggregate points into calendar buckets of `level`, interpreting time in `tz`.
pub fn aggregate_buckets_in<Tz: TimeZone>(
    points: &[WeatherDataPoint],
    level: BucketLevel,
    tz: &Tz,
) -> Vec<AggregatedDataPoint> {
    let aggregated: Vec<AggregatedDataPoint> = group_into_buckets(points, level, tz)
        .into_iter()
        .map(|bucket| AggregatedDataPoint {
            timestamp: bucket.representative_timestamp,
            timestamp_display: bucket.label,
            aggregation_period: level,
            count: bucket.points.len(),
            stats: bucket_statistics(&bucket.points),
        })
        .collect();

    debug!(
        "Aggregated {} points into {} {} buckets",
        points.len(),
        aggregated.len(),
        level
    );
    aggregated
}

/// Apply the requested aggregation level, interpreting time in `tz`.
pub fn aggregate_in<Tz: TimeZone>(
    points: &[WeatherDataPoint],
    level: AggregationLevel,
    tz: &Tz,
) -> AggregatedSeries {
    match level.bucket_level() {
        None => AggregatedSeries::Raw(points.to_vec()),
        Some(bucket_level) => {
            AggregatedSeries::Buckets(aggregate_buckets_in(points, bucket_level, tz))
        }
    }
}

/// Apply the requested aggregation level in the host's local time zone.
pub fn aggregate(points: &[WeatherDataPoint], level: AggregationLevel) -> AggregatedSeries {
    aggregate_in(points, level, &Local)
}
