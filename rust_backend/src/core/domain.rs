//! Domain models for environmental sensor series.
//!
//! This module provides the data structures every stage of the analysis exchanges: the
//! canonical [`WeatherDataPoint`], calendar-bucketed [`AggregatedDataPoint`]s, day/night
//! [`DayNightPeriod`]s and their regrouped [`AggregatedDurationData`], and the summary
//! snapshots used for detail views. All of them are plain values, serializable with the
//! camelCase field names the rendering layer expects.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::metrics::MetricKey;
use crate::error::AnalysisError;

/// Lux level above which a reading counts as daytime.
///
/// This is a brightness threshold, not a solar-elevation computation; period segmentation
/// depends on this exact value.
pub const SUNRISE_LUX_THRESHOLD: f64 = 400.0;

/// Default text for free-form status fields the sensor did not report.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Day/night classification derived from the light level of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SunPhase {
    Sunrise,
    Sunset,
}

impl SunPhase {
    /// Classifies a light reading: strictly above [`SUNRISE_LUX_THRESHOLD`] is `Sunrise`.
    ///
    /// # Examples
    ///
    /// ```
    /// use weather_core::core::domain::SunPhase;
    ///
    /// assert_eq!(SunPhase::from_lux(500.0), SunPhase::Sunrise);
    /// assert_eq!(SunPhase::from_lux(400.0), SunPhase::Sunset);
    /// ```
    pub fn from_lux(lux: f64) -> Self {
        if lux > SUNRISE_LUX_THRESHOLD {
            SunPhase::Sunrise
        } else {
            SunPhase::Sunset
        }
    }

    pub fn period_kind(&self) -> PeriodKind {
        match self {
            SunPhase::Sunrise => PeriodKind::Day,
            SunPhase::Sunset => PeriodKind::Night,
        }
    }
}

/// One normalized, validated sensor sample.
///
/// `timestamp` is epoch milliseconds obtained by interpreting the raw wall-clock string in
/// the local time zone. The four core readings always hold a number (unparseable input
/// becomes `0.0`); the remaining numeric readings are omitted when absent.
///
/// # Examples
///
/// ```
/// use weather_core::core::domain::{SunPhase, WeatherDataPoint};
/// use weather_core::core::metrics::MetricKey;
///
/// let point = WeatherDataPoint {
///     timestamp: 1_704_441_600_000,
///     temperature: 21.5,
///     humidity: 40.0,
///     lux: 800.0,
///     aqi_ppm: 120.0,
///     pressure: None,
///     precipitation: "No Rain".to_string(),
///     air_quality: "Good".to_string(),
///     rain_analog: None,
///     precipitation_intensity: None,
///     sunrise_sunset: SunPhase::Sunrise,
/// };
///
/// assert_eq!(point.metric(MetricKey::Temperature), Some(21.5));
/// assert_eq!(point.metric(MetricKey::Pressure), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataPoint {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: f64,
    pub lux: f64,
    pub aqi_ppm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    pub precipitation: String,
    pub air_quality: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_analog: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_intensity: Option<f64>,
    pub sunrise_sunset: SunPhase,
}

impl WeatherDataPoint {
    /// Returns the value of a numeric metric, or `None` when absent or non-finite.
    pub fn metric(&self, key: MetricKey) -> Option<f64> {
        let value = match key {
            MetricKey::Temperature => Some(self.temperature),
            MetricKey::Humidity => Some(self.humidity),
            MetricKey::Lux => Some(self.lux),
            MetricKey::AqiPpm => Some(self.aqi_ppm),
            MetricKey::Pressure => self.pressure,
            MetricKey::RainAnalog => self.rain_analog,
            MetricKey::PrecipitationIntensity => self.precipitation_intensity,
        };
        value.filter(|v| v.is_finite())
    }
}

/// A point that can feed the trend engine.
///
/// Canonical points expose raw readings; aggregated buckets expose their averages.
pub trait SeriesPoint {
    fn timestamp(&self) -> i64;

    /// Value the series carries for `key`, if finite and present.
    fn metric_value(&self, key: MetricKey) -> Option<f64>;

    /// Field name the value is published under; trend overlays append `_trend` to it.
    fn series_key(key: MetricKey) -> String;
}

impl SeriesPoint for WeatherDataPoint {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn metric_value(&self, key: MetricKey) -> Option<f64> {
        self.metric(key)
    }

    fn series_key(key: MetricKey) -> String {
        key.as_str().to_string()
    }
}

/// Requested aggregation of a series. `Raw` leaves the canonical points untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationLevel {
    #[default]
    Raw,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl AggregationLevel {
    /// Bucket granularity for this level, `None` for `Raw`.
    pub fn bucket_level(&self) -> Option<BucketLevel> {
        match self {
            AggregationLevel::Raw => None,
            AggregationLevel::Hourly => Some(BucketLevel::Hourly),
            AggregationLevel::Daily => Some(BucketLevel::Daily),
            AggregationLevel::Weekly => Some(BucketLevel::Weekly),
            AggregationLevel::Monthly => Some(BucketLevel::Monthly),
        }
    }
}

impl FromStr for AggregationLevel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "none" => Ok(AggregationLevel::Raw),
            "hourly" | "hour" => Ok(AggregationLevel::Hourly),
            "daily" | "day" => Ok(AggregationLevel::Daily),
            "weekly" | "week" => Ok(AggregationLevel::Weekly),
            "monthly" | "month" => Ok(AggregationLevel::Monthly),
            other => Err(AnalysisError::InvalidParameter(format!(
                "unknown aggregation level '{}'",
                other
            ))),
        }
    }
}

/// Calendar granularity of an aggregation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketLevel {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for BucketLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BucketLevel::Hourly => "hourly",
            BucketLevel::Daily => "daily",
            BucketLevel::Weekly => "weekly",
            BucketLevel::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Granularity used when regrouping day/night periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationLevel {
    #[default]
    Weekly,
    Monthly,
    Annually,
}

impl FromStr for DurationLevel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(DurationLevel::Weekly),
            "monthly" | "month" => Ok(DurationLevel::Monthly),
            "annually" | "yearly" | "year" => Ok(DurationLevel::Annually),
            other => Err(AnalysisError::InvalidParameter(format!(
                "unknown duration level '{}'",
                other
            ))),
        }
    }
}

/// Per-metric statistics of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// One calendar bucket of aggregated readings.
///
/// Only metrics with at least one valid sample in the bucket appear in `stats`. On the wire
/// the statistics are flattened to `<metric>_avg`, `<metric>_min`, `<metric>_max` and
/// `<metric>_stdDev` keys next to the bucket fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedDataPoint {
    /// Timestamp of the first point encountered in the bucket.
    pub timestamp: i64,
    pub timestamp_display: String,
    pub aggregation_period: BucketLevel,
    pub count: usize,
    pub stats: BTreeMap<MetricKey, BucketStats>,
}

impl AggregatedDataPoint {
    pub fn stats_for(&self, key: MetricKey) -> Option<&BucketStats> {
        self.stats.get(&key)
    }
}

impl Serialize for AggregatedDataPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + self.stats.len() * 4))?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("timestampDisplay", &self.timestamp_display)?;
        map.serialize_entry("aggregationPeriod", &self.aggregation_period)?;
        map.serialize_entry("count", &self.count)?;
        for (key, stats) in &self.stats {
            let name = key.as_str();
            map.serialize_entry(&format!("{}_avg", name), &stats.avg)?;
            map.serialize_entry(&format!("{}_min", name), &stats.min)?;
            map.serialize_entry(&format!("{}_max", name), &stats.max)?;
            map.serialize_entry(&format!("{}_stdDev", name), &stats.std_dev)?;
        }
        map.end()
    }
}

impl SeriesPoint for AggregatedDataPoint {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn metric_value(&self, key: MetricKey) -> Option<f64> {
        self.stats_for(key).map(|s| s.avg).filter(|v| v.is_finite())
    }

    fn series_key(key: MetricKey) -> String {
        format!("{}_avg", key.as_str())
    }
}

/// Day or night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Day,
    Night,
}

/// A maximal run of consecutive points sharing one day/night classification.
///
/// Boundary points belong to the new period, but the old period ends at the boundary
/// point's timestamp, so consecutive periods share that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayNightPeriod {
    #[serde(rename = "type")]
    pub kind: PeriodKind,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    /// Milliseconds between start and end.
    pub duration: i64,
}

impl DayNightPeriod {
    pub fn new(kind: PeriodKind, start_timestamp: i64, end_timestamp: i64) -> Self {
        Self {
            kind,
            start_timestamp,
            end_timestamp,
            duration: end_timestamp - start_timestamp,
        }
    }
}

/// Day/night periods regrouped by calendar week, month or year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDurationData {
    pub period_label: String,
    /// Start timestamp of the earliest period in the group.
    pub period_start: i64,
    /// Mean day duration in milliseconds; `None` when the group has no day periods.
    pub avg_day_duration: Option<f64>,
    pub avg_night_duration: Option<f64>,
    pub day_count: usize,
    pub night_count: usize,
}

/// `{avg, min, max, stdDev, count}` over a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> AggregatedDataPoint {
        let mut stats = BTreeMap::new();
        stats.insert(
            MetricKey::Temperature,
            BucketStats {
                avg: 20.0,
                min: 18.0,
                max: 22.0,
                std_dev: 2.0,
            },
        );
        AggregatedDataPoint {
            timestamp: 1000,
            timestamp_display: "05/01/2024".to_string(),
            aggregation_period: BucketLevel::Daily,
            count: 2,
            stats,
        }
    }

    #[test]
    fn test_aggregated_point_flattens_stats() {
        let json = serde_json::to_value(bucket()).unwrap();

        assert_eq!(json["timestampDisplay"], "05/01/2024");
        assert_eq!(json["aggregationPeriod"], "daily");
        assert_eq!(json["temperature_avg"], 20.0);
        assert_eq!(json["temperature_stdDev"], 2.0);
        assert!(json.get("humidity_avg").is_none());
    }

    #[test]
    fn test_series_keys() {
        assert_eq!(WeatherDataPoint::series_key(MetricKey::AqiPpm), "aqiPpm");
        assert_eq!(
            AggregatedDataPoint::series_key(MetricKey::Temperature),
            "temperature_avg"
        );
        assert_eq!(bucket().metric_value(MetricKey::Temperature), Some(20.0));
        assert_eq!(bucket().metric_value(MetricKey::Humidity), None);
    }

    #[test]
    fn test_period_serializes_type_field() {
        let period = DayNightPeriod::new(PeriodKind::Night, 20, 40);
        let json = serde_json::to_value(period).unwrap();
        assert_eq!(json["type"], "Night");
        assert_eq!(json["duration"], 20);
        assert_eq!(json["startTimestamp"], 20);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(
            "Weekly".parse::<AggregationLevel>().unwrap(),
            AggregationLevel::Weekly
        );
        assert_eq!(AggregationLevel::Raw.bucket_level(), None);
        assert_eq!(
            "yearly".parse::<DurationLevel>().unwrap(),
            DurationLevel::Annually
        );
        assert!("fortnightly".parse::<AggregationLevel>().is_err());
    }
}
