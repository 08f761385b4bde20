//! Raw record → canonical point normalization.
//!
//! The normalizer is the only place raw payloads are interpreted. It enforces the timestamp
//! contract (strict layout, real calendar date, local wall-clock time), coerces every
//! numeric field explicitly, and derives precipitation intensity and the sunrise/sunset
//! classification.

use chrono::{Local, TimeZone};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::domain::{SunPhase, WeatherDataPoint, UNKNOWN_STATUS};
use crate::parsing::raw_record::{coerce_number, coerce_text, RawSensorRecord};
use crate::time::parse_timestamp_millis_in;

/// Full-scale reading of the analog rain sensor (12-bit ADC). Higher means drier.
pub const RAIN_ANALOG_FULL_SCALE: f64 = 4095.0;

/// Percentage of rain detected for a raw analog reading, clamped to `[0, 100]`.
///
/// # Examples
///
/// ```
/// use weather_core::preprocessing::normalizer::precipitation_intensity;
///
/// assert_eq!(precipitation_intensity(4095.0), 0.0);
/// assert_eq!(precipitation_intensity(0.0), 100.0);
/// assert_eq!(precipitation_intensity(5000.0), 0.0);
/// ```
pub fn precipitation_intensity(rain_analog: f64) -> f64 {
    (((RAIN_ANALOG_FULL_SCALE - rain_analog) / RAIN_ANALOG_FULL_SCALE) * 100.0).clamp(0.0, 100.0)
}

/// Counters describing one batch normalization.
///
/// # Fields
///
/// * `total_records` - Records handed to the normalizer
/// * `normalized` - Records that became canonical points
/// * `dropped` - Records rejected because their timestamp was missing or malformed
/// * `duplicate_timestamps` - Points sharing a timestamp with their predecessor (all kept)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizationStats {
    pub total_records: usize,
    pub normalized: usize,
    pub dropped: usize,
    pub duplicate_timestamps: usize,
}

/// Converts raw records into canonical points, interpreting timestamps in `Tz`.
///
/// The default zone is the host's local zone, which is the user-visible contract:
/// identical raw strings produce different epoch values on hosts in different zones.
/// Tests and batch jobs may pin another zone with [`Normalizer::with_timezone`].
#[derive(Debug, Clone)]
pub struct Normalizer<Tz: TimeZone = Local> {
    tz: Tz,
}

impl Normalizer<Local> {
    pub fn new() -> Self {
        Self { tz: Local }
    }
}

impl Default for Normalizer<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> Normalizer<Tz> {
    pub fn with_timezone(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Normalize one record; `None` when its timestamp is missing or invalid.
    pub fn normalize(&self, raw: &RawSensorRecord) -> Option<WeatherDataPoint> {
        let Some(raw_timestamp) = raw.timestamp_str() else {
            warn!("Dropping sensor record without a textual timestamp");
            return None;
        };
        let Some(timestamp) = parse_timestamp_millis_in(raw_timestamp, &self.tz) else {
            warn!("Dropping sensor record with malformed timestamp '{}'", raw_timestamp);
            return None;
        };

        let lux = coerce_number(raw.lux.as_ref()).unwrap_or(0.0);
        let rain_analog = coerce_number(raw.rain_analog.as_ref());

        Some(WeatherDataPoint {
            timestamp,
            temperature: coerce_number(raw.temperature.as_ref()).unwrap_or(0.0),
            humidity: coerce_number(raw.humidity.as_ref()).unwrap_or(0.0),
            lux,
            aqi_ppm: coerce_number(raw.aqi_ppm.as_ref()).unwrap_or(0.0),
            pressure: coerce_number(raw.pressure.as_ref()),
            precipitation: coerce_text(raw.precipitation.as_ref())
                .unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
            air_quality: coerce_text(raw.air_quality.as_ref())
                .unwrap_or_else(|| UNKNOWN_STATUS.to_string()),
            rain_analog,
            precipitation_intensity: rain_analog.map(precipitation_intensity),
            sunrise_sunset: SunPhase::from_lux(lux),
        })
    }

    /// Normalize a batch: drop invalid records, then sort ascending by timestamp.
    ///
    /// The sort is stable, so records sharing a timestamp keep their input order; none
    /// are deduplicated.
    pub fn normalize_batch(
        &self,
        records: &[RawSensorRecord],
    ) -> (Vec<WeatherDataPoint>, NormalizationStats) {
        let mut points: Vec<WeatherDataPoint> =
            records.iter().filter_map(|r| self.normalize(r)).collect();
        points.sort_by_key(|p| p.timestamp);

        let duplicate_timestamps = points
            .windows(2)
            .filter(|pair| pair[0].timestamp == pair[1].timestamp)
            .count();

        let stats = NormalizationStats {
            total_records: records.len(),
            normalized: points.len(),
            dropped: records.len() - points.len(),
            duplicate_timestamps,
        };
        debug!(
            "Normalized {} of {} sensor records ({} dropped, {} duplicate timestamps)",
            stats.normalized, stats.total_records, stats.dropped, stats.duplicate_timestamps
        );

        (points, stats)
    }
}

/// Normalize one record in the host's local time zone.
pub fn normalize(raw: &RawSensorRecord) -> Option<WeatherDataPoint> {
    Normalizer::new().normalize(raw)
}

/// Normalize a batch in the host's local time zone, sorted ascending by timestamp.
pub fn normalize_records(records: &[RawSensorRecord]) -> Vec<WeatherDataPoint> {
    Normalizer::new().normalize_batch(records).0
}
