use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::core::domain::WeatherDataPoint;
use crate::parsing::raw_record::RawSensorRecord;
use crate::preprocessing::normalizer::{NormalizationStats, Normalizer};
use crate::transformations::filtering::{
    filter_by_date_range, filter_by_time_of_day, DateRange, TimeOfDayRange,
};

/// Result of preprocessing operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessResult {
    pub points: Vec<WeatherDataPoint>,
    pub stats: NormalizationStats,
    /// Canonical points removed by the date/time selection.
    pub filtered_out: usize,
}

/// Configuration for the preprocessing pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessConfig {
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default)]
    pub time_of_day: Option<TimeOfDayRange>,
}

/// Main preprocessing pipeline: normalize, sort, then apply the date/time selection.
pub struct PreprocessPipeline<Tz: TimeZone = Local> {
    normalizer: Normalizer<Tz>,
    config: PreprocessConfig,
}

impl PreprocessPipeline<Local> {
    /// Create a new pipeline with default configuration
    pub fn new() -> Self {
        Self::with_config(PreprocessConfig::default())
    }

    /// Create a pipeline with custom configuration
    pub fn with_config(config: PreprocessConfig) -> Self {
        Self {
            normalizer: Normalizer::new(),
            config,
        }
    }
}

impl Default for PreprocessPipeline<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> PreprocessPipeline<Tz> {
    /// Create a pipeline interpreting timestamps in `tz`
    pub fn with_timezone(tz: Tz, config: PreprocessConfig) -> Self {
        Self {
            normalizer: Normalizer::with_timezone(tz),
            config,
        }
    }

    /// Process raw records into the selected, time-ordered canonical series
    pub fn process(&self, records: &[RawSensorRecord]) -> PreprocessResult {
        // Step 1: Normalize and sort
        let (points, stats) = self.normalizer.normalize_batch(records);
        let normalized = points.len();
        let tz = self.normalizer.timezone();

        // Step 2: Date range
        let mut points = filter_by_date_range(&points, &self.config.date_range, tz);

        // Step 3: Time of day (optional)
        if let Some(window) = &self.config.time_of_day {
            points = filter_by_time_of_day(&points, window, tz);
        }

        PreprocessResult {
            filtered_out: normalized - points.len(),
            points,
            stats,
        }
    }
}

/// Convenience function to preprocess records in the host's local time zone
pub fn preprocess_records(records: &[RawSensorRecord], date_range: DateRange) -> PreprocessResult {
    let config = PreprocessConfig {
        date_range,
        time_of_day: None,
    };

    PreprocessPipeline::with_config(config).process(records)
}
