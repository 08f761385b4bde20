//! Analysis configuration file support.
//!
//! This module reads default analysis knobs, the date/time selection and metric catalog
//! overrides from a TOML file:
//!
//! ```toml
//! [analysis]
//! aggregation = "daily"
//! trend = "movingAverage"
//! moving_average_period = 5
//!
//! [filter]
//! from = "2024-01-01"
//! to = "2024-01-31"
//!
//! [metrics.temperature]
//! unit = "°F"
//! healthy_min = 64.0
//! healthy_max = 79.0
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::algorithms::trends::{
    TrendOptions, TrendType, DEFAULT_MOVING_AVERAGE_PERIOD, DEFAULT_POLYNOMIAL_ORDER,
};
use crate::core::domain::{AggregationLevel, DurationLevel};
use crate::core::metrics::{MetricCatalog, MetricKey, MetricOverride};
use crate::error::{AnalysisError, AnalysisResult};
use crate::preprocessing::PreprocessConfig;
use crate::services::AnalysisRequest;
use crate::transformations::{DateRange, TimeOfDayRange};

pub const DEFAULT_CONFIG_FILE: &str = "weather.toml";

/// Analysis configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub filter: FilterSettings,
    /// Catalog overrides keyed by metric name.
    #[serde(default)]
    pub metrics: BTreeMap<String, MetricOverride>,
}

/// Default analysis knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub aggregation: AggregationLevel,
    #[serde(default)]
    pub trend: TrendType,
    #[serde(default = "default_polynomial_order")]
    pub polynomial_order: usize,
    #[serde(default = "default_moving_average_period")]
    pub moving_average_period: usize,
    #[serde(default)]
    pub duration_level: DurationLevel,
    /// Metrics to analyze; empty means all.
    #[serde(default)]
    pub metrics: Vec<MetricKey>,
}

/// Date and time-of-day selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub from: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub to: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub start_time: Option<chrono::NaiveTime>,
    #[serde(default)]
    pub end_time: Option<chrono::NaiveTime>,
}

fn default_polynomial_order() -> usize {
    DEFAULT_POLYNOMIAL_ORDER
}

fn default_moving_average_period() -> usize {
    DEFAULT_MOVING_AVERAGE_PERIOD
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            aggregation: AggregationLevel::default(),
            trend: TrendType::default(),
            polynomial_order: default_polynomial_order(),
            moving_average_period: default_moving_average_period(),
            duration_level: DurationLevel::default(),
            metrics: Vec::new(),
        }
    }
}

impl FilterSettings {
    /// Validated selection for the preprocessing pipeline.
    pub fn to_preprocess_config(&self) -> AnalysisResult<PreprocessConfig> {
        let date_range = DateRange::new(self.from, self.to)?;
        let time_of_day = match (self.start_time, self.end_time) {
            (Some(start_time), Some(end_time)) => Some(TimeOfDayRange {
                start_time,
                end_time,
            }),
            (None, None) => None,
            _ => {
                return Err(AnalysisError::ConfigurationError(
                    "time-of-day filter requires both 'start_time' and 'end_time'".to_string(),
                ))
            }
        };
        Ok(PreprocessConfig {
            date_range,
            time_of_day,
        })
    }
}

impl AnalysisConfig {
    /// Parse configuration from TOML text.
    ///
    /// Errors name the offending field path, e.g. `analysis.trend`.
    pub fn from_toml_str(content: &str) -> AnalysisResult<Self> {
        let deserializer = toml::Deserializer::new(content);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            AnalysisError::ConfigurationError(format!(
                "Failed to parse config at '{}': {}",
                e.path(),
                e.inner()
            ))
        })
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AnalysisError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// First existing `weather.toml` among the standard locations:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn find_default_location() -> Option<PathBuf> {
        [
            PathBuf::from(DEFAULT_CONFIG_FILE),
            PathBuf::from("rust_backend").join(DEFAULT_CONFIG_FILE),
            PathBuf::from("..").join(DEFAULT_CONFIG_FILE),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Load configuration from the default location.
    pub fn from_default_location() -> AnalysisResult<Self> {
        match Self::find_default_location() {
            Some(path) => Self::from_file(path),
            None => Err(AnalysisError::ConfigurationError(format!(
                "No {} found in standard locations",
                DEFAULT_CONFIG_FILE
            ))),
        }
    }

    pub fn trend_options(&self) -> TrendOptions {
        TrendOptions {
            polynomial_order: self.analysis.polynomial_order,
            moving_average_period: self.analysis.moving_average_period,
        }
        .clamped()
    }

    /// Request built from the configured knobs and selection.
    pub fn to_request(&self) -> AnalysisResult<AnalysisRequest> {
        Ok(AnalysisRequest {
            metrics: self.analysis.metrics.clone(),
            aggregation: self.analysis.aggregation,
            trend: self.analysis.trend,
            trend_options: self.trend_options(),
            duration_level: self.analysis.duration_level,
            selection: self.filter.to_preprocess_config()?,
        })
    }

    /// Default catalog with the configured overrides applied.
    pub fn catalog(&self) -> AnalysisResult<MetricCatalog> {
        let mut catalog = MetricCatalog::default();
        for (name, patch) in &self.metrics {
            let key = MetricKey::from_str(name)?;
            catalog.apply_override(key, patch);
        }
        Ok(catalog)
    }
}
