//! Metric keys and the metric descriptor catalog.
//!
//! Every numeric quantity a canonical point can carry is named by a [`MetricKey`]. The
//! presentation attributes of each metric (label, unit, color, healthy range) live in a
//! [`MetricCatalog`] that callers build once per request and pass down explicitly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// Numeric metrics carried by a canonical point.
///
/// String-valued statuses (precipitation, air quality, sunrise/sunset) are not metrics and
/// never take part in numeric aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Temperature,
    Humidity,
    Lux,
    AqiPpm,
    Pressure,
    RainAnalog,
    PrecipitationIntensity,
}

impl MetricKey {
    pub const ALL: [MetricKey; 7] = [
        MetricKey::Temperature,
        MetricKey::Humidity,
        MetricKey::Lux,
        MetricKey::AqiPpm,
        MetricKey::Pressure,
        MetricKey::RainAnalog,
        MetricKey::PrecipitationIntensity,
    ];

    /// Wire name of the metric, as used in serialized field keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Temperature => "temperature",
            MetricKey::Humidity => "humidity",
            MetricKey::Lux => "lux",
            MetricKey::AqiPpm => "aqiPpm",
            MetricKey::Pressure => "pressure",
            MetricKey::RainAnalog => "rainAnalog",
            MetricKey::PrecipitationIntensity => "precipitationIntensity",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        MetricKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .or(match wanted.to_ascii_lowercase().as_str() {
                "aqi_ppm" | "aqi" => Some(MetricKey::AqiPpm),
                "rain_analog" => Some(MetricKey::RainAnalog),
                "precipitation_intensity" => Some(MetricKey::PrecipitationIntensity),
                "light" => Some(MetricKey::Lux),
                _ => None,
            })
            .ok_or_else(|| AnalysisError::UnknownMetric(s.to_string()))
    }
}

/// Inclusive range of values considered healthy/comfortable for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthyRange {
    pub min: f64,
    pub max: f64,
}

impl HealthyRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Presentation attributes of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    pub label: String,
    pub unit: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy_range: Option<HealthyRange>,
}

impl MetricDescriptor {
    fn new(label: &str, unit: &str, color: &str, healthy: Option<(f64, f64)>) -> Self {
        Self {
            label: label.to_string(),
            unit: unit.to_string(),
            color: color.to_string(),
            healthy_range: healthy.map(|(min, max)| HealthyRange { min, max }),
        }
    }
}

/// Partial descriptor used to override catalog entries from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricOverride {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub healthy_min: Option<f64>,
    #[serde(default)]
    pub healthy_max: Option<f64>,
}

/// Explicit metric-key → descriptor mapping, resolved once per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCatalog {
    descriptors: BTreeMap<MetricKey, MetricDescriptor>,
}

impl MetricCatalog {
    /// Catalog with no entries; `describe` falls back to the metric's wire name.
    pub fn empty() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: MetricKey, descriptor: MetricDescriptor) {
        self.descriptors.insert(key, descriptor);
    }

    pub fn get(&self, key: MetricKey) -> Option<&MetricDescriptor> {
        self.descriptors.get(&key)
    }

    /// Descriptor for `key`, or a bare one named after the key when the catalog lacks it.
    pub fn describe(&self, key: MetricKey) -> MetricDescriptor {
        self.get(key)
            .cloned()
            .unwrap_or_else(|| MetricDescriptor::new(key.as_str(), "", "#888888", None))
    }

    pub fn healthy_range(&self, key: MetricKey) -> Option<HealthyRange> {
        self.get(key).and_then(|d| d.healthy_range)
    }

    /// Applies an override on top of the existing (or a bare) descriptor.
    pub fn apply_override(&mut self, key: MetricKey, patch: &MetricOverride) {
        let mut descriptor = self.describe(key);
        if let Some(label) = &patch.label {
            descriptor.label = label.clone();
        }
        if let Some(unit) = &patch.unit {
            descriptor.unit = unit.clone();
        }
        if let Some(color) = &patch.color {
            descriptor.color = color.clone();
        }
        match (patch.healthy_min, patch.healthy_max, descriptor.healthy_range) {
            (Some(min), Some(max), _) => descriptor.healthy_range = Some(HealthyRange { min, max }),
            (Some(min), None, Some(range)) => {
                descriptor.healthy_range = Some(HealthyRange { min, ..range })
            }
            (None, Some(max), Some(range)) => {
                descriptor.healthy_range = Some(HealthyRange { max, ..range })
            }
            _ => {}
        }
        self.descriptors.insert(key, descriptor);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricKey, &MetricDescriptor)> {
        self.descriptors.iter()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            MetricKey::Temperature,
            MetricDescriptor::new("Temperature", "°C", "#ef4444", Some((18.0, 26.0))),
        );
        catalog.insert(
            MetricKey::Humidity,
            MetricDescriptor::new("Humidity", "%", "#3b82f6", Some((30.0, 60.0))),
        );
        catalog.insert(
            MetricKey::Lux,
            MetricDescriptor::new("Light", "lux", "#f59e0b", None),
        );
        catalog.insert(
            MetricKey::AqiPpm,
            MetricDescriptor::new("Air Quality", "ppm", "#10b981", Some((0.0, 400.0))),
        );
        catalog.insert(
            MetricKey::Pressure,
            MetricDescriptor::new("Pressure", "hPa", "#8b5cf6", Some((980.0, 1040.0))),
        );
        catalog.insert(
            MetricKey::RainAnalog,
            MetricDescriptor::new("Rain Sensor", "raw", "#0ea5e9", None),
        );
        catalog.insert(
            MetricKey::PrecipitationIntensity,
            MetricDescriptor::new("Precipitation Intensity", "%", "#06b6d4", Some((0.0, 20.0))),
        );
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_key_round_trips_through_str() {
        for key in MetricKey::ALL {
            assert_eq!(key.as_str().parse::<MetricKey>().unwrap(), key);
        }
        assert_eq!("AQI_PPM".parse::<MetricKey>().unwrap(), MetricKey::AqiPpm);
        assert!("windSpeed".parse::<MetricKey>().is_err());
    }

    #[test]
    fn test_metric_key_serializes_camel_case() {
        let json = serde_json::to_string(&MetricKey::PrecipitationIntensity).unwrap();
        assert_eq!(json, "\"precipitationIntensity\"");
    }

    #[test]
    fn test_override_patches_only_given_fields() {
        let mut catalog = MetricCatalog::default();
        catalog.apply_override(
            MetricKey::Temperature,
            &MetricOverride {
                unit: Some("°F".to_string()),
                healthy_max: Some(80.0),
                ..Default::default()
            },
        );

        let descriptor = catalog.get(MetricKey::Temperature).unwrap();
        assert_eq!(descriptor.label, "Temperature");
        assert_eq!(descriptor.unit, "°F");
        assert_eq!(
            descriptor.healthy_range,
            Some(HealthyRange {
                min: 18.0,
                max: 80.0
            })
        );
    }

    #[test]
    fn test_describe_falls_back_for_missing_entry() {
        let catalog = MetricCatalog::empty();
        let descriptor = catalog.describe(MetricKey::Lux);
        assert_eq!(descriptor.label, "lux");
        assert!(descriptor.healthy_range.is_none());
    }
}
