//! Untyped sensor records as delivered by the upstream store.
//!
//! Every field is optional and kept as a raw JSON value; interpretation happens in the
//! normalizer. A numeric field may arrive as a JSON number or as a numeric string.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::algorithms::stats::safe_number;

/// Accepted keys per field, canonical name first.
const TIMESTAMP_KEYS: &[&str] = &["timestamp"];
const TEMPERATURE_KEYS: &[&str] = &["temperature"];
const HUMIDITY_KEYS: &[&str] = &["humidity"];
const LUX_KEYS: &[&str] = &["lux", "light"];
const PRECIPITATION_KEYS: &[&str] = &["precipitation", "rainStatus", "rain"];
const RAIN_ANALOG_KEYS: &[&str] = &["rainAnalog", "rain_analog"];
const AIR_QUALITY_KEYS: &[&str] = &["airQuality", "air_quality", "airQualityStatus"];
const AQI_PPM_KEYS: &[&str] = &["aqiPpm", "aqi_ppm", "aqiPPM"];
const PRESSURE_KEYS: &[&str] = &["pressure"];

/// One raw reading, exactly as the external collaborator supplied it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSensorRecord {
    pub timestamp: Option<Value>,
    pub temperature: Option<Value>,
    pub humidity: Option<Value>,
    pub lux: Option<Value>,
    pub precipitation: Option<Value>,
    pub rain_analog: Option<Value>,
    pub air_quality: Option<Value>,
    pub aqi_ppm: Option<Value>,
    pub pressure: Option<Value>,
}

impl RawSensorRecord {
    /// Builds a record from a JSON value; `None` unless the value is an object.
    ///
    /// When a payload carries several aliases of one field, the first non-null key in
    /// canonical order wins. Unknown keys are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_object().map(Self::from_map)
    }

    /// Builds a record from an already-decoded JSON object.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            timestamp: first_present(map, TIMESTAMP_KEYS),
            temperature: first_present(map, TEMPERATURE_KEYS),
            humidity: first_present(map, HUMIDITY_KEYS),
            lux: first_present(map, LUX_KEYS),
            precipitation: first_present(map, PRECIPITATION_KEYS),
            rain_analog: first_present(map, RAIN_ANALOG_KEYS),
            air_quality: first_present(map, AIR_QUALITY_KEYS),
            aqi_ppm: first_present(map, AQI_PPM_KEYS),
            pressure: first_present(map, PRESSURE_KEYS),
        }
    }

    /// Timestamp as text, if it was supplied as a string.
    pub fn timestamp_str(&self) -> Option<&str> {
        self.timestamp.as_ref().and_then(Value::as_str)
    }
}

fn first_present(map: &Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
        .cloned()
}

/// Coerce a raw JSON value to a finite number.
///
/// Numbers pass through; strings are trimmed and parsed strictly. Anything else, and any
/// non-finite result, is absent.
///
/// # Example
/// ```
/// use serde_json::json;
/// use weather_core::parsing::raw_record::coerce_number;
///
/// assert_eq!(coerce_number(Some(&json!("21.5"))), Some(21.5));
/// assert_eq!(coerce_number(Some(&json!(4095))), Some(4095.0));
/// assert_eq!(coerce_number(Some(&json!("n/a"))), None);
/// assert_eq!(coerce_number(None), None);
/// ```
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.and_then(safe_number)
}

/// Coerce a raw JSON value to non-empty status text.
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_accepts_field_aliases() {
        let record = RawSensorRecord::from_value(&json!({
            "timestamp": "05/01/2024 08:00:00",
            "light": 512,
            "rainStatus": "No Rain",
            "aqi_ppm": "87.5",
            "unrelated": true
        }))
        .unwrap();

        assert_eq!(record.timestamp_str(), Some("05/01/2024 08:00:00"));
        assert_eq!(coerce_number(record.lux.as_ref()), Some(512.0));
        assert_eq!(coerce_text(record.precipitation.as_ref()).as_deref(), Some("No Rain"));
        assert_eq!(coerce_number(record.aqi_ppm.as_ref()), Some(87.5));
    }

    #[test]
    fn test_duplicated_aliases_keep_canonical_key() {
        let record = RawSensorRecord::from_value(&json!({
            "timestamp": "05/01/2024 08:00:00",
            "lux": 500,
            "light": 510,
            "rain": "Heavy Rain",
            "rainStatus": "No Rain",
            "aqi_ppm": 40,
            "aqiPpm": 12,
            "temperature": 20
        }))
        .unwrap();

        assert_eq!(coerce_number(record.lux.as_ref()), Some(500.0));
        assert_eq!(coerce_text(record.precipitation.as_ref()).as_deref(), Some("No Rain"));
        assert_eq!(coerce_number(record.aqi_ppm.as_ref()), Some(12.0));
        assert_eq!(coerce_number(record.temperature.as_ref()), Some(20.0));
    }

    #[test]
    fn test_null_alias_falls_through() {
        let record = RawSensorRecord::from_value(&json!({
            "timestamp": "05/01/2024 08:00:00",
            "lux": null,
            "light": 510
        }))
        .unwrap();
        assert_eq!(coerce_number(record.lux.as_ref()), Some(510.0));
    }

    #[test]
    fn test_non_object_is_not_a_record() {
        assert!(RawSensorRecord::from_value(&json!([1, 2])).is_none());
        assert!(RawSensorRecord::from_value(&json!("05/01/2024 08:00:00")).is_none());
    }

    #[test]
    fn test_coercion_rejects_non_finite_and_blank() {
        assert_eq!(coerce_number(Some(&json!("inf"))), None);
        assert_eq!(coerce_number(Some(&json!("NaN"))), None);
        assert_eq!(coerce_number(Some(&json!("   "))), None);
        assert_eq!(coerce_number(Some(&json!(true))), None);
        assert_eq!(coerce_number(Some(&Value::Null)), None);
        assert_eq!(coerce_text(Some(&json!("  "))), None);
        assert_eq!(coerce_text(Some(&json!(3))).as_deref(), Some("3"));
    }

    #[test]
    fn test_timestamp_must_be_text() {
        let record = RawSensorRecord {
            timestamp: Some(json!(1_704_441_600_000_i64)),
            ..Default::default()
        };
        assert_eq!(record.timestamp_str(), None);
    }
}
