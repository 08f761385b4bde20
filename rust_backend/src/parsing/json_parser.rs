use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use super::raw_record::RawSensorRecord;

/// Candidate keys that may wrap the list of readings in the JSON payload
const COLLECTION_KEYS: &[&str] = &["readings", "records", "data", "sensorData", "weatherData"];

/// Parse raw sensor records from a JSON file
pub fn parse_records_file(path: &Path) -> Result<Vec<RawSensorRecord>> {
    let json_content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sensor records file: {}", path.display()))?;

    parse_records_str(&json_content)
        .with_context(|| format!("Failed to parse sensor records in {}", path.display()))
}

/// Parse raw sensor records from a JSON string
pub fn parse_records_str(json_str: &str) -> Result<Vec<RawSensorRecord>> {
    let value: Value =
        serde_json::from_str(json_str).context("Failed to parse sensor records JSON")?;

    Ok(extract_records(&value))
}

/// Extract records from an already-decoded JSON value.
///
/// Accepts a bare array, an object wrapping the collection under a known key, a single
/// record object, or an object keyed by record id (the shape realtime key/value stores
/// return). Entries that are not objects are skipped.
pub fn extract_records(payload: &Value) -> Vec<RawSensorRecord> {
    let entries = find_record_entries(payload);
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        match RawSensorRecord::from_value(entry) {
            Some(record) => records.push(record),
            None => log::warn!(
                "Skipping sensor record entry: expected an object, found {}: {}",
                json_kind(entry),
                entry
            ),
        }
    }

    records
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Locate the record entries inside the payload
fn find_record_entries(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => {
            if obj.contains_key("timestamp") {
                return vec![payload];
            }

            for key in COLLECTION_KEYS {
                if let Some(inner) = obj.get(*key) {
                    if inner.is_array() || inner.is_object() {
                        return find_record_entries(inner);
                    }
                }
            }

            // Fallback: treat the object as an id -> record map
            obj.values().collect()
        }
        _ => Vec::new(),
    }
}
