#[cfg(test)]
mod tests {
    use crate::parsing::json_parser::{extract_records, parse_records_file, parse_records_str};
    use crate::parsing::raw_record::coerce_number;
    use crate::preprocessing::Normalizer;
    use chrono::Utc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test parsing a flat array of readings
    #[test]
    fn test_parse_flat_array() {
        let json = r#"[
            {"timestamp": "05/01/2024 08:00:00", "temperature": 21.5, "lux": 500},
            {"timestamp": "05/01/2024 09:00:00", "temperature": "22.0", "lux": "650"}
        ]"#;

        let result = parse_records_str(json);
        assert!(result.is_ok(), "Should parse flat array: {:?}", result.err());
        let records = result.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].timestamp_str(), Some("05/01/2024 09:00:00"));
        assert_eq!(coerce_number(records[1].temperature.as_ref()), Some(22.0));
    }

    /// Test parsing an object keyed by push id
    #[test]
    fn test_parse_keyed_object() {
        let json = r#"{
            "-NuA1": {"timestamp": "05/01/2024 08:00:00", "humidity": 40},
            "-NuA2": {"timestamp": "05/01/2024 08:05:00", "humidity": 41},
            "-NuA3": {"timestamp": "05/01/2024 08:10:00", "humidity": 42}
        }"#;

        let records = parse_records_str(json).unwrap();
        assert_eq!(records.len(), 3);
    }

    /// Test parsing a wrapped collection
    #[test]
    fn test_parse_wrapped_collection() {
        let json = r#"{
            "readings": [
                {"timestamp": "05/01/2024 08:00:00", "pressure": 1013.2}
            ],
            "station": "roof"
        }"#;

        let records = parse_records_str(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(coerce_number(records[0].pressure.as_ref()), Some(1013.2));
    }

    /// Test a single record object
    #[test]
    fn test_parse_single_record() {
        let json = r#"{"timestamp": "05/01/2024 08:00:00", "lux": 10}"#;
        let records = parse_records_str(json).unwrap();
        assert_eq!(records.len(), 1);
    }

    /// Non-object entries are skipped rather than failing the batch
    #[test]
    fn test_skip_non_object_entries() {
        let value = serde_json::json!([
            {"timestamp": "05/01/2024 08:00:00"},
            42,
            "garbage",
            null,
            {"timestamp": "05/01/2024 09:00:00"}
        ]);

        let records = extract_records(&value);
        assert_eq!(records.len(), 2);
    }

    /// A record carrying two aliases of one field is kept and normalizes
    #[test]
    fn test_duplicated_alias_record_is_kept() {
        let value = serde_json::json!([
            {"timestamp": "05/01/2024 08:00:00", "lux": 500, "light": 510, "temperature": 20}
        ]);

        let records = extract_records(&value);
        assert_eq!(records.len(), 1);

        let (points, stats) = Normalizer::with_timezone(Utc).normalize_batch(&records);
        assert_eq!(points.len(), 1);
        assert_eq!(stats.dropped, 0);
        assert_eq!(points[0].lux, 500.0);
        assert_eq!(points[0].temperature, 20.0);
    }

    /// Scalars at the top level yield no records
    #[test]
    fn test_scalar_payload_is_empty() {
        assert!(parse_records_str("12").unwrap().is_empty());
    }

    /// Invalid JSON is an error
    #[test]
    fn test_invalid_json() {
        let result = parse_records_str("[{\"timestamp\": ");
        assert!(result.is_err());
    }

    /// Test reading from a file
    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"[{{"timestamp": "05/01/2024 08:00:00", "temperature": 19.0}}]"#
        )
        .unwrap();

        let records = parse_records_file(file.path()).unwrap();
        assert_eq!(records.len(), 1);
    }

    /// Missing files report the path
    #[test]
    fn test_missing_file() {
        let result = parse_records_file(std::path::Path::new("/nonexistent/readings.json"));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("/nonexistent/readings.json"));
    }
}
