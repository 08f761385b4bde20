//! Parsers for raw sensor payloads.
//!
//! # Parsers
//!
//! - [`raw_record`]: The loosely-typed [`RawSensorRecord`] and field coercion helpers
//! - [`json_parser`]: Extract record collections from JSON documents
//!
//! # Example
//!
//! ```no_run
//! use weather_core::parsing::json_parser::parse_records_file;
//! use std::path::Path;
//!
//! let records = parse_records_file(Path::new("readings.json"))
//!     .expect("Failed to parse readings");
//! ```

pub mod json_parser;
pub mod raw_record;

#[cfg(test)]
mod json_parser_tests;

pub use raw_record::RawSensorRecord;
