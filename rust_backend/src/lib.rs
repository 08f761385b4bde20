//! Weather Core - analytics for irregularly sampled environmental sensor series
//!
//! Turns raw sensor records into analysis-ready series: normalized points, calendar
//! buckets, trend overlays, day/night periods and distribution statistics.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use weather_core::core::metrics::MetricCatalog;
//! use weather_core::parsing::json_parser::parse_records_str;
//! use weather_core::services::{analyze_in, AnalysisRequest};
//!
//! let records = parse_records_str(
//!     r#"[{"timestamp": "05/01/2024 08:00:00", "temperature": 21.5, "lux": 620}]"#,
//! )
//! .unwrap();
//! let report = analyze_in(&records, &AnalysisRequest::default(), &MetricCatalog::default(), &Utc);
//! assert_eq!(report.point_count, 1);
//! ```

pub mod algorithms;
pub mod config;
pub mod core;
pub mod error;
pub mod parsing;
pub mod preprocessing;
pub mod services;
pub mod time;
pub mod transformations;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisResult};
