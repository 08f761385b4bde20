//! Selection utilities over canonical point series.
//!
//! # Modules
//!
//! - [`filtering`]: Inclusive local date-range and time-of-day filters
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, Utc};
//! use weather_core::transformations::{filter_by_date_range, DateRange};
//!
//! let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 1, 1), None).unwrap();
//! let kept = filter_by_date_range(&[], &range, &Utc);
//! assert!(kept.is_empty());
//! ```

pub mod filtering;

pub use filtering::{filter_by_date_range, filter_by_time_of_day, DateRange, TimeOfDayRange};
