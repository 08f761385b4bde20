//! Numeric core of the analytics pipeline.
//!
//! # Components
//!
//! - [`stats`]: Safe coercion, mean, population standard deviation, summaries
//! - [`aggregation`]: Calendar-bucket aggregation (hourly, daily, ISO weekly, monthly)
//! - [`regression`]: Least-squares fits for the regression trend family
//! - [`trends`]: Trend overlays (regression and moving average) attached to series points
//! - [`periods`]: Day/night segmentation and duration regrouping
//! - [`distribution`]: Histogram, coefficient of variation, chart axis padding
//!
//! # Example
//!
//! ```
//! use weather_core::algorithms::{coefficient_of_variation, histogram};
//!
//! let values = [12.0, 14.5, 13.0, 18.2, 16.0];
//! let bins = histogram(&values).unwrap();
//! assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
//! assert!(coefficient_of_variation(&values).unwrap() > 0.0);
//! ```

pub mod aggregation;
pub mod distribution;
pub mod periods;
pub mod regression;
pub mod stats;
pub mod trends;

pub use aggregation::{aggregate, aggregate_buckets_in, aggregate_in, AggregatedSeries};
pub use distribution::{
    coefficient_of_variation, histogram, padded_domain, AxisDomain, HistogramBin,
};
pub use periods::{aggregate_durations, aggregate_durations_in, segment};
pub use regression::{fit_regression, RegressionFit, RegressionModel, TrendError};
pub use stats::{mean, std_dev, summarize};
pub use trends::{apply_trend, moving_average, trend_values, TrendOptions, TrendType, TrendedPoint};
