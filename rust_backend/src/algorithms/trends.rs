//! Trend overlays: regression fits and trailing moving averages aligned with a series.
//!
//! A trend never fails the caller. When the requested overlay cannot be computed (too few
//! values, degenerate fit) the series comes back untrended.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::algorithms::regression::{fit_regression, RegressionModel, TrendError};
use crate::algorithms::stats::mean;
use crate::core::domain::SeriesPoint;
use crate::core::metrics::MetricKey;
use crate::error::AnalysisError;

pub const DEFAULT_POLYNOMIAL_ORDER: usize = 2;
pub const MIN_POLYNOMIAL_ORDER: usize = 2;
pub const DEFAULT_MOVING_AVERAGE_PERIOD: usize = 7;
pub const MIN_MOVING_AVERAGE_PERIOD: usize = 2;

/// Requested trend overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendType {
    #[default]
    None,
    Linear,
    Logarithmic,
    Exponential,
    Power,
    Polynomial,
    MovingAverage,
}

impl fmt::Display for TrendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrendType::None => "none",
            TrendType::Linear => "linear",
            TrendType::Logarithmic => "logarithmic",
            TrendType::Exponential => "exponential",
            TrendType::Power => "power",
            TrendType::Polynomial => "polynomial",
            TrendType::MovingAverage => "movingAverage",
        };
        f.write_str(name)
    }
}

impl FromStr for TrendType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "none" | "" => Ok(TrendType::None),
            "linear" => Ok(TrendType::Linear),
            "logarithmic" | "log" => Ok(TrendType::Logarithmic),
            "exponential" | "exp" => Ok(TrendType::Exponential),
            "power" => Ok(TrendType::Power),
            "polynomial" | "poly" => Ok(TrendType::Polynomial),
            "movingaverage" | "ma" => Ok(TrendType::MovingAverage),
            _ => Err(AnalysisError::InvalidParameter(format!(
                "unknown trend type '{}'",
                s
            ))),
        }
    }
}

/// Tunables for the polynomial and moving-average overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendOptions {
    pub polynomial_order: usize,
    pub moving_average_period: usize,
}

impl Default for TrendOptions {
    fn default() -> Self {
        Self {
            polynomial_order: DEFAULT_POLYNOMIAL_ORDER,
            moving_average_period: DEFAULT_MOVING_AVERAGE_PERIOD,
        }
    }
}

impl TrendOptions {
    /// Raises values below their minimum to the minimum.
    pub fn clamped(self) -> Self {
        if self.polynomial_order < MIN_POLYNOMIAL_ORDER {
            warn!(
                "Polynomial order {} below minimum, using {}",
                self.polynomial_order, MIN_POLYNOMIAL_ORDER
            );
        }
        if self.moving_average_period < MIN_MOVING_AVERAGE_PERIOD {
            warn!(
                "Moving-average period {} below minimum, using {}",
                self.moving_average_period, MIN_MOVING_AVERAGE_PERIOD
            );
        }
        Self {
            polynomial_order: self.polynomial_order.max(MIN_POLYNOMIAL_ORDER),
            moving_average_period: self.moving_average_period.max(MIN_MOVING_AVERAGE_PERIOD),
        }
    }
}

/// A series point with its trend value attached under `<series key>_trend`.
///
/// The trend map is empty when no overlay applies, so the point serializes unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendedPoint<P> {
    #[serde(flatten)]
    pub point: P,
    #[serde(flatten)]
    pub trend: BTreeMap<String, f64>,
}

impl<P> TrendedPoint<P> {
    pub fn untrended(point: P) -> Self {
        Self {
            point,
            trend: BTreeMap::new(),
        }
    }

    pub fn trend_value(&self) -> Option<f64> {
        self.trend.values().next().copied()
    }
}

/// Trailing moving average over `period` positions, inclusive of the current one.
///
/// The first `period - 1` positions have no average. A window containing a missing value
/// has no average either.
///
/// # Example
/// ```
/// use weather_core::algorithms::trends::moving_average;
///
/// let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
/// assert_eq!(
///     moving_average(&values, 3),
///     vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
/// );
/// ```
pub fn moving_average(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let period = period.max(1);
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window: Option<Vec<f64>> = values[i + 1 - period..=i].iter().copied().collect();
            window.and_then(|w| mean(&w))
        })
        .collect()
}

fn regression_model(trend: TrendType, options: &TrendOptions) -> Option<RegressionModel> {
    match trend {
        TrendType::Linear => Some(RegressionModel::Linear),
        TrendType::Logarithmic => Some(RegressionModel::Logarithmic),
        TrendType::Exponential => Some(RegressionModel::Exponential),
        TrendType::Power => Some(RegressionModel::Power),
        TrendType::Polynomial => Some(RegressionModel::Polynomial(options.polynomial_order)),
        TrendType::None | TrendType::MovingAverage => None,
    }
}

/// Regression overlay: fit over `(position, value)` pairs, evaluated at every position.
///
/// Positions are 1-based so logarithmic and power models are defined at the first point.
pub fn regression_trend(
    values: &[Option<f64>],
    model: RegressionModel,
) -> Result<Vec<Option<f64>>, TrendError> {
    let pairs: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| ((i + 1) as f64, v)))
        .collect();
    if pairs.len() < 2 {
        return Err(TrendError::InsufficientData {
            needed: 2,
            got: pairs.len(),
        });
    }

    let fit = fit_regression(&pairs, model)?;
    Ok((0..values.len())
        .map(|i| Some(fit.predict((i + 1) as f64)).filter(|v| v.is_finite()))
        .collect())
}

/// Overlay values aligned index-for-index with `values`, or `None` when no overlay applies.
pub fn trend_values(
    values: &[Option<f64>],
    trend: TrendType,
    options: &TrendOptions,
) -> Option<Vec<Option<f64>>> {
    let options = options.clamped();
    match trend {
        TrendType::None => None,
        TrendType::MovingAverage => Some(moving_average(values, options.moving_average_period)),
        _ => {
            let model = regression_model(trend, &options)?;
            match regression_trend(values, model) {
                Ok(overlay) => Some(overlay),
                Err(e) => {
                    debug!("Skipping {} trend: {}", trend, e);
                    None
                }
            }
        }
    }
}

/// Attach a `<series key>_trend` value for `metric` to every point.
///
/// Points come back untrended when the trend type is `None` or the overlay cannot be
/// computed; positions without an overlay value carry no trend key.
pub fn apply_trend<P: SeriesPoint + Clone>(
    points: &[P],
    metric: MetricKey,
    trend: TrendType,
    options: &TrendOptions,
) -> Vec<TrendedPoint<P>> {
    let values: Vec<Option<f64>> = points.iter().map(|p| p.metric_value(metric)).collect();

    let Some(overlay) = trend_values(&values, trend, options) else {
        return points.iter().cloned().map(TrendedPoint::untrended).collect();
    };

    let key = format!("{}_trend", P::series_key(metric));
    points
        .iter()
        .cloned()
        .zip(overlay)
        .map(|(point, value)| {
            let mut trend = BTreeMap::new();
            if let Some(value) = value {
                trend.insert(key.clone(), value);
            }
            TrendedPoint { point, trend }
        })
        .collect()
}
