//! Distribution statistics for a single metric: histogram, coefficient of variation and
//! padded chart bounds.

use serde::{Deserialize, Serialize};

use crate::algorithms::stats::{finite_values, mean, min_max, std_dev};

pub const MIN_HISTOGRAM_BINS: usize = 3;
pub const MAX_HISTOGRAM_BINS: usize = 10;

/// Slack for the inclusive upper edge of the last bin.
const BIN_EDGE_EPSILON: f64 = 1e-9;

/// One histogram bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// `"start - end"` with two decimals, or the single value for a degenerate histogram.
    pub range: String,
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Histogram over the finite values, `None` with fewer than two of them.
///
/// Bin count is `floor(sqrt(n))` clamped to `[3, 10]`. Bins are half-open except the last,
/// which includes the maximum. Empty bins are left out.
///
/// # Example
/// ```
/// use weather_core::algorithms::distribution::histogram;
///
/// let bins = histogram(&[10.0, 10.0, 10.0]).unwrap();
/// assert_eq!(bins.len(), 1);
/// assert_eq!(bins[0].range, "10.00");
/// assert_eq!(bins[0].count, 3);
/// ```
pub fn histogram(values: &[f64]) -> Option<Vec<HistogramBin>> {
    let finite = finite_values(values);
    if finite.len() < 2 {
        return None;
    }
    let (min, max) = min_max(&finite)?;

    if max == min {
        return Some(vec![HistogramBin {
            range: format!("{:.2}", min),
            start: min,
            end: max,
            count: finite.len(),
        }]);
    }

    let bin_count =
        ((finite.len() as f64).sqrt().floor() as usize).clamp(MIN_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS);
    let width = (max - min) / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for value in &finite {
        let index = if *value >= max - BIN_EDGE_EPSILON {
            bin_count - 1
        } else {
            (((value - min) / width).floor() as usize).min(bin_count - 1)
        };
        counts[index] += 1;
    }

    let bins: Vec<HistogramBin> = counts
        .into_iter()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .map(|(i, count)| {
            let start = min + i as f64 * width;
            let end = if i + 1 == bin_count {
                max
            } else {
                min + (i + 1) as f64 * width
            };
            HistogramBin {
                range: format!("{:.2} - {:.2}", start, end),
                start,
                end,
                count,
            }
        })
        .collect();

    Some(bins)
}

/// Standard deviation as a percentage of the mean.
///
/// `None` without finite values or when the mean is not positive.
///
/// # Example
/// ```
/// use weather_core::algorithms::distribution::coefficient_of_variation;
///
/// let values: Vec<f64> = (1..=10).map(f64::from).collect();
/// let cv = coefficient_of_variation(&values).unwrap();
/// assert!((cv - 52.2).abs() < 0.1);
/// assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), None);
/// ```
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let finite = finite_values(values);
    let avg = mean(&finite)?;
    if avg <= 0.0 {
        return None;
    }
    Some(std_dev(&finite) / avg * 100.0)
}

/// Chart bounds around a data range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

impl Default for AxisDomain {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

/// Share of the range used as padding, by the largest absolute bound.
fn padding_ratio(magnitude: f64) -> f64 {
    if magnitude < 10.0 {
        0.2
    } else if magnitude < 100.0 {
        0.1
    } else if magnitude < 1000.0 {
        0.05
    } else {
        0.02
    }
}

/// Padded chart bounds for data spanning `[min, max]`.
///
/// | data                     | pad                                  |
/// |--------------------------|--------------------------------------|
/// | flat, `|min| < 1`        | `1`                                  |
/// | flat, otherwise          | `|min| * 0.1`                        |
/// | largest `|bound|` < 10   | `range * 0.2`                        |
/// | largest `|bound|` < 100  | `range * 0.1`                        |
/// | largest `|bound|` < 1000 | `range * 0.05`                       |
/// | otherwise                | `range * 0.02`                       |
///
/// Non-negative data never gets a negative lower bound. Negative data whose maximum is at
/// most zero never gets a positive upper bound. Non-finite input yields `[0, 1]`.
pub fn padded_domain(min: f64, max: f64) -> AxisDomain {
    if !min.is_finite() || !max.is_finite() {
        return AxisDomain::default();
    }
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let range = max - min;

    let pad = if range == 0.0 {
        if min.abs() < 1.0 {
            1.0
        } else {
            min.abs() * 0.1
        }
    } else {
        range * padding_ratio(min.abs().max(max.abs()))
    };

    let mut lower = min - pad;
    let mut upper = max + pad;
    if min >= 0.0 && lower < 0.0 {
        lower = 0.0;
    }
    if min < 0.0 && max <= 0.0 && upper > 0.0 {
        upper = 0.0;
    }

    AxisDomain {
        min: lower,
        max: upper,
    }
}
