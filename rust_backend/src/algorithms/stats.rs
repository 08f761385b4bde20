//! Shared numeric helpers: safe coercion, mean, population standard deviation.
//!
//! The arithmetic helpers expect finite input; filter with [`finite_values`] first.

use crate::core::domain::SummaryStats;

/// `Some(value)` when finite, `None` for NaN and infinities.
pub fn safe_number(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Copies the finite values out of `values`.
pub fn finite_values<'a, I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a f64>,
{
    values.into_iter().copied().filter(|v| v.is_finite()).collect()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by N).
///
/// Fewer than two samples have no spread, so the result is `0.0`.
///
/// # Example
/// ```
/// use weather_core::algorithms::stats::std_dev;
///
/// assert!((std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 2f64.sqrt()).abs() < 1e-12);
/// assert_eq!(std_dev(&[7.0]), 0.0);
/// ```
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let Some(avg) = mean(values) else {
        return 0.0;
    };
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - avg;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Smallest and largest value, `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

/// Summary statistics over the finite values in `values`.
pub fn summarize(values: &[f64]) -> Option<SummaryStats> {
    let finite = finite_values(values);
    let (min, max) = min_max(&finite)?;
    let avg = mean(&finite)?;

    Some(SummaryStats {
        // min <= avg <= max must hold under rounding.
        avg: avg.clamp(min, max),
        min,
        max,
        std_dev: std_dev(&finite),
        count: finite.len(),
    })
}
