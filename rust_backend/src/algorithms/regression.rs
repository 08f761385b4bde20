//! Least-squares regression fits used for trend overlays.
//!
//! Every model is fitted in closed form (or through the normal equations for polynomials)
//! over `(x, y)` pairs. Models that work in log space only use the pairs their transform
//! is defined for: logarithmic and power need `x > 0`, exponential and power need `y > 0`.

use serde::Serialize;

/// Reasons a fit cannot be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrendError {
    #[error("need at least {needed} usable points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("regression system is singular")]
    Singular,

    #[error("fit produced a non-finite coefficient")]
    NonFinite,
}

/// Regression family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "model", content = "order")]
pub enum RegressionModel {
    /// `y = a + b·x`
    Linear,
    /// `y = a + b·ln(x)`
    Logarithmic,
    /// `y = a·e^(b·x)`
    Exponential,
    /// `y = a·x^b`
    Power,
    /// `y = Σ cₖ·tᵏ` with `t = (x − x_shift) / x_scale`
    Polynomial(usize),
}

/// A fitted model.
///
/// For the two-parameter families `coefficients` is `[a, b]` as in the model formulas. For
/// polynomials it is `[c₀, …, c_order]` over the normalized abscissa; `x_shift` and
/// `x_scale` describe that normalization (they are `0` and `1` for the other families).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionFit {
    pub model: RegressionModel,
    pub coefficients: Vec<f64>,
    pub x_shift: f64,
    pub x_scale: f64,
    /// Coefficient of determination on the fitted pairs; `None` when `y` is constant.
    pub r_squared: Option<f64>,
}

impl RegressionFit {
    /// Evaluate the model at `x`. May be NaN where the model is undefined (`x ≤ 0` for
    /// logarithmic and power fits).
    pub fn predict(&self, x: f64) -> f64 {
        let c = &self.coefficients;
        match self.model {
            RegressionModel::Linear => c[0] + c[1] * x,
            RegressionModel::Logarithmic => c[0] + c[1] * x.ln(),
            RegressionModel::Exponential => c[0] * (c[1] * x).exp(),
            RegressionModel::Power => c[0] * x.powf(c[1]),
            RegressionModel::Polynomial(_) => {
                let t = (x - self.x_shift) / self.x_scale;
                c.iter().rev().fold(0.0, |acc, coef| acc * t + coef)
            }
        }
    }
}

/// Fit `model` to the given pairs.
///
/// # Example
/// ```
/// use weather_core::algorithms::regression::{fit_regression, RegressionModel};
///
/// let pairs = [(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
/// let fit = fit_regression(&pairs, RegressionModel::Linear).unwrap();
/// assert!((fit.predict(4.0) - 9.0).abs() < 1e-9);
/// ```
pub fn fit_regression(pairs: &[(f64, f64)], model: RegressionModel) -> Result<RegressionFit, TrendError> {
    let usable: Vec<(f64, f64)> = pairs
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    let mut fit = match model {
        RegressionModel::Linear => {
            let (a, b) = least_squares_line(&usable)?;
            two_parameter(model, a, b)
        }
        RegressionModel::Logarithmic => {
            let transformed: Vec<(f64, f64)> = usable
                .iter()
                .filter(|(x, _)| *x > 0.0)
                .map(|(x, y)| (x.ln(), *y))
                .collect();
            let (a, b) = least_squares_line(&transformed)?;
            two_parameter(model, a, b)
        }
        RegressionModel::Exponential => {
            let transformed: Vec<(f64, f64)> = usable
                .iter()
                .filter(|(_, y)| *y > 0.0)
                .map(|(x, y)| (*x, y.ln()))
                .collect();
            let (ln_a, b) = least_squares_line(&transformed)?;
            two_parameter(model, ln_a.exp(), b)
        }
        RegressionModel::Power => {
            let transformed: Vec<(f64, f64)> = usable
                .iter()
                .filter(|(x, y)| *x > 0.0 && *y > 0.0)
                .map(|(x, y)| (x.ln(), y.ln()))
                .collect();
            let (ln_a, b) = least_squares_line(&transformed)?;
            two_parameter(model, ln_a.exp(), b)
        }
        RegressionModel::Polynomial(order) => fit_polynomial(&usable, order)?,
    };

    if fit.coefficients.iter().any(|c| !c.is_finite()) {
        return Err(TrendError::NonFinite);
    }
    fit.r_squared = r_squared(&fit, &usable);
    Ok(fit)
}

fn two_parameter(model: RegressionModel, a: f64, b: f64) -> RegressionFit {
    RegressionFit {
        model,
        coefficients: vec![a, b],
        x_shift: 0.0,
        x_scale: 1.0,
        r_squared: None,
    }
}

/// Ordinary least squares line `y = a + b·x`, returned as `(a, b)`.
fn least_squares_line(pairs: &[(f64, f64)]) -> Result<(f64, f64), TrendError> {
    if pairs.len() < 2 {
        return Err(TrendError::InsufficientData {
            needed: 2,
            got: pairs.len(),
        });
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    // Centered sums keep large x offsets (epoch-sized) from cancelling.
    let (sxx, sxy) = pairs.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });

    if sxx <= f64::EPSILON * n {
        return Err(TrendError::Singular);
    }

    let slope = sxy / sxx;
    Ok((mean_y - slope * mean_x, slope))
}

fn fit_polynomial(pairs: &[(f64, f64)], order: usize) -> Result<RegressionFit, TrendError> {
    // order + 1 coefficients need at least as many pairs; checked before any size arithmetic.
    if order >= pairs.len() {
        return Err(TrendError::InsufficientData {
            needed: order.saturating_add(1),
            got: pairs.len(),
        });
    }
    let size = order + 1;

    let n = pairs.len() as f64;
    let x_shift = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let spread = pairs
        .iter()
        .map(|(x, _)| (x - x_shift).abs())
        .fold(0.0, f64::max);
    if spread == 0.0 {
        return Err(TrendError::Singular);
    }
    let x_scale = spread;

    // Normal equations: (VᵀV)·c = Vᵀy over the normalized abscissa.
    let mut matrix = vec![vec![0.0; size + 1]; size];
    for (x, y) in pairs {
        let t = (x - x_shift) / x_scale;
        let mut powers = vec![1.0; 2 * size - 1];
        for k in 1..powers.len() {
            powers[k] = powers[k - 1] * t;
        }
        for (row, cells) in matrix.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().take(size).enumerate() {
                *cell += powers[row + col];
            }
            cells[size] += powers[row] * y;
        }
    }

    let coefficients = solve_augmented(matrix)?;
    Ok(RegressionFit {
        model: RegressionModel::Polynomial(order),
        coefficients,
        x_shift,
        x_scale,
        r_squared: None,
    })
}

/// Gaussian elimination with partial pivoting on an `n × (n+1)` augmented matrix.
fn solve_augmented(mut m: Vec<Vec<f64>>) -> Result<Vec<f64>, TrendError> {
    let n = m.len();
    let scale = m
        .iter()
        .flat_map(|row| row.iter().take(n))
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let tolerance = scale.max(1.0) * 1e-12;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| m[a][col].abs().total_cmp(&m[b][col].abs()))
            .unwrap_or(col);
        if m[pivot][col].abs() < tolerance {
            return Err(TrendError::Singular);
        }
        m.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = m[row][col] / m[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                m[row][k] -= factor * m[col][k];
            }
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| m[row][k] * solution[k]).sum();
        solution[row] = (m[row][n] - tail) / m[row][row];
    }
    Ok(solution)
}

fn r_squared(fit: &RegressionFit, pairs: &[(f64, f64)]) -> Option<f64> {
    let evaluated: Vec<(f64, f64)> = pairs
        .iter()
        .map(|(x, y)| (*y, fit.predict(*x)))
        .filter(|(_, p)| p.is_finite())
        .collect();
    if evaluated.len() < 2 {
        return None;
    }

    let mean_y = evaluated.iter().map(|(y, _)| y).sum::<f64>() / evaluated.len() as f64;
    let ss_tot: f64 = evaluated.iter().map(|(y, _)| (y - mean_y).powi(2)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = evaluated.iter().map(|(y, p)| (y - p).powi(2)).sum();
    Some(1.0 - ss_res / ss_tot)
}
