// src/correlation.rs

use crate::error::PcaError;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Pearson correlation coefficient with its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
}

/// Pearson correlation between a score column and a raw feature column.
///
/// The p-value tests the null hypothesis of no linear relationship with a
/// Student-t statistic on n−2 degrees of freedom. With only two points the
/// correlation is always ±1 and carries no evidence, so p is 1.
///
/// # Errors
/// `InvalidInput` if the lengths differ, fewer than two values are given, a
/// value is non-finite, or either column is constant.
pub fn correlate(score_column: &[f64], feature_column: &[f64]) -> Result<Correlation, PcaError> {
    let n = score_column.len();
    if n != feature_column.len() {
        return Err(PcaError::InvalidInput(format!(
            "correlation inputs differ in length: {} vs {}",
            n,
            feature_column.len()
        )));
    }
    if n < 2 {
        return Err(PcaError::InvalidInput(format!(
            "correlation needs at least 2 observations, got {}",
            n
        )));
    }
    if score_column.iter().chain(feature_column).any(|v| !v.is_finite()) {
        return Err(PcaError::InvalidInput(
            "correlation inputs contain non-finite values".to_string(),
        ));
    }

    if is_constant(score_column) || is_constant(feature_column) {
        return Err(PcaError::InvalidInput(
            "correlation is undefined for a constant column".to_string(),
        ));
    }

    // r is scale invariant; working on max-abs scaled copies keeps the
    // products below from overflowing or underflowing.
    let xs = scaled_by_max_abs(score_column);
    let ys = scaled_by_max_abs(feature_column);
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if !(sxx > 0.0 && syy > 0.0 && sxy.is_finite()) {
        return Err(PcaError::InvalidInput(format!(
            "correlation moments are not usable (sxx = {sxx}, syy = {syy}, sxy = {sxy})"
        )));
    }

    let r = (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0);
    let p_value = two_sided_p_value(r, n)?;
    Ok(Correlation { r, p_value })
}

/// A column is constant when all of its values are bit-identical.
fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// Divides by the largest magnitude, so every value lands in [-1, 1].
/// Callers reject all-zero (constant) columns first.
fn scaled_by_max_abs(values: &[f64]) -> Vec<f64> {
    let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    values.iter().map(|v| v / scale).collect()
}

fn two_sided_p_value(r: f64, n: usize) -> Result<f64, PcaError> {
    if n == 2 {
        return Ok(1.0);
    }
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return Ok(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / one_minus_r2).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| PcaError::InvalidInput(format!("invalid Student-t parameters: {e}")))?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}
