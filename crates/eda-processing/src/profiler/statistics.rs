//! Numeric primitives shared by imputation, outlier capping and reporting.
//!
//! Quantiles use linear interpolation between closest ranks: for sorted
//! values `x` of length `n`, position `h = (n - 1) * p` and
//! `q = x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.
//! This matches the default of NumPy and pandas, so quartiles and bounds agree
//! bit-for-bit with those tools on the same data.

use crate::types::DescriptiveStats;
use crate::utils::present_f64_values;
use polars::prelude::*;

/// Sums of squares/cubes below this are treated as zero.
const FP_ZERO: f64 = 1e-14;

/// Sort values ascending. NaNs are expected to be filtered out already.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Linear-interpolation quantile of already sorted values.
///
/// Returns `None` for an empty slice. `p` is clamped into `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = h - lo as f64;

    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Linear-interpolation quantile of unsorted values.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    quantile_sorted(&sorted(values), p)
}

/// Median of the values (the 50% linear quantile).
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (ddof = 1).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Adjusted Fisher-Pearson skewness (G1).
///
/// `G1 = n * sqrt(n - 1) / (n - 2) * m3 / m2^1.5` with `m2`, `m3` the sums
/// of squared and cubed deviations. Undefined below 3 values; a constant
/// column has skewness 0.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }

    let mean = mean(values)?;
    let mut m2: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let mut m3: f64 = values.iter().map(|v| (v - mean).powi(3)).sum();
    if m2.abs() < FP_ZERO {
        m2 = 0.0;
    }
    if m3.abs() < FP_ZERO {
        m3 = 0.0;
    }

    if m2 == 0.0 {
        return Some(0.0);
    }

    let n = n as f64;
    Some(n * (n - 1.0).sqrt() / (n - 2.0) * m3 / m2.powf(1.5))
}

/// Pearson correlation over pairs where both sides are present.
///
/// Undefined with fewer than 2 complete pairs or when either side is constant.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

/// `describe()`-style summary of a slice of present values.
pub fn describe_values(column: &str, values: &[f64]) -> DescriptiveStats {
    let sorted = sorted(values);
    DescriptiveStats {
        column: column.to_string(),
        count: sorted.len(),
        mean: mean(&sorted),
        std: sample_std(&sorted),
        min: sorted.first().copied(),
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// `describe()`-style summary of a numeric series; nulls are not counted.
pub fn describe_series(series: &Series) -> PolarsResult<DescriptiveStats> {
    let values = present_f64_values(series)?;
    Ok(describe_values(series.name().as_str(), &values))
}
