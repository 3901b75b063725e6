//! Outlier handling module.
//!
//! Numeric columns are capped into the Tukey fences
//! `[Q1 - k*IQR, Q3 + k*IQR]`. Values outside are moved onto the nearest
//! fence; no row is removed.

use crate::error::{PreprocessingError, Result, ResultExt};
use crate::profiler::statistics::{quantile_sorted, sorted};
use crate::types::OutlierBounds;
use crate::utils::{clamp_numeric_series, optional_f64_values, present_f64_values};
use polars::prelude::*;
use tracing::debug;

/// Handles outlier detection and treatment.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Compute the IQR fences of a set of present values.
    ///
    /// Quartiles use linear interpolation. Returns `None` when there are no
    /// values. The capped counters are left at zero.
    pub fn compute_bounds(column: &str, values: &[f64], k: f64) -> Option<OutlierBounds> {
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;

        Some(OutlierBounds {
            column: column.to_string(),
            q1,
            q3,
            iqr,
            lower: q1 - k * iqr,
            upper: q3 + k * iqr,
            capped_low: 0,
            capped_high: 0,
        })
    }

    /// Clamp a numeric column into its IQR fences.
    ///
    /// The quartiles are taken over the column as it stands, which in the
    /// pipeline means after median imputation and de-duplication. Imputed
    /// medians therefore count towards the quartiles and pull the fences
    /// towards the center. This is intentional and kept.
    pub fn cap_outliers(
        df: &mut DataFrame,
        col_name: &str,
        k: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<OutlierBounds> {
        let series = df
            .column(col_name)
            .map_err(|_| PreprocessingError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series()
            .clone();

        let present = present_f64_values(&series)?;
        let mut bounds = Self::compute_bounds(col_name, &present, k)
            .ok_or_else(|| PreprocessingError::NoValidValues(col_name.to_string()))?;

        // Count outliers before capping
        for val in optional_f64_values(&series)?.into_iter().flatten() {
            if val < bounds.lower {
                bounds.capped_low += 1;
            } else if val > bounds.upper {
                bounds.capped_high += 1;
            }
        }

        let capped = clamp_numeric_series(&series, bounds.lower, bounds.upper)?;
        df.replace(col_name, capped)
            .context(format!("Capping column '{}'", col_name))?;

        debug!(
            column = col_name,
            q1 = bounds.q1,
            q3 = bounds.q3,
            lower = bounds.lower,
            upper = bounds.upper,
            capped = bounds.capped_total(),
            "Capped outliers"
        );
        processing_steps.push(format!(
            "Capped {} outlier(s) in '{}' to [{:.2}, {:.2}] (IQR x {})",
            bounds.capped_total(),
            col_name,
            bounds.lower,
            bounds.upper,
            k
        ));

        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, col: &str) -> Vec<Option<f64>> {
        df.column(col).unwrap().f64().unwrap().into_iter().collect()
    }

    // ==================== compute_bounds tests ====================

    #[test]
    fn test_compute_bounds_linear_quartiles() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let bounds = OutlierHandler::compute_bounds("value", &data, 1.5).unwrap();

        assert!((bounds.q1 - 3.25).abs() < 1e-12);
        assert!((bounds.q3 - 7.75).abs() < 1e-12);
        assert!((bounds.iqr - 4.5).abs() < 1e-12);
        assert!((bounds.lower + 3.5).abs() < 1e-12);
        assert!((bounds.upper - 14.5).abs() < 1e-12);
    }

    #[test]
    fn test_compute_bounds_custom_multiplier() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let bounds = OutlierHandler::compute_bounds("value", &data, 3.0).unwrap();
        // q1 = 2, q3 = 4, iqr = 2
        assert_eq!(bounds.lower, -4.0);
        assert_eq!(bounds.upper, 10.0);
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(OutlierHandler::compute_bounds("value", &[], 1.5).is_none());
    }

    // ==================== cap_outliers tests ====================

    #[test]
    fn test_cap_outliers_high_value() {
        let mut df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let bounds = OutlierHandler::cap_outliers(&mut df, "value", 1.5, &mut steps).unwrap();

        // Capping doesn't remove rows
        assert_eq!(df.height(), 10);
        assert_eq!(bounds.capped_high, 1);
        assert_eq!(bounds.capped_low, 0);
        assert_eq!(values(&df, "value")[9], Some(14.5));
        assert_eq!(values(&df, "value")[0], Some(1.0));
        assert!(steps[0].contains("Capped 1 outlier"));
    }

    #[test]
    fn test_cap_outliers_low_value() {
        let mut df = df![
            "value" => [-50.0, 10.0, 11.0, 12.0, 13.0, 14.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let bounds = OutlierHandler::cap_outliers(&mut df, "value", 1.5, &mut steps).unwrap();

        assert_eq!(bounds.capped_low, 1);
        let capped = values(&df, "value");
        assert_eq!(capped[0], Some(bounds.lower));
        assert!(capped.iter().flatten().all(|v| bounds.contains(*v)));
    }

    #[test]
    fn test_cap_outliers_integer_column() {
        let mut df = df![
            "value" => [1i64, 2, 3, 4, 1000],
        ]
        .unwrap();
        let mut steps = vec![];

        let bounds = OutlierHandler::cap_outliers(&mut df, "value", 1.5, &mut steps).unwrap();

        // q1 = 2, q3 = 4, upper = 7
        assert_eq!(bounds.upper, 7.0);
        assert_eq!(values(&df, "value")[4], Some(7.0));
    }

    #[test]
    fn test_cap_outliers_constant_column_unchanged() {
        let mut df = df![
            "value" => [5.0, 5.0, 5.0],
        ]
        .unwrap();
        let mut steps = vec![];

        let bounds = OutlierHandler::cap_outliers(&mut df, "value", 1.5, &mut steps).unwrap();
        assert_eq!(bounds.capped_total(), 0);
        assert_eq!(values(&df, "value"), vec![Some(5.0); 3]);
    }

    #[test]
    fn test_cap_outliers_all_missing() {
        let mut df = df![
            "value" => [Option::<f64>::None, None],
        ]
        .unwrap();
        let mut steps = vec![];

        let err = OutlierHandler::cap_outliers(&mut df, "value", 1.5, &mut steps).unwrap_err();
        assert_eq!(err.error_code(), "NO_VALID_VALUES");
    }

    #[test]
    fn test_cap_outliers_missing_column() {
        let mut df = df!["other" => [1.0]].unwrap();
        let mut steps = vec![];

        let err = OutlierHandler::cap_outliers(&mut df, "value", 1.5, &mut steps).unwrap_err();
        assert_eq!(err.error_code(), "SCHEMA_ERROR");
    }
}
