//! Shared utilities for the cleaning pipeline.
//!
//! This module contains helpers used across multiple modules to keep the
//! series handling consistent.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Names of all numeric columns, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Series Access Utilities
// =============================================================================

/// Cast a series to `Float64`. Unparseable strings become null.
pub fn to_float_series(series: &Series) -> PolarsResult<Series> {
    series.cast(&DataType::Float64)
}

/// Collect the column's values as `Option<f64>`, preserving row order.
///
/// A `NaN` is a missing marker, same as null, and comes back as `None`.
pub fn optional_f64_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = to_float_series(series)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Number of missing cells: nulls, plus `NaN` in float columns.
pub fn missing_count(series: &Series) -> PolarsResult<usize> {
    if !matches!(series.dtype(), DataType::Float32 | DataType::Float64) {
        return Ok(series.null_count());
    }
    Ok(optional_f64_values(series)?
        .iter()
        .filter(|v| v.is_none())
        .count())
}

/// Collect only the present (non-null, non-NaN) values as `f64`.
pub fn present_f64_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let float_series = to_float_series(series)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Collect a column's values as display strings; nulls stay `None`.
///
/// Integer columns render without a decimal point (`1`, not `1.0`) so that
/// frequency and group keys read like the source data.
pub fn optional_string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null and `NaN` values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let values: Vec<f64> = optional_f64_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Clamp every present value of a numeric Series into `[lower, upper]`.
///
/// Nulls are kept as nulls; `NaN` becomes null. The result is always `Float64`.
pub fn clamp_numeric_series(series: &Series, lower: f64, upper: f64) -> PolarsResult<Series> {
    let values: Vec<Option<f64>> = optional_f64_values(series)?
        .into_iter()
        .map(|v| v.map(|val| val.clamp(lower, upper)))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

// =============================================================================
// Tests
// =============================================================================
