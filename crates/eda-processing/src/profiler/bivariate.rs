//! Distribution and relationship summaries.
//!
//! These are the numbers behind the usual EDA charts: histograms for the
//! univariate view, grouped five-number summaries for bar/box/violin plots,
//! and the correlation matrix for heatmaps.

use crate::config::GroupSummarySpec;
use crate::error::{PreprocessingError, Result};
use crate::profiler::statistics::{mean, pearson, quantile_sorted, sorted};
use crate::types::{CorrelationMatrix, GroupStats, GroupSummary, Histogram};
use crate::utils::{numeric_column_names, optional_f64_values, optional_string_values, present_f64_values};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Pearson correlation between every pair of numeric columns.
///
/// Returns `None` when the table has no numeric column.
pub fn correlation_matrix(df: &DataFrame) -> Result<Option<CorrelationMatrix>> {
    let columns = numeric_column_names(df);
    if columns.is_empty() {
        return Ok(None);
    }

    let mut data: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    for name in &columns {
        let series = df.column(name)?.as_materialized_series();
        data.push(optional_f64_values(series)?);
    }

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                // Self-correlation is 1 unless the column is constant or empty.
                pearson(&data[i], &data[j]).map(|_| 1.0)
            } else {
                pearson(&data[i], &data[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(Some(CorrelationMatrix { columns, values }))
}

/// Equal-width histogram of a numeric column's present values.
///
/// The range spans `[min, max]`; a constant column is widened to
/// `[v - 0.5, v + 0.5]` so it still has `bins` bins.
pub fn histogram(series: &Series, bins: usize) -> Result<Histogram> {
    let column = series.name().to_string();
    if bins == 0 {
        return Err(PreprocessingError::InvalidConfig(
            "histogram needs at least one bin".to_string(),
        ));
    }

    let values = present_f64_values(series)?;
    if values.is_empty() {
        return Ok(Histogram {
            column,
            bin_edges: Vec::new(),
            counts: Vec::new(),
        });
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let bin_edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram {
        column,
        bin_edges,
        counts,
    })
}

/// Summarize `spec.value` for every combination of `spec.by` values.
///
/// Rows with a missing grouping key are left out, as are missing values of
/// the summarized column. Groups are ordered by key.
pub fn group_summary(df: &DataFrame, spec: &GroupSummarySpec) -> Result<GroupSummary> {
    let mut key_columns: Vec<Vec<Option<String>>> = Vec::with_capacity(spec.by.len());
    for name in &spec.by {
        let series = df
            .column(name)
            .map_err(|_| PreprocessingError::ColumnNotFound(name.clone()))?
            .as_materialized_series();
        key_columns.push(optional_string_values(series)?);
    }

    let value_series = df
        .column(&spec.value)
        .map_err(|_| PreprocessingError::ColumnNotFound(spec.value.clone()))?
        .as_materialized_series();
    let values = optional_f64_values(value_series)?;

    let mut grouped: BTreeMap<Vec<String>, Vec<f64>> = BTreeMap::new();
    'rows: for (row, value) in values.iter().enumerate() {
        let mut key = Vec::with_capacity(key_columns.len());
        for col in &key_columns {
            match &col[row] {
                Some(k) => key.push(k.clone()),
                None => continue 'rows,
            }
        }
        let bucket = grouped.entry(key).or_default();
        if let Some(v) = value
            && !v.is_nan()
        {
            bucket.push(*v);
        }
    }

    let groups = grouped
        .into_iter()
        .map(|(key, values)| {
            let sorted = sorted(&values);
            GroupStats {
                key,
                count: sorted.len(),
                mean: mean(&sorted),
                min: sorted.first().copied(),
                q25: quantile_sorted(&sorted, 0.25),
                median: quantile_sorted(&sorted, 0.5),
                q75: quantile_sorted(&sorted, 0.75),
                max: sorted.last().copied(),
            }
        })
        .collect();

    Ok(GroupSummary {
        by: spec.by.clone(),
        value: spec.value.clone(),
        groups,
    })
}
