//! Value frequency tables for categorical columns.

use crate::types::{FrequencyTable, ValueCount};
use crate::utils::optional_string_values;
use polars::prelude::*;
use std::collections::HashMap;

/// Count distinct present values of a column.
///
/// Missing values are excluded from the counts and reported separately.
/// Rows are ordered by count descending, ties broken by value ascending so
/// the table is deterministic.
pub fn value_counts(series: &Series) -> PolarsResult<FrequencyTable> {
    let values = optional_string_values(series)?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut missing = 0usize;
    for value in values {
        match value {
            Some(v) => *counts.entry(v).or_insert(0) += 1,
            None => missing += 1,
        }
    }

    let mut counts: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

    Ok(FrequencyTable {
        column: series.name().to_string(),
        counts,
        missing,
    })
}
