//! Median imputation for numeric columns.

use crate::error::{PreprocessingError, Result, ResultExt};
use crate::profiler::statistics::median;
use crate::types::ImputationRecord;
use crate::utils::{fill_numeric_nulls, missing_count, present_f64_values, to_float_series};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill every missing value of `col_name` with the median of its present values.
    ///
    /// The column is cast to `Float64` first; entries that cannot be parsed as
    /// numbers count as missing. The median is computed once, before any value
    /// is filled. A column with no present value has no median and fails with
    /// [`PreprocessingError::NoValidValues`].
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<ImputationRecord> {
        let series = df
            .column(col_name)
            .map_err(|_| PreprocessingError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series()
            .clone();

        let float_series = to_float_series(&series)?;
        let missing = missing_count(&float_series)?;
        let present = present_f64_values(&float_series)?;
        let median_val =
            median(&present).ok_or_else(|| PreprocessingError::NoValidValues(col_name.to_string()))?;

        let filled = fill_numeric_nulls(&float_series, median_val)?;
        df.replace(col_name, filled)
            .context(format!("Imputing column '{}'", col_name))?;

        debug!(column = col_name, median = median_val, filled = missing, "Imputed median");
        processing_steps.push(format!(
            "Filled {} missing value(s) in '{}' with median: {:.2}",
            missing, col_name, median_val
        ));

        Ok(ImputationRecord {
            column: col_name.to_string(),
            median: median_val,
            filled: missing,
        })
    }
}
