//! Read-only statistics over the cleaned table.
//!
//! - Descriptive statistics and skewness for every numeric column
//! - Value frequency tables for categorical columns
//! - Correlation matrix, histograms and grouped summaries

pub mod bivariate;
pub mod frequency;
pub mod statistics;

use crate::config::PipelineConfig;
use crate::error::{PreprocessingError, Result};
use crate::types::{ColumnSkewness, DatasetStatistics};
use crate::utils::{numeric_column_names, present_f64_values};
use polars::prelude::*;
use tracing::debug;

/// Extracts statistics from a table without modifying it.
pub struct DataProfiler;

impl DataProfiler {
    /// Compute every statistic the report carries.
    ///
    /// Describe and skewness cover all numeric columns, so pass-through columns
    /// such as `Pclass` or `SibSp` are summarized too. Histograms are limited
    /// to the configured numeric columns.
    pub fn extract_statistics(
        df: &DataFrame,
        config: &PipelineConfig,
    ) -> Result<DatasetStatistics> {
        let mut stats = DatasetStatistics::default();

        for name in numeric_column_names(df) {
            let series = df.column(&name)?.as_materialized_series();
            let values = present_f64_values(series)?;

            let described = statistics::describe_values(&name, &values);
            let skew = statistics::skewness(&values);
            debug!(
                column = %name,
                count = described.count,
                mean = ?described.mean,
                skewness = ?skew,
                "Described numeric column"
            );

            stats.descriptive.push(described);
            stats.skewness.push(ColumnSkewness {
                column: name,
                skewness: skew,
            });
        }

        for name in &config.frequency_columns {
            let series = Self::series(df, name)?;
            stats.frequencies.push(frequency::value_counts(series)?);
        }

        stats.correlation = bivariate::correlation_matrix(df)?;

        for name in &config.numeric_columns {
            let series = Self::series(df, name)?;
            stats
                .histograms
                .push(bivariate::histogram(series, config.histogram_bins)?);
        }

        for spec in &config.group_summaries {
            stats
                .group_summaries
                .push(bivariate::group_summary(df, spec)?);
        }

        Ok(stats)
    }

    fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
        df.column(name)
            .map(|c| c.as_materialized_series())
            .map_err(|_| PreprocessingError::ColumnNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned() -> DataFrame {
        df![
            "Pclass" => [3i64, 1, 3, 2, 3],
            "Sex" => ["male", "female", "female", "male", "male"],
            "Age" => [22.0, 38.0, 26.0, 35.0, 27.0],
            "Fare" => [7.25, 71.28, 7.92, 13.0, 8.05],
            "Embarked" => ["S", "C", "S", "S", "Q"],
        ]
        .unwrap()
    }

    #[test]
    fn test_extract_statistics_covers_all_numeric_columns() {
        let df = cleaned();
        let stats = DataProfiler::extract_statistics(&df, &PipelineConfig::default()).unwrap();

        let described: Vec<&str> = stats.descriptive.iter().map(|d| d.column.as_str()).collect();
        assert_eq!(described, vec!["Pclass", "Age", "Fare"]);
        assert_eq!(stats.describe("Age").unwrap().count, 5);
        assert_eq!(stats.describe("Age").unwrap().median, Some(27.0));
        assert!(stats.skewness_of("Fare").unwrap() > 0.0);
    }

    #[test]
    fn test_extract_statistics_frequencies() {
        let df = cleaned();
        let stats = DataProfiler::extract_statistics(&df, &PipelineConfig::default()).unwrap();

        assert_eq!(stats.frequencies.len(), 3);
        assert_eq!(stats.frequency("Sex").unwrap().count_of("male"), 3);
        assert_eq!(stats.frequency("Embarked").unwrap().counts[0].value, "S");
        assert_eq!(stats.frequency("Pclass").unwrap().count_of("3"), 3);
    }

    #[test]
    fn test_extract_statistics_histograms_and_groups() {
        let df = cleaned();
        let stats = DataProfiler::extract_statistics(&df, &PipelineConfig::default()).unwrap();

        assert_eq!(stats.histograms.len(), 2);
        assert!(stats.histograms.iter().all(|h| h.counts.len() == 20));
        assert!(stats.correlation.is_some());
        assert_eq!(
            stats.group_summaries.len(),
            PipelineConfig::default().group_summaries.len()
        );
    }

    #[test]
    fn test_extract_statistics_missing_frequency_column() {
        let df = cleaned().drop("Embarked").unwrap();
        let err = DataProfiler::extract_statistics(&df, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PreprocessingError::ColumnNotFound(ref c) if c == "Embarked"));
    }
}
