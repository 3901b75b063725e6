//! Data cleaning module for preprocessing datasets.
//!
//! This module provides functionality for:
//! - Dropping configured columns
//! - Removing duplicate rows while keeping row order
//! - Case and whitespace normalization of categorical columns

mod sanitizers;

use crate::config::CategoricalRule;
use crate::error::{PreprocessingError, Result, ResultExt};
use polars::prelude::*;
use tracing::debug;

/// Data cleaner for table-level cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Remove the given columns unconditionally.
    ///
    /// Every column must exist; a missing one fails with
    /// [`PreprocessingError::ColumnNotFound`].
    pub fn drop_columns(
        df: DataFrame,
        columns: &[String],
        processing_steps: &mut Vec<String>,
    ) -> Result<DataFrame> {
        if columns.is_empty() {
            return Ok(df);
        }

        for col in columns {
            if df.column(col).is_err() {
                return Err(PreprocessingError::ColumnNotFound(col.clone()));
            }
        }

        let cols_ref: Vec<PlSmallStr> = columns.iter().map(|s| s.as_str().into()).collect();
        let df = df.drop_many(cols_ref);

        debug!("Dropped columns: {:?}", columns);
        processing_steps.push(format!("Dropped column(s): {}", columns.join(", ")));

        Ok(df)
    }

    /// Remove rows that exactly repeat an earlier row across all columns.
    ///
    /// The first occurrence is kept and survivors stay in their original
    /// order. Returns the table and the number of rows removed.
    pub fn remove_duplicates(
        df: DataFrame,
        processing_steps: &mut Vec<String>,
    ) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let df = df
            .unique_stable(None, UniqueKeepStrategy::First, None)
            .context("Removing duplicate rows")?;
        let removed = before - df.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            processing_steps.push(format!(
                "Removed {} duplicate rows ({:.1}%)",
                removed, pct
            ));
            debug!("Removed {} duplicate rows", removed);
        } else {
            processing_steps.push("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
        }

        Ok((df, removed))
    }

    /// Apply each normalization rule to its column.
    ///
    /// Returns the table and, per rule, how many values changed.
    pub fn normalize_categoricals(
        mut df: DataFrame,
        rules: &[CategoricalRule],
        processing_steps: &mut Vec<String>,
    ) -> Result<(DataFrame, Vec<(String, usize)>)> {
        let mut changes = Vec::with_capacity(rules.len());

        for rule in rules {
            let series = df
                .column(&rule.column)
                .map_err(|_| PreprocessingError::ColumnNotFound(rule.column.clone()))?
                .as_materialized_series()
                .clone();

            let (normalized, changed) = sanitizers::normalize_categorical(&series, rule.case)?;
            df.replace(&rule.column, normalized)
                .context(format!("Normalizing column '{}'", rule.column))?;

            debug!(column = %rule.column, case = ?rule.case, changed, "Normalized categorical column");
            processing_steps.push(format!(
                "Normalized '{}' ({:?} case, trimmed): {} value(s) changed",
                rule.column, rule.case, changed
            ));
            changes.push((rule.column.clone(), changed));
        }

        Ok((df, changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaseRule;

    #[test]
    fn test_drop_columns() {
        let df = df![
            "Age" => [22.0, 38.0],
            "Cabin" => [None, Some("C85")],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let df = DataCleaner::drop_columns(df, &["Cabin".to_string()], &mut steps).unwrap();

        assert_eq!(df.get_column_names(), vec!["Age"]);
        assert!(steps[0].contains("Cabin"));
    }

    #[test]
    fn test_drop_missing_column_fails() {
        let df = df!["Age" => [22.0]].unwrap();
        let mut steps = Vec::new();

        let err = DataCleaner::drop_columns(df, &["Cabin".to_string()], &mut steps).unwrap_err();
        assert!(matches!(err, PreprocessingError::ColumnNotFound(ref c) if c == "Cabin"));
    }

    #[test]
    fn test_remove_duplicates_keeps_first_in_order() {
        let df = df![
            "PassengerId" => [3i64, 1, 3, 2, 1],
            "Sex" => ["male", "female", "male", "male", "female"],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let (df, removed) = DataCleaner::remove_duplicates(df, &mut steps).unwrap();

        assert_eq!(removed, 2);
        let ids: Vec<Option<i64>> = df.column("PassengerId").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_remove_duplicates_none_found() {
        let df = df!["a" => [1i64, 2, 3]].unwrap();
        let mut steps = Vec::new();

        let (df, removed) = DataCleaner::remove_duplicates(df, &mut steps).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(df.height(), 3);
        assert_eq!(steps[0], "No duplicate rows found");
    }

    #[test]
    fn test_normalize_categoricals() {
        let df = df![
            "Sex" => [" MALE", "female "],
            "Embarked" => [Some("s "), None],
        ]
        .unwrap();
        let rules = vec![
            CategoricalRule::new("Sex", CaseRule::Lower),
            CategoricalRule::new("Embarked", CaseRule::Upper),
        ];
        let mut steps = Vec::new();

        let (df, changes) = DataCleaner::normalize_categoricals(df, &rules, &mut steps).unwrap();

        let sex: Vec<Option<&str>> = df.column("Sex").unwrap().str().unwrap().into_iter().collect();
        let embarked: Vec<Option<&str>> = df.column("Embarked").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(sex, vec![Some("male"), Some("female")]);
        assert_eq!(embarked, vec![Some("S"), None]);
        assert_eq!(changes, vec![("Sex".to_string(), 2), ("Embarked".to_string(), 1)]);
        assert_eq!(steps.len(), 2);
    }
}
