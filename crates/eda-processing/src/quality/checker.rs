//! Post-condition checks on the cleaned table.

use crate::config::{CaseRule, PipelineConfig};
use crate::error::Result;
use crate::types::OutlierBounds;
use crate::utils::{optional_f64_values, optional_string_values};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

/// No leading or trailing whitespace. The empty string qualifies.
static TRIMMED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(?:\S(?:.*\S)?)?$").expect("Invalid regex: trimmed"));

/// Slack for float comparisons against the capping fences.
const BOUND_EPSILON: f64 = 1e-9;

pub struct InvariantChecker;

impl InvariantChecker {
    /// Check the cleaned table against what the pipeline promises.
    ///
    /// Returns one message per violated invariant; an empty list means the
    /// table is clean.
    pub fn verify(
        df: &DataFrame,
        config: &PipelineConfig,
        bounds: &[OutlierBounds],
    ) -> Result<Vec<String>> {
        let mut violations = Vec::new();

        for col in &config.numeric_columns {
            let Ok(column) = df.column(col) else {
                violations.push(format!("Numeric column '{}' is missing", col));
                continue;
            };
            let values = optional_f64_values(column.as_materialized_series())?;

            let missing = values.iter().filter(|v| v.is_none()).count();
            if missing > 0 {
                violations.push(format!("'{}' still has {} missing value(s)", col, missing));
            }

            if let Some(b) = bounds.iter().find(|b| &b.column == col) {
                let outside = values
                    .iter()
                    .flatten()
                    .copied()
                    .filter(|v| *v < b.lower - BOUND_EPSILON || *v > b.upper + BOUND_EPSILON)
                    .count();
                if outside > 0 {
                    violations.push(format!(
                        "'{}' has {} value(s) outside [{}, {}]",
                        col, outside, b.lower, b.upper
                    ));
                }
            }
        }

        for col in &config.drop_columns {
            if df.column(col).is_ok() {
                violations.push(format!("Dropped column '{}' is still present", col));
            }
        }

        let distinct = df
            .unique_stable(None, UniqueKeepStrategy::First, None)?
            .height();
        if distinct != df.height() {
            violations.push(format!(
                "{} duplicate row(s) remain",
                df.height() - distinct
            ));
        }

        for rule in &config.categorical_rules {
            let Ok(column) = df.column(&rule.column) else {
                violations.push(format!("Categorical column '{}' is missing", rule.column));
                continue;
            };
            let values = optional_string_values(column.as_materialized_series())?;
            let bad = values
                .iter()
                .flatten()
                .filter(|v| !Self::is_normalized(v, rule.case))
                .count();
            if bad > 0 {
                violations.push(format!(
                    "'{}' has {} value(s) not {:?}-cased and trimmed",
                    rule.column, bad, rule.case
                ));
            }
        }

        Ok(violations)
    }

    fn is_normalized(value: &str, case: CaseRule) -> bool {
        let cased = match case {
            CaseRule::Lower => value.to_lowercase() == value,
            CaseRule::Upper => value.to_uppercase() == value,
        };
        cased && TRIMMED.is_match(value)
    }
}
