//! Value-level normalization for categorical columns.

use crate::config::CaseRule;
use crate::error::Result;
use crate::utils::optional_string_values;
use polars::prelude::*;

/// Apply a case rule to a single value, then strip surrounding whitespace.
pub(crate) fn normalize_value(value: &str, case: CaseRule) -> String {
    let cased = match case {
        CaseRule::Lower => value.to_lowercase(),
        CaseRule::Upper => value.to_uppercase(),
    };
    cased.trim().to_string()
}

/// Normalize every present value of a categorical column.
///
/// Non-string columns are rendered as text first. Nulls pass through as
/// nulls. Returns the normalized series and how many values changed.
pub(crate) fn normalize_categorical(series: &Series, case: CaseRule) -> Result<(Series, usize)> {
    let values = optional_string_values(series)?;
    let mut changed = 0;

    let normalized: Vec<Option<String>> = values
        .into_iter()
        .map(|opt| {
            opt.map(|val| {
                let norm = normalize_value(&val, case);
                if norm != val {
                    changed += 1;
                }
                norm
            })
        })
        .collect();

    Ok((Series::new(series.name().clone(), normalized), changed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_value_lower() {
        assert_eq!(normalize_value("  Male ", CaseRule::Lower), "male");
        assert_eq!(normalize_value("FEMALE", CaseRule::Lower), "female");
    }

    #[test]
    fn test_normalize_value_upper() {
        assert_eq!(normalize_value(" s", CaseRule::Upper), "S");
        assert_eq!(normalize_value("c  ", CaseRule::Upper), "C");
        assert_eq!(normalize_value("   ", CaseRule::Upper), "");
    }

    #[test]
    fn test_normalize_categorical_counts_changes() {
        let series = Series::new("Sex".into(), &[Some(" Male"), Some("female"), None, Some("FEMALE ")]);
        let (normalized, changed) = normalize_categorical(&series, CaseRule::Lower).unwrap();

        let values: Vec<Option<&str>> = normalized.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("male"), Some("female"), None, Some("female")]);
        assert_eq!(changed, 2);
        assert_eq!(normalized.name().as_str(), "Sex");
    }

    #[test]
    fn test_normalize_categorical_already_clean() {
        let series = Series::new("Embarked".into(), &["S", "C", "Q"]);
        let (_, changed) = normalize_categorical(&series, CaseRule::Upper).unwrap();
        assert_eq!(changed, 0);
    }
}
