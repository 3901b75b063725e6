//! Imputation module for handling missing values.
//!
//! Numeric columns are filled with the median of their present values.

mod statistical;

pub use statistical::StatisticalImputer;
