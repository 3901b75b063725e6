//! Post-condition checks for the cleaned table.
//!
//! A violation here means a cleaning stage did not do its job. Violations
//! are collected as messages instead of aborting the run.

mod checker;

pub use checker::InvariantChecker;
