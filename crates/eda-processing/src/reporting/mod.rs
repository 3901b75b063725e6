//! Report generation module.
//!
//! [`EdaReport`] gathers everything a run produced except the table itself:
//! the processing summary, the stage log, imputation and capping details, and
//! the extracted statistics. It serves as:
//! - JSON output to stdout (`--json` CLI flag)
//! - JSON file output (`report_path` / `--report`)
//! - Programmatic access in library mode
//!
//! # Example
//!
//! ```rust,ignore
//! use eda_processing::reporting::ReportGenerator;
//!
//! let report = ReportGenerator::build_report("data/test.csv", &result);
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ReportGenerator::write_report_to_file(&report, Path::new("output/report.json"))?;
//! ```

mod generator;

pub use generator::{EdaReport, ProcessingSummaryReport, ReportGenerator, completion_message};
