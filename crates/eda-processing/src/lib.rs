//! Passenger-list EDA cleaning library
//!
//! A small cleaning and exploratory-statistics pipeline for tabular passenger
//! data (the Titanic `test.csv` layout), built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs a fixed sequence of stages:
//!
//! - **Load**: read a CSV with header, with fallbacks for slightly malformed files
//! - **Impute**: fill missing `Age`/`Fare` with the column median
//! - **Prune**: drop `Cabin`
//! - **De-duplicate**: remove exact repeat rows, keeping the first
//! - **Cap outliers**: clamp `Age`/`Fare` into `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`
//! - **Normalize**: lowercase `Sex`, uppercase `Embarked`, trim both
//! - **Describe**: descriptive statistics, skewness, frequency tables,
//!   correlations, histograms and grouped summaries
//! - **Persist**: write the cleaned table as CSV without an index column
//!
//! Every column list and constant above is configurable through
//! [`PipelineConfig`]; the defaults reproduce the behavior described.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use eda_processing::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("data/test.csv")
//!     .output_path("output/cleaned_data.csv")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{} rows kept", result.data.height());
//! println!("Age skewness: {:?}", result.statistics.skewness_of("Age"));
//! ```
//!
//! # In-memory use
//!
//! [`Pipeline::process`] runs every stage after loading on a `DataFrame` you
//! already have. Set `save_to_disk(false)` to keep the result in memory only.

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod imputers;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    CaseRule, CategoricalRule, ConfigValidationError, GroupSummarySpec, PipelineConfig,
    PipelineConfigBuilder,
};
pub use dataset::{load_csv_with_fallbacks, write_csv};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::{
    ClosureProgressReporter, OutlierHandler, Pipeline, PipelineBuilder, PipelineStage,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use quality::InvariantChecker;
pub use reporting::{EdaReport, ProcessingSummaryReport, ReportGenerator, completion_message};
pub use types::{
    ActionType, ColumnSkewness, ColumnSummary, CorrelationMatrix, DatasetStatistics,
    DescriptiveStats, FrequencyTable, GroupStats, GroupSummary, Histogram, ImputationRecord,
    OutlierBounds, PipelineResult, PreprocessingAction, PreprocessingSummary, ValueCount,
};
pub use utils::{DtypeCategory, fill_numeric_nulls, get_dtype_category, is_numeric_dtype};
