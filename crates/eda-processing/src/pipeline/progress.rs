//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline reports one update at the start of every stage and one per
//! column inside the per-column stages. Reporting is optional; without a
//! reporter the pipeline only logs.
//!
//! # Example
//!
//! ```rust,ignore
//! use eda_processing::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run();
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the input CSV
    Loading,
    /// Checking required columns and row count
    Validation,
    /// Median-filling numeric columns
    Imputation,
    /// Dropping unused columns
    ColumnPruning,
    /// Removing duplicate rows
    Deduplication,
    /// Capping numeric columns into their IQR fences
    OutlierCapping,
    /// Case and whitespace normalization of categorical columns
    Normalization,
    /// Extracting descriptive and grouped statistics
    Statistics,
    /// Writing the cleaned CSV and report
    Persisting,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Validation => "Validating Schema",
            Self::Imputation => "Imputing Values",
            Self::ColumnPruning => "Dropping Columns",
            Self::Deduplication => "Removing Duplicates",
            Self::OutlierCapping => "Capping Outliers",
            Self::Normalization => "Normalizing Categories",
            Self::Statistics => "Extracting Statistics",
            Self::Persisting => "Saving Results",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall pipeline (0.0 - 1.0).
    ///
    /// Weights of the working stages sum to 1.0; terminal states weigh nothing.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Validation => 0.02,
            Self::Imputation => 0.10,
            Self::ColumnPruning => 0.03,
            Self::Deduplication => 0.10,
            Self::OutlierCapping => 0.10,
            Self::Normalization => 0.10,
            Self::Statistics => 0.30,
            Self::Persisting => 0.15,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Validation => 0.10,
            Self::Imputation => 0.12,
            Self::ColumnPruning => 0.22,
            Self::Deduplication => 0.25,
            Self::OutlierCapping => 0.35,
            Self::Normalization => 0.45,
            Self::Statistics => 0.55,
            Self::Persisting => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Column being worked on in a per-column stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within `stage` (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    /// Columns finished so far and columns in the stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns_done: Option<(usize, usize)>,
}

impl ProgressUpdate {
    /// Update at `stage_progress` through a whole-table stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        Self {
            stage,
            column: None,
            progress: (stage.base_progress() + stage.weight() * stage_progress).clamp(0.0, 1.0),
            stage_progress,
            message: message.into(),
            columns_done: None,
        }
    }

    /// Update for the `index`-th of `total` columns in a per-column stage.
    pub fn for_column(
        stage: PipelineStage,
        column: &str,
        index: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let fraction = if total == 0 {
            0.0
        } else {
            index as f32 / total as f32
        };
        Self {
            column: Some(column.to_string()),
            columns_done: Some((index, total)),
            ..Self::new(stage, fraction, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, 1.0, message)
    }

    /// Terminal update; overall progress drops back to zero.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Failed, 0.0, message)
    }
}

/// Trait for receiving progress updates from the pipeline.
///
/// Implementations must be `Send + Sync` so a pipeline can be moved to a
/// worker thread together with its reporter.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage boundary and once per column in per-column stages.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
