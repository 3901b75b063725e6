//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating load, cleaning, statistics and persistence.

use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::dataset::{load_csv_with_fallbacks, write_csv};
use crate::error::{PreprocessingError, Result};
use crate::imputers::StatisticalImputer;
use crate::pipeline::OutlierHandler;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::quality::InvariantChecker;
use crate::reporting::ReportGenerator;
use crate::utils::missing_count;
use crate::types::{
    ActionType, ColumnSummary, PipelineResult, PreprocessingAction, PreprocessingSummary,
};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The cleaning pipeline.
///
/// Stages run in a fixed order: load, validate, impute, drop, de-duplicate,
/// cap outliers, normalize categories, extract statistics, persist. Every
/// failure aborts the run.
///
/// # Example
///
/// ```rust,ignore
/// use eda_processing::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().input_path("data/test.csv").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured input file and run every stage on it.
    pub fn run(&self) -> Result<PipelineResult> {
        self.finish(self.load().and_then(|df| self.process_internal(df)))
    }

    /// Run every stage after loading on an in-memory table.
    ///
    /// The cleaned table is still persisted when `save_to_disk` is set.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        self.finish(self.process_internal(df))
    }

    fn finish(&self, result: Result<PipelineResult>) -> Result<PipelineResult> {
        match result {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn load(&self) -> Result<DataFrame> {
        let path = &self.config.input_path;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}", path.display()),
        ));
        info!("Loading dataset from: {}", path.display());

        let df = load_csv_with_fallbacks(path)?;
        info!("Dataset loaded successfully: {:?}", df.shape());
        Ok(df)
    }

    /// Check that the table has rows and every configured column.
    fn validate_schema(&self, df: &DataFrame) -> Result<()> {
        if df.height() == 0 {
            return Err(PreprocessingError::EmptyInput);
        }

        for col in self.config.required_columns() {
            if df.column(&col).is_err() {
                return Err(PreprocessingError::ColumnNotFound(col));
            }
        }

        Ok(())
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let config = &self.config;

        info!("Starting cleaning pipeline...");

        // Validate
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Validation,
            0.0,
            "Validating schema...",
        ));
        self.validate_schema(&df)?;

        let mut summary = PreprocessingSummary::new();
        summary.rows_before = df.height();
        summary.columns_before = df.width();
        summary.completeness_before = completeness(&df)?;
        for col in df.get_columns() {
            let mut col_summary = ColumnSummary::new(col.name().as_str(), col.dtype().to_string());
            col_summary.missing_before = missing_count(col.as_materialized_series())?;
            summary.add_column_summary(col_summary);
        }

        let mut processing_steps: Vec<String> = Vec::new();
        let mut df = df;

        // Step 1: Median imputation
        info!("Step 1: Imputing missing numeric values...");
        let mut imputations = Vec::with_capacity(config.numeric_columns.len());
        let total = config.numeric_columns.len();
        for (i, col) in config.numeric_columns.iter().enumerate() {
            self.report_progress(ProgressUpdate::for_column(
                PipelineStage::Imputation,
                col,
                i,
                total,
                format!("Imputing column {}", col),
            ));

            let record = StatisticalImputer::apply_numeric_median(&mut df, col, &mut processing_steps)?;
            if record.filled > 0 {
                summary.add_action(
                    PreprocessingAction::new(
                        ActionType::ValueImputed,
                        col,
                        format!("Filled {} missing value(s) with median", record.filled),
                    )
                    .with_details(format!("median = {}", record.median)),
                );
            }
            if let Some(cs) = summary.column_mut(col) {
                cs.imputed_with = Some(record.median);
            }
            imputations.push(record);
        }

        // Step 2: Drop columns
        info!("Step 2: Dropping columns {:?}...", config.drop_columns);
        self.report_progress(ProgressUpdate::new(
            PipelineStage::ColumnPruning,
            0.0,
            "Dropping columns...",
        ));
        df = DataCleaner::drop_columns(df, &config.drop_columns, &mut processing_steps)?;
        for col in &config.drop_columns {
            summary.add_action(PreprocessingAction::new(
                ActionType::ColumnRemoved,
                col,
                format!("Dropped column '{}'", col),
            ));
            if let Some(cs) = summary.column_mut(col) {
                cs.was_removed = true;
                cs.removal_reason = Some("Dropped unconditionally".to_string());
            }
        }

        // Step 3: De-duplicate
        info!("Step 3: Removing duplicate rows...");
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Deduplication,
            0.0,
            "Removing duplicate rows...",
        ));
        let (deduped, removed) = DataCleaner::remove_duplicates(df, &mut processing_steps)?;
        df = deduped;
        if removed > 0 {
            summary.add_action(PreprocessingAction::new(
                ActionType::DuplicatesRemoved,
                "dataset",
                format!("Removed {} duplicate row(s)", removed),
            ));
        }

        // Step 4: Outlier capping
        info!("Step 4: Capping outliers...");
        let mut outlier_bounds = Vec::with_capacity(total);
        for (i, col) in config.numeric_columns.iter().enumerate() {
            self.report_progress(ProgressUpdate::for_column(
                PipelineStage::OutlierCapping,
                col,
                i,
                total,
                format!("Capping outliers in {}", col),
            ));

            let bounds = OutlierHandler::cap_outliers(
                &mut df,
                col,
                config.iqr_multiplier,
                &mut processing_steps,
            )?;
            if bounds.capped_total() > 0 {
                summary.add_action(
                    PreprocessingAction::new(
                        ActionType::OutlierCapped,
                        col,
                        format!("Capped {} value(s) onto IQR bounds", bounds.capped_total()),
                    )
                    .with_details(format!("[{}, {}]", bounds.lower, bounds.upper)),
                );
            }
            if let Some(cs) = summary.column_mut(col) {
                cs.outliers_capped = bounds.capped_total();
            }
            outlier_bounds.push(bounds);
        }

        // Step 5: Categorical normalization
        info!("Step 5: Normalizing categorical columns...");
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Normalization,
            0.0,
            "Normalizing categorical columns...",
        ));
        let (normalized, changes) =
            DataCleaner::normalize_categoricals(df, &config.categorical_rules, &mut processing_steps)?;
        df = normalized;
        for (col, changed) in changes {
            if changed > 0 {
                summary.add_action(PreprocessingAction::new(
                    ActionType::CategoryNormalized,
                    &col,
                    format!("Normalized {} value(s)", changed),
                ));
            }
            if let Some(cs) = summary.column_mut(&col) {
                cs.values_normalized = changed;
            }
        }

        for violation in InvariantChecker::verify(&df, config, &outlier_bounds)? {
            warn!("Post-condition violated: {}", violation);
            summary.add_warning(violation);
        }

        // Step 6: Statistics
        info!("Step 6: Extracting statistics...");
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Statistics,
            0.0,
            "Extracting statistics...",
        ));
        let statistics = DataProfiler::extract_statistics(&df, config)?;
        debug!(
            "Described {} numeric column(s), {} frequency table(s)",
            statistics.descriptive.len(),
            statistics.frequencies.len()
        );

        // Finalize summary
        summary.rows_after = df.height();
        summary.columns_after = df.width();
        summary.rows_removed = summary.rows_before.saturating_sub(summary.rows_after);
        summary.columns_removed = summary.columns_before.saturating_sub(summary.columns_after);
        summary.completeness_after = completeness(&df)?;
        for col in df.get_columns() {
            if let Some(cs) = summary.column_mut(col.name().as_str()) {
                cs.final_type = col.dtype().to_string();
                cs.missing_after = missing_count(col.as_materialized_series())?;
            }
        }

        // Step 7: Persist
        let output_path = if config.save_to_disk {
            info!("Step 7: Saving output files...");
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Persisting,
                0.0,
                "Saving output files...",
            ));
            write_csv(&mut df, &config.output_path)?;
            processing_steps.push(format!(
                "Saved cleaned dataset to '{}'",
                config.output_path.display()
            ));
            summary.add_action(PreprocessingAction::new(
                ActionType::DataPersisted,
                "dataset",
                format!("Wrote {}", config.output_path.display()),
            ));
            Some(config.output_path.clone())
        } else {
            None
        };

        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        let result = PipelineResult {
            data: df,
            output_path,
            imputations,
            outlier_bounds,
            statistics,
            processing_steps,
            summary,
        };

        if config.save_to_disk
            && let Some(report_path) = &config.report_path
        {
            let report = ReportGenerator::build_report(
                &config.input_path.display().to_string(),
                &result,
            );
            ReportGenerator::write_report_to_file(&report, report_path)?;
        }

        info!(
            "Pipeline finished: {} rows x {} columns in {}ms",
            result.summary.rows_after, result.summary.columns_after, result.summary.duration_ms
        );
        Ok(result)
    }
}

/// Share of present cells in the table (0.0 - 1.0). `NaN` counts as missing.
fn completeness(df: &DataFrame) -> Result<f32> {
    if df.height() == 0 || df.width() == 0 {
        return Ok(0.0);
    }

    let total_cells = df.height() * df.width();
    let mut missing = 0usize;
    for col in df.get_columns() {
        missing += missing_count(col.as_materialized_series())?;
    }

    Ok(total_cells.saturating_sub(missing) as f32 / total_cells as f32)
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
