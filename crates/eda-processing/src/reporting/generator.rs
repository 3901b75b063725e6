use crate::error::{PreprocessingError, Result};
use crate::types::{
    ColumnSummary, DatasetStatistics, ImputationRecord, OutlierBounds, PipelineResult,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Everything a pipeline run produced, in serializable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdaReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file
    pub input_file: String,
    /// Path to the output file (if written)
    pub output_file: Option<String>,

    /// Summary of processing actions and results
    pub processing_summary: ProcessingSummaryReport,
    /// List of processing steps executed
    pub processing_steps: Vec<String>,

    pub imputations: Vec<ImputationRecord>,
    pub outlier_bounds: Vec<OutlierBounds>,
    pub statistics: DatasetStatistics,

    /// Per-column summaries of changes
    pub column_summaries: Vec<ColumnSummary>,
}

/// Summary of processing for the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummaryReport {
    /// Total execution time in milliseconds
    pub duration_ms: u64,
    /// Number of rows before preprocessing
    pub rows_before: usize,
    /// Number of rows after preprocessing
    pub rows_after: usize,
    /// Number of rows removed
    pub rows_removed: usize,
    /// Percentage of rows removed
    pub rows_removed_percent: f32,
    /// Number of columns before preprocessing
    pub columns_before: usize,
    /// Number of columns after preprocessing
    pub columns_after: usize,
    /// Number of columns removed
    pub columns_removed: usize,
    /// Share of non-null cells before (0.0-1.0)
    pub completeness_before: f32,
    /// Share of non-null cells after (0.0-1.0)
    pub completeness_after: f32,
    /// Warnings generated during processing
    pub warnings: Vec<String>,
}

/// The single line printed when a CLI run succeeds.
pub fn completion_message(output_file: &str) -> String {
    format!(
        "Data cleaning, univariate, bivariate, and multivariate EDA completed. Cleaned dataset saved as '{}'",
        output_file
    )
}

pub struct ReportGenerator;

impl ReportGenerator {
    /// Build a report from pipeline results.
    pub fn build_report(input_file: &str, result: &PipelineResult) -> EdaReport {
        let summary = &result.summary;

        let processing_summary = ProcessingSummaryReport {
            duration_ms: summary.duration_ms,
            rows_before: summary.rows_before,
            rows_after: summary.rows_after,
            rows_removed: summary.rows_removed,
            rows_removed_percent: summary.rows_removed_percentage(),
            columns_before: summary.columns_before,
            columns_after: summary.columns_after,
            columns_removed: summary.columns_removed,
            completeness_before: summary.completeness_before,
            completeness_after: summary.completeness_after,
            warnings: summary.warnings.clone(),
        };

        EdaReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            output_file: result
                .output_path
                .as_ref()
                .map(|p| p.display().to_string()),
            processing_summary,
            processing_steps: result.processing_steps.clone(),
            imputations: result.imputations.clone(),
            outlier_bounds: result.outlier_bounds.clone(),
            statistics: result.statistics.clone(),
            column_summaries: summary.column_summaries.clone(),
        }
    }

    /// Write a report as pretty-printed JSON, creating parent directories.
    pub fn write_report_to_file(report: &EdaReport, path: &Path) -> Result<()> {
        let write_failed = |reason: String| PreprocessingError::WriteFailed {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(path).map_err(|e| write_failed(e.to_string()))?;
        file.write_all(json.as_bytes())
            .map_err(|e| write_failed(e.to_string()))?;

        info!("Report saved: {}", path.display());
        Ok(())
    }

    /// Render a multi-line, human-readable digest of the report.
    pub fn render_summary(report: &EdaReport) -> String {
        let summary = &report.processing_summary;
        let stats = &report.statistics;
        let mut out = String::new();

        let rule = "=".repeat(80);
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "EDA SUMMARY");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(
            out,
            "Input:  {} ({} rows x {} columns)",
            report.input_file, summary.rows_before, summary.columns_before
        );
        if let Some(ref output_file) = report.output_file {
            let _ = writeln!(
                out,
                "Output: {} ({} rows x {} columns)",
                output_file, summary.rows_after, summary.columns_after
            );
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Processing Summary:");
        let _ = writeln!(out, "  Duration: {}ms", summary.duration_ms);
        let _ = writeln!(
            out,
            "  Rows: {} -> {} ({} removed)",
            summary.rows_before, summary.rows_after, summary.rows_removed
        );
        let _ = writeln!(
            out,
            "  Completeness: {:.1}% -> {:.1}%",
            summary.completeness_before * 100.0,
            summary.completeness_after * 100.0
        );
        let _ = writeln!(out);

        if !stats.descriptive.is_empty() {
            let _ = writeln!(out, "Numeric Columns:");
            let _ = writeln!(
                out,
                "  {:<12} {:>6} {:>10} {:>10} {:>10} {:>10} {:>8}",
                "column", "count", "mean", "std", "min", "max", "skew"
            );
            for d in &stats.descriptive {
                let _ = writeln!(
                    out,
                    "  {:<12} {:>6} {:>10} {:>10} {:>10} {:>10} {:>8}",
                    d.column,
                    d.count,
                    fmt_opt(d.mean),
                    fmt_opt(d.std),
                    fmt_opt(d.min),
                    fmt_opt(d.max),
                    fmt_opt(stats.skewness_of(&d.column)),
                );
            }
            let _ = writeln!(out);
        }

        for table in &stats.frequencies {
            let counts: Vec<String> = table
                .counts
                .iter()
                .map(|c| format!("{}={}", c.value, c.count))
                .collect();
            let _ = writeln!(out, "{}: {}", table.column, counts.join(", "));
        }

        if !summary.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Warnings:");
            for warning in &summary.warnings {
                let _ = writeln!(out, "  ! {}", warning);
            }
        }
        let _ = writeln!(out, "{}", rule);

        out
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DescriptiveStats, FrequencyTable, PreprocessingSummary, ValueCount};
    use polars::prelude::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_result() -> PipelineResult {
        let summary = PreprocessingSummary {
            rows_before: 4,
            rows_after: 3,
            rows_removed: 1,
            columns_before: 5,
            columns_after: 4,
            columns_removed: 1,
            warnings: vec!["something odd".to_string()],
            ..Default::default()
        };

        let statistics = DatasetStatistics {
            descriptive: vec![DescriptiveStats {
                column: "Age".to_string(),
                count: 3,
                mean: Some(30.0),
                std: Some(8.0),
                min: Some(22.0),
                q25: Some(26.0),
                median: Some(30.0),
                q75: Some(34.0),
                max: Some(38.0),
            }],
            frequencies: vec![FrequencyTable {
                column: "Sex".to_string(),
                counts: vec![ValueCount {
                    value: "male".to_string(),
                    count: 2,
                }],
                missing: 0,
            }],
            ..Default::default()
        };

        PipelineResult {
            data: df!["Age" => [22.0, 30.0, 38.0]].unwrap(),
            output_path: Some(PathBuf::from("output/cleaned_data.csv")),
            imputations: vec![ImputationRecord {
                column: "Age".to_string(),
                median: 30.0,
                filled: 1,
            }],
            outlier_bounds: Vec::new(),
            statistics,
            processing_steps: vec!["Dropped column(s): Cabin".to_string()],
            summary,
        }
    }

    #[test]
    fn test_build_report() {
        let report = ReportGenerator::build_report("data/test.csv", &sample_result());

        assert_eq!(report.input_file, "data/test.csv");
        assert_eq!(report.output_file.as_deref(), Some("output/cleaned_data.csv"));
        assert_eq!(report.processing_summary.rows_removed, 1);
        assert!((report.processing_summary.rows_removed_percent - 25.0).abs() < 1e-4);
        assert_eq!(report.imputations[0].median, 30.0);
    }

    #[test]
    fn test_report_json_uses_describe_labels() {
        let report = ReportGenerator::build_report("data/test.csv", &sample_result());
        let json = serde_json::to_value(&report).unwrap();

        let age = &json["statistics"]["descriptive"][0];
        assert_eq!(age["column"], "Age");
        assert_eq!(age["25%"], 26.0);
        assert_eq!(age["50%"], 30.0);
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join("eda.json");
        let report = ReportGenerator::build_report("data/test.csv", &sample_result());

        ReportGenerator::write_report_to_file(&report, &path).unwrap();

        let written: EdaReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.processing_steps, report.processing_steps);
    }

    #[test]
    fn test_render_summary() {
        let report = ReportGenerator::build_report("data/test.csv", &sample_result());
        let text = ReportGenerator::render_summary(&report);

        assert!(text.contains("Rows: 4 -> 3 (1 removed)"));
        assert!(text.contains("Sex: male=2"));
        assert!(text.contains("! something odd"));
    }

    #[test]
    fn test_completion_message() {
        assert_eq!(
            completion_message("cleaned_data.csv"),
            "Data cleaning, univariate, bivariate, and multivariate EDA completed. Cleaned dataset saved as 'cleaned_data.csv'"
        );
    }
}
