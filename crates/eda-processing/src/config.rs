//! Configuration types for the cleaning pipeline.
//!
//! Paths and column choices are plain data so they can come from a JSON
//! file, from CLI flags, or from code through [`PipelineConfig::builder()`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Case folding applied to a categorical column before trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseRule {
    /// Lowercase, then strip surrounding whitespace.
    Lower,
    /// Uppercase, then strip surrounding whitespace.
    Upper,
}

/// Normalization rule for one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalRule {
    pub column: String,
    pub case: CaseRule,
}

impl CategoricalRule {
    pub fn new(column: impl Into<String>, case: CaseRule) -> Self {
        Self {
            column: column.into(),
            case,
        }
    }
}

/// A numeric column summarized per category (or per combination of categories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummarySpec {
    /// Grouping columns, outermost first.
    pub by: Vec<String>,
    /// Numeric column being summarized.
    pub value: String,
}

impl GroupSummarySpec {
    pub fn new<I, S>(by: I, value: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            by: by.into_iter().map(Into::into).collect(),
            value: value.into(),
        }
    }
}

pub const DEFAULT_INPUT_PATH: &str = "data/test.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "output/cleaned_data.csv";
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

fn default_numeric_columns() -> Vec<String> {
    vec!["Age".to_string(), "Fare".to_string()]
}

fn default_drop_columns() -> Vec<String> {
    vec!["Cabin".to_string()]
}

fn default_categorical_rules() -> Vec<CategoricalRule> {
    vec![
        CategoricalRule::new("Sex", CaseRule::Lower),
        CategoricalRule::new("Embarked", CaseRule::Upper),
    ]
}

fn default_frequency_columns() -> Vec<String> {
    vec![
        "Sex".to_string(),
        "Embarked".to_string(),
        "Pclass".to_string(),
    ]
}

fn default_group_summaries() -> Vec<GroupSummarySpec> {
    vec![
        GroupSummarySpec::new(["Pclass"], "Fare"),
        GroupSummarySpec::new(["Sex"], "Age"),
        GroupSummarySpec::new(["Embarked"], "Fare"),
        GroupSummarySpec::new(["Pclass", "Sex"], "Fare"),
    ]
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API, or [`PipelineConfig::from_json_file`] to load one.
///
/// # Example
///
/// ```rust,ignore
/// use eda_processing::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .input_path("data/test.csv")
///     .output_path("output/cleaned_data.csv")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CSV file the table is loaded from.
    /// Default: "data/test.csv"
    pub input_path: PathBuf,

    /// CSV file the cleaned table is written to.
    /// Default: "output/cleaned_data.csv"
    pub output_path: PathBuf,

    /// Optional JSON analysis report destination.
    /// Default: None
    pub report_path: Option<PathBuf>,

    /// Numeric columns that are median-imputed and IQR-capped.
    /// Default: ["Age", "Fare"]
    pub numeric_columns: Vec<String>,

    /// Columns removed unconditionally.
    /// Default: ["Cabin"]
    pub drop_columns: Vec<String>,

    /// Case/whitespace normalization for categorical columns.
    /// Default: Sex -> lower, Embarked -> upper
    pub categorical_rules: Vec<CategoricalRule>,

    /// Columns whose value frequencies are reported.
    /// Default: ["Sex", "Embarked", "Pclass"]
    pub frequency_columns: Vec<String>,

    /// Grouped numeric summaries to report.
    pub group_summaries: Vec<GroupSummarySpec>,

    /// Multiplier `k` in `[Q1 - k*IQR, Q3 + k*IQR]`.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Number of equal-width histogram bins per numeric column.
    /// Default: 20
    pub histogram_bins: usize,

    /// Whether to write the cleaned CSV (and report) to disk.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            report_path: None,
            numeric_columns: default_numeric_columns(),
            drop_columns: default_drop_columns(),
            categorical_rules: default_categorical_rules(),
            frequency_columns: default_frequency_columns(),
            group_summaries: default_group_summaries(),
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Every column the pipeline reads, in first-use order and without repeats.
    ///
    /// Columns introduced by nothing but the input file (e.g. `Name`) are not
    /// listed: they simply pass through.
    pub fn required_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
            }
        };

        for col in &self.numeric_columns {
            push(col);
        }
        for col in &self.drop_columns {
            push(col);
        }
        for rule in &self.categorical_rules {
            push(&rule.column);
        }
        for col in &self.frequency_columns {
            push(col);
        }
        for spec in &self.group_summaries {
            for col in &spec.by {
                push(col);
            }
            push(&spec.value);
        }

        columns
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        // A dropped column can't be cleaned or reported on afterwards.
        for col in &self.drop_columns {
            let used_later = self.numeric_columns.contains(col)
                || self.categorical_rules.iter().any(|r| &r.column == col)
                || self.frequency_columns.contains(col)
                || self
                    .group_summaries
                    .iter()
                    .any(|g| g.by.contains(col) || &g.value == col);
            if used_later {
                return Err(ConfigValidationError::DroppedColumnInUse(col.clone()));
            }
        }

        for spec in &self.group_summaries {
            if spec.by.is_empty() {
                return Err(ConfigValidationError::EmptyGrouping(spec.value.clone()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be finite and non-negative)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid histogram bin count: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Column '{0}' is dropped but used by a later stage")]
    DroppedColumnInUse(String),

    #[error("Grouped summary of '{0}' has no grouping columns")]
    EmptyGrouping(String),
}

impl From<ConfigValidationError> for crate::error::PreprocessingError {
    fn from(e: ConfigValidationError) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
    numeric_columns: Option<Vec<String>>,
    drop_columns: Option<Vec<String>>,
    categorical_rules: Option<Vec<CategoricalRule>>,
    frequency_columns: Option<Vec<String>>,
    group_summaries: Option<Vec<GroupSummarySpec>>,
    iqr_multiplier: Option<f64>,
    histogram_bins: Option<usize>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Start from an existing configuration, e.g. one loaded from a file,
    /// so individual fields can be overridden.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            input_path: Some(config.input_path),
            output_path: Some(config.output_path),
            report_path: config.report_path,
            numeric_columns: Some(config.numeric_columns),
            drop_columns: Some(config.drop_columns),
            categorical_rules: Some(config.categorical_rules),
            frequency_columns: Some(config.frequency_columns),
            group_summaries: Some(config.group_summaries),
            iqr_multiplier: Some(config.iqr_multiplier),
            histogram_bins: Some(config.histogram_bins),
            save_to_disk: Some(config.save_to_disk),
        }
    }

    /// Set the CSV file to load.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the CSV file the cleaned table is written to.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set a destination for the JSON analysis report.
    pub fn report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Set the columns that are imputed and capped.
    pub fn numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns that are dropped unconditionally.
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the categorical normalization rules.
    pub fn categorical_rules(mut self, rules: Vec<CategoricalRule>) -> Self {
        self.categorical_rules = Some(rules);
        self
    }

    /// Set the columns whose frequencies are reported.
    pub fn frequency_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frequency_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the grouped summaries to compute.
    pub fn group_summaries(mut self, specs: Vec<GroupSummarySpec>) -> Self {
        self.group_summaries = Some(specs);
        self
    }

    /// Set the IQR multiplier used for outlier bounds.
    pub fn iqr_multiplier(mut self, k: f64) -> Self {
        self.iqr_multiplier = Some(k);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Enable or disable writing results to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            input_path: self
                .input_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH)),
            output_path: self
                .output_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            report_path: self.report_path,
            numeric_columns: self.numeric_columns.unwrap_or_else(default_numeric_columns),
            drop_columns: self.drop_columns.unwrap_or_else(default_drop_columns),
            categorical_rules: self
                .categorical_rules
                .unwrap_or_else(default_categorical_rules),
            frequency_columns: self
                .frequency_columns
                .unwrap_or_else(default_frequency_columns),
            group_summaries: self.group_summaries.unwrap_or_else(default_group_summaries),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(DEFAULT_IQR_MULTIPLIER),
            histogram_bins: self.histogram_bins.unwrap_or(DEFAULT_HISTOGRAM_BINS),
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.numeric_columns, vec!["Age", "Fare"]);
        assert_eq!(config.drop_columns, vec!["Cabin"]);
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.histogram_bins, 20);
        assert!(config.save_to_disk);
        assert_eq!(config.categorical_rules[0].case, CaseRule::Lower);
        assert_eq!(config.categorical_rules[1].case, CaseRule::Upper);
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
        assert!(config.report_path.is_none());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .input_path("in.csv")
            .output_path("out/clean.csv")
            .report_path("out/report.json")
            .iqr_multiplier(3.0)
            .histogram_bins(10)
            .save_to_disk(false)
            .build()
            .unwrap();

        assert_eq!(config.input_path, PathBuf::from("in.csv"));
        assert_eq!(config.output_path, PathBuf::from("out/clean.csv"));
        assert_eq!(config.report_path, Some(PathBuf::from("out/report.json")));
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.histogram_bins, 10);
        assert!(!config.save_to_disk);
    }

    #[test]
    fn test_builder_overrides_loaded_config() {
        let base = PipelineConfig::builder().iqr_multiplier(2.0).build().unwrap();
        let config = PipelineConfigBuilder::from_config(base)
            .input_path("other.csv")
            .build()
            .unwrap();

        assert_eq!(config.iqr_multiplier, 2.0);
        assert_eq!(config.input_path, PathBuf::from("other.csv"));
    }

    #[test]
    fn test_validation_invalid_iqr_multiplier() {
        let result = PipelineConfig::builder().iqr_multiplier(-1.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrMultiplier(_)
        ));

        let result = PipelineConfig::builder().iqr_multiplier(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_bins() {
        let result = PipelineConfig::builder().histogram_bins(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidHistogramBins(0)
        ));
    }

    #[test]
    fn test_validation_dropped_column_in_use() {
        let result = PipelineConfig::builder().drop_columns(["Sex"]).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DroppedColumnInUse(col) if col == "Sex"
        ));
    }

    #[test]
    fn test_required_columns_are_unique() {
        let config = PipelineConfig::default();
        let required = config.required_columns();

        assert_eq!(
            required,
            vec!["Age", "Fare", "Cabin", "Sex", "Embarked", "Pclass"]
        );
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{
            "input_path": "raw/passengers.csv",
            "output_path": "clean/passengers.csv",
            "iqr_multiplier": 2.5,
            "categorical_rules": [
                { "column": "Sex", "case": "lower" }
            ]
        }"#;

        let config: PipelineConfig =
            serde_json::from_str(json).expect("Should deserialize partial JSON");

        assert_eq!(config.input_path, PathBuf::from("raw/passengers.csv"));
        assert_eq!(config.iqr_multiplier, 2.5);
        assert_eq!(config.categorical_rules.len(), 1);
        // Fields not in the file fall back to defaults.
        assert_eq!(config.numeric_columns, vec!["Age", "Fare"]);
        assert_eq!(config.histogram_bins, 20);
    }

    #[test]
    fn test_config_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eda.json");
        std::fs::write(&path, r#"{ "histogram_bins": 5 }"#).unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.histogram_bins, 5);

        std::fs::write(&path, r#"{ "histogram_bins": 0 }"#).unwrap();
        let err = PipelineConfig::from_json_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_validation_error_converts_to_invalid_config() {
        let err: crate::error::PreprocessingError =
            ConfigValidationError::InvalidHistogramBins(0).into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.to_string().contains("histogram bin count"));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.numeric_columns, deserialized.numeric_columns);
        assert_eq!(config.categorical_rules, deserialized.categorical_rules);
        assert_eq!(config.group_summaries, deserialized.group_summaries);
    }
}
