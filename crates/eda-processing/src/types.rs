use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Stage results
// ============================================================================

/// Median imputation applied to one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    /// Median of the present values, computed once before filling.
    pub median: f64,
    /// Number of missing entries that received the median.
    pub filled: usize,
}

/// IQR bounds computed for one numeric column, and what capping did with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    /// Values raised to `lower`.
    pub capped_low: usize,
    /// Values lowered to `upper`.
    pub capped_high: usize,
}

impl OutlierBounds {
    /// Total number of values moved onto a bound.
    pub fn capped_total(&self) -> usize {
        self.capped_low + self.capped_high
    }

    /// Whether `value` lies inside the closed interval `[lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Count, mean, std, min, quartiles and max of a numeric column.
///
/// Field names mirror the usual `describe()` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (ddof = 1); undefined for fewer than 2 values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Skewness of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSkewness {
    pub column: String,
    /// Adjusted Fisher-Pearson coefficient; undefined for fewer than 3 values.
    pub skewness: Option<f64>,
}

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Frequency of each distinct present value, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub column: String,
    pub counts: Vec<ValueCount>,
    /// Missing entries, which are not part of `counts`.
    pub missing: usize,
}

impl FrequencyTable {
    /// Count for a given value, 0 when the value never occurs.
    pub fn count_of(&self, value: &str) -> usize {
        self.counts
            .iter()
            .find(|vc| vc.value == value)
            .map(|vc| vc.count)
            .unwrap_or(0)
    }
}

/// Pairwise Pearson correlations; `values[i][j]` pairs `columns[i]` and `columns[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation of two named columns, if both are present and it is defined.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Equal-width histogram; `counts[i]` covers `[bin_edges[i], bin_edges[i + 1])`,
/// the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub column: String,
    pub bin_edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Summary of a numeric column within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// One value per grouping column, rendered as text.
    pub key: Vec<String>,
    pub count: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// A numeric column summarized per group, groups sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub by: Vec<String>,
    pub value: String,
    pub groups: Vec<GroupStats>,
}

impl GroupSummary {
    /// Stats for the group whose key matches `key` exactly.
    pub fn group(&self, key: &[&str]) -> Option<&GroupStats> {
        self.groups
            .iter()
            .find(|g| g.key.len() == key.len() && g.key.iter().zip(key).all(|(a, b)| a == b))
    }
}

/// Read-only statistics extracted from the cleaned table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub descriptive: Vec<DescriptiveStats>,
    pub skewness: Vec<ColumnSkewness>,
    pub frequencies: Vec<FrequencyTable>,
    pub correlation: Option<CorrelationMatrix>,
    pub histograms: Vec<Histogram>,
    pub group_summaries: Vec<GroupSummary>,
}

impl DatasetStatistics {
    pub fn describe(&self, column: &str) -> Option<&DescriptiveStats> {
        self.descriptive.iter().find(|d| d.column == column)
    }

    pub fn skewness_of(&self, column: &str) -> Option<f64> {
        self.skewness
            .iter()
            .find(|s| s.column == column)
            .and_then(|s| s.skewness)
    }

    pub fn frequency(&self, column: &str) -> Option<&FrequencyTable> {
        self.frequencies.iter().find(|f| f.column == column)
    }
}

// ============================================================================
// Pipeline result
// ============================================================================

/// Everything a pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The cleaned table.
    pub data: DataFrame,
    /// Where the cleaned table was written, if it was.
    pub output_path: Option<PathBuf>,
    pub imputations: Vec<ImputationRecord>,
    pub outlier_bounds: Vec<OutlierBounds>,
    pub statistics: DatasetStatistics,
    pub processing_steps: Vec<String>,
    pub summary: PreprocessingSummary,
}

impl PipelineResult {
    /// Bounds computed for `column` in this run.
    pub fn bounds_for(&self, column: &str) -> Option<&OutlierBounds> {
        self.outlier_bounds.iter().find(|b| b.column == column)
    }
}

// ============================================================================
// Preprocessing Summary Types
// ============================================================================

/// Human-readable summary of what the pipeline did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreprocessingSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of rows before preprocessing.
    pub rows_before: usize,
    /// Number of rows after preprocessing.
    pub rows_after: usize,
    /// Number of rows removed during preprocessing.
    pub rows_removed: usize,

    /// Number of columns before preprocessing.
    pub columns_before: usize,
    /// Number of columns after preprocessing.
    pub columns_after: usize,
    /// Number of columns removed during preprocessing.
    pub columns_removed: usize,

    /// Share of non-null cells before preprocessing (0.0 - 1.0).
    pub completeness_before: f32,
    /// Share of non-null cells after preprocessing (0.0 - 1.0).
    pub completeness_after: f32,

    /// List of actions taken during preprocessing.
    pub actions: Vec<PreprocessingAction>,

    /// Per-column summaries of changes.
    pub column_summaries: Vec<ColumnSummary>,

    /// Warnings and notes generated during preprocessing.
    pub warnings: Vec<String>,
}

impl PreprocessingSummary {
    /// Create a new empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the summary.
    pub fn add_action(&mut self, action: PreprocessingAction) {
        self.actions.push(action);
    }

    /// Add a warning to the summary.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Add a column summary.
    pub fn add_column_summary(&mut self, summary: ColumnSummary) {
        self.column_summaries.push(summary);
    }

    /// Mutable access to a column summary by name.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnSummary> {
        self.column_summaries.iter_mut().find(|c| c.name == name)
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed as f32 / self.rows_before as f32) * 100.0
        }
    }

    /// Calculate the percentage of columns removed.
    pub fn columns_removed_percentage(&self) -> f32 {
        if self.columns_before == 0 {
            0.0
        } else {
            (self.columns_removed as f32 / self.columns_before as f32) * 100.0
        }
    }

    /// Number of actions of a given type.
    pub fn count_actions(&self, action_type: ActionType) -> usize {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .count()
    }
}

/// A single action taken during preprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessingAction {
    /// Type of action performed.
    pub action_type: ActionType,
    /// Target of the action (column name or "dataset").
    pub target: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Additional details (e.g., values replaced, strategy used).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl PreprocessingAction {
    /// Create a new preprocessing action.
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    /// Add details to the action.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions that can be taken during preprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Missing values were imputed.
    ValueImputed,
    /// A column was removed from the dataset.
    ColumnRemoved,
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// Out-of-range values were clipped onto IQR bounds.
    OutlierCapped,
    /// Categorical text was case-folded and trimmed.
    CategoryNormalized,
    /// The cleaned table was written to disk.
    DataPersisted,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ValueImputed => "Value Imputed",
            Self::ColumnRemoved => "Column Removed",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::OutlierCapped => "Outlier Capped",
            Self::CategoryNormalized => "Category Normalized",
            Self::DataPersisted => "Data Persisted",
        }
    }
}

/// Summary of changes made to a single column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Name of the column.
    pub name: String,
    /// Original data type (as string).
    pub original_type: String,
    /// Final data type after preprocessing.
    pub final_type: String,
    /// Number of missing values before preprocessing.
    pub missing_before: usize,
    /// Number of missing values after preprocessing.
    pub missing_after: usize,
    /// Value used to fill missing entries, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imputed_with: Option<f64>,
    /// Number of values clipped onto an outlier bound.
    pub outliers_capped: usize,
    /// Number of text values changed by normalization.
    pub values_normalized: usize,
    /// Whether the column was removed.
    pub was_removed: bool,
    /// Reason for removal, if removed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removal_reason: Option<String>,
}

impl ColumnSummary {
    /// Create a new column summary with default values.
    pub fn new(name: impl Into<String>, original_type: impl Into<String>) -> Self {
        let original_type = original_type.into();
        Self {
            name: name.into(),
            final_type: original_type.clone(),
            original_type,
            missing_before: 0,
            missing_after: 0,
            imputed_with: None,
            outliers_capped: 0,
            values_normalized: 0,
            was_removed: false,
            removal_reason: None,
        }
    }

    /// Mark the column as removed with a reason.
    pub fn mark_removed(mut self, reason: impl Into<String>) -> Self {
        self.was_removed = true;
        self.removal_reason = Some(reason.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocessing_summary_default() {
        let summary = PreprocessingSummary::default();
        assert_eq!(summary.duration_ms, 0);
        assert_eq!(summary.rows_before, 0);
        assert!(summary.actions.is_empty());
    }

    #[test]
    fn test_preprocessing_summary_add_action() {
        let mut summary = PreprocessingSummary::new();
        summary.add_action(PreprocessingAction::new(
            ActionType::ColumnRemoved,
            "Cabin",
            "Dropped column 'Cabin'",
        ));
        assert_eq!(summary.actions.len(), 1);
        assert_eq!(summary.actions[0].target, "Cabin");
        assert_eq!(summary.count_actions(ActionType::ColumnRemoved), 1);
        assert_eq!(summary.count_actions(ActionType::ValueImputed), 0);
    }

    #[test]
    fn test_preprocessing_summary_percentages() {
        let mut summary = PreprocessingSummary::new();
        summary.rows_before = 100;
        summary.rows_after = 90;
        summary.rows_removed = 10;
        summary.columns_before = 10;
        summary.columns_after = 9;
        summary.columns_removed = 1;

        assert!((summary.rows_removed_percentage() - 10.0).abs() < 0.01);
        assert!((summary.columns_removed_percentage() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_action_type_serialization() {
        let json = serde_json::to_string(&ActionType::OutlierCapped).unwrap();
        assert_eq!(json, "\"outlier_capped\"");
        assert_eq!(ActionType::OutlierCapped.display_name(), "Outlier Capped");
    }

    #[test]
    fn test_column_summary_mark_removed() {
        let summary = ColumnSummary::new("Cabin", "str").mark_removed("dropped by configuration");
        assert!(summary.was_removed);
        assert_eq!(summary.original_type, "str");
        assert_eq!(
            summary.removal_reason.as_deref(),
            Some("dropped by configuration")
        );
    }

    #[test]
    fn test_outlier_bounds_contains() {
        let bounds = OutlierBounds {
            column: "Fare".to_string(),
            q1: 10.0,
            q3: 30.0,
            iqr: 20.0,
            lower: -20.0,
            upper: 60.0,
            capped_low: 0,
            capped_high: 2,
        };
        assert!(bounds.contains(60.0));
        assert!(bounds.contains(-20.0));
        assert!(!bounds.contains(60.01));
        assert_eq!(bounds.capped_total(), 2);
    }

    #[test]
    fn test_descriptive_stats_uses_percentile_keys() {
        let stats = DescriptiveStats {
            column: "Age".to_string(),
            count: 3,
            mean: Some(2.0),
            std: Some(1.0),
            min: Some(1.0),
            q25: Some(1.5),
            median: Some(2.0),
            q75: Some(2.5),
            max: Some(3.0),
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"25%\":1.5"));
        assert!(json.contains("\"75%\":2.5"));
    }

    #[test]
    fn test_correlation_lookup() {
        let matrix = CorrelationMatrix {
            columns: vec!["Age".to_string(), "Fare".to_string()],
            values: vec![vec![Some(1.0), Some(0.3)], vec![Some(0.3), Some(1.0)]],
        };
        assert_eq!(matrix.get("Age", "Fare"), Some(0.3));
        assert_eq!(matrix.get("Age", "Pclass"), None);
    }
}
