//! Custom error types for the cleaning pipeline.
//!
//! Every failure aborts the run. The variants fall into three families that
//! callers usually care about: IO (source unreadable, destination unwritable),
//! schema (an expected column is missing) and empty input (nothing to compute
//! a median or quantile from). [`PreprocessingError::error_code`] exposes the
//! family as a stable string.
//!
//! Errors are serializable so the CLI can emit them as JSON alongside reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// The source table could not be read or parsed.
    #[error("Failed to load '{path}': {reason}")]
    LoadFailed { path: String, reason: String },

    /// The cleaned table could not be written.
    #[error("Failed to write '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The input table has no data rows.
    #[error("Input table has no rows")]
    EmptyInput,

    /// No present values in a column, so its statistics are undefined.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LoadFailed { .. } | Self::WriteFailed { .. } | Self::Io(_) => "IO_ERROR",
            Self::ColumnNotFound(_) => "SCHEMA_ERROR",
            Self::EmptyInput => "EMPTY_INPUT",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is an IO failure on either end of the pipeline.
    pub fn is_io(&self) -> bool {
        self.error_code() == "IO_ERROR"
    }

    /// Check if this error is caused by the shape of the input table.
    pub fn is_input_shape(&self) -> bool {
        matches!(
            self.error_code(),
            "SCHEMA_ERROR" | "EMPTY_INPUT" | "NO_VALID_VALUES"
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(PreprocessingError::EmptyInput.error_code(), "EMPTY_INPUT");
        assert_eq!(
            PreprocessingError::ColumnNotFound("Cabin".to_string()).error_code(),
            "SCHEMA_ERROR"
        );
        assert_eq!(
            PreprocessingError::LoadFailed {
                path: "missing.csv".to_string(),
                reason: "not found".to_string(),
            }
            .error_code(),
            "IO_ERROR"
        );
    }

    #[test]
    fn test_io_family() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(PreprocessingError::from(io).is_io());
        assert!(
            PreprocessingError::WriteFailed {
                path: "out.csv".to_string(),
                reason: "denied".to_string(),
            }
            .is_io()
        );
        assert!(!PreprocessingError::EmptyInput.is_io());
    }

    #[test]
    fn test_input_shape_family() {
        assert!(PreprocessingError::EmptyInput.is_input_shape());
        assert!(PreprocessingError::NoValidValues("Age".to_string()).is_input_shape());
        assert!(PreprocessingError::ColumnNotFound("Sex".to_string()).is_input_shape());
        assert!(!PreprocessingError::InvalidConfig("x".to_string()).is_input_shape());
    }

    #[test]
    fn test_error_serialization() {
        let error = PreprocessingError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("SCHEMA_ERROR"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error =
            PreprocessingError::ColumnNotFound("Fare".to_string()).with_context("During imputation");
        assert!(error.to_string().contains("During imputation"));
        assert_eq!(error.error_code(), "SCHEMA_ERROR"); // Preserves original code
    }
}
