//! CSV loading with fallback strategies for slightly malformed files.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Rows used to infer column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Cell texts read as missing in every column, besides the empty cell.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Load a CSV file with a header row.
///
/// Tries, in order: a standard quoted read, a read with quoting disabled,
/// and a read of the pre-cleaned file content. A missing file or a file no
/// strategy can parse fails with [`PreprocessingError::LoadFailed`]; a
/// zero-byte file fails with [`PreprocessingError::EmptyInput`].
pub fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(load_failed(path, "file not found"));
    }
    let metadata = std::fs::metadata(path).map_err(|e| load_failed(path, e))?;
    if metadata.len() == 0 {
        return Err(PreprocessingError::EmptyInput);
    }

    // Strategy 1: Standard loading with quote handling
    match read_with_quote_char(path, Some(b'"')) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    // Strategy 2: Without quote handling
    match read_with_quote_char(path, None) {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    // Strategy 3: Pre-clean content
    let content = std::fs::read_to_string(path).map_err(|e| load_failed(path, e))?;
    let cleaned = clean_csv_content(&content);

    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(parse_options(Some(b'"')))
        .into_reader_with_file_handle(Cursor::new(cleaned))
        .finish()
        .map_err(|e| load_failed(path, e))
}

fn read_with_quote_char(path: &Path, quote_char: Option<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(parse_options(quote_char))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn parse_options(quote_char: Option<u8>) -> CsvParseOptions {
    let tokens: Vec<PlSmallStr> = NA_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect();
    CsvParseOptions::default()
        .with_quote_char(quote_char)
        .with_null_values(Some(NullValues::AllColumns(tokens)))
}

fn load_failed(path: &Path, reason: impl ToString) -> PreprocessingError {
    PreprocessingError::LoadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Collapse doubled quotes and drop blank lines.
pub(crate) fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_quoted_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passengers.csv");
        fs::write(
            &path,
            "PassengerId,Name,Age\n1,\"Kelly, Mr. James\",34.5\n2,\"Wilkes, Mrs. James (Ellen Needs)\",47\n",
        )
        .unwrap();

        let df = load_csv_with_fallbacks(&path).unwrap();

        assert_eq!(df.shape(), (2, 3));
        let name = df.column("Name").unwrap().str().unwrap().get(0).unwrap();
        assert_eq!(name, "Kelly, Mr. James");
    }

    #[test]
    fn test_load_na_tokens_are_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passengers.csv");
        fs::write(
            &path,
            "Sex,Age,Embarked\nmale,22,S\nNA,NaN,S\nfemale,N/A,NULL\nfemale,35,nan\n",
        )
        .unwrap();

        let df = load_csv_with_fallbacks(&path).unwrap();

        assert_eq!(df.column("Sex").unwrap().null_count(), 1);
        assert_eq!(df.column("Embarked").unwrap().null_count(), 2);
        let age = df.column("Age").unwrap();
        assert!(crate::utils::is_numeric_dtype(age.dtype()));
        assert_eq!(age.null_count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_csv_with_fallbacks(&dir.path().join("nope.csv")).unwrap_err();

        assert!(matches!(err, PreprocessingError::LoadFailed { .. }));
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_load_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let err = load_csv_with_fallbacks(dir.path()).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_load_zero_byte_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let err = load_csv_with_fallbacks(&path).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_INPUT");
    }

    #[test]
    fn test_load_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("header.csv");
        fs::write(&path, "PassengerId,Age\n").unwrap();

        let df = load_csv_with_fallbacks(&path).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_empty_cells_are_null() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passengers.csv");
        fs::write(&path, "Age,Cabin\n22,\n,C85\n").unwrap();

        let df = load_csv_with_fallbacks(&path).unwrap();
        assert_eq!(df.column("Age").unwrap().null_count(), 1);
        assert_eq!(df.column("Cabin").unwrap().null_count(), 1);
    }

    #[test]
    fn test_clean_csv_content() {
        let content = "a,b\n\n\"\"x\"\",1\n   \n";
        assert_eq!(clean_csv_content(content), "a,b\n\"x\",1");
    }
}
