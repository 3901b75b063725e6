//! CSV persistence for the cleaned table.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Write `df` as CSV with a header row and no index column.
///
/// Missing parent directories are created. The file is written in place;
/// a failure part-way can leave a partial file behind.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let write_failed = |reason: String| PreprocessingError::WriteFailed {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
    }

    let mut file = File::create(path).map_err(|e| write_failed(e.to_string()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .map_err(|e| write_failed(e.to_string()))?;

    info!("Saved {} rows to {}", df.height(), path.display());
    Ok(())
}
