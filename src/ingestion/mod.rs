//! Ingestion - turns an uploaded file into a fully materialized `Table`.

pub mod dataframe;
pub mod format;
pub mod xlsx;

pub use dataframe::table_from_dataframe;
pub use format::SourceFormat;

use crate::error::{QaError, Result};
use crate::table::Table;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

/// Parse an in-memory upload. `file_name` only selects the format.
pub fn load_bytes(file_name: &str, bytes: &[u8]) -> Result<Table> {
    let format = SourceFormat::from_file_name(file_name)?;
    if bytes.is_empty() {
        return Err(QaError::Ingestion(format!("'{}' is empty", file_name)));
    }

    let parse_error =
        |e: PolarsError| QaError::Ingestion(format!("failed to parse '{}': {}", file_name, e));
    let cursor = Cursor::new(bytes.to_vec());
    let df = match format {
        SourceFormat::Csv => CsvReader::new(cursor).finish().map_err(parse_error)?,
        SourceFormat::Parquet => ParquetReader::new(cursor).finish().map_err(parse_error)?,
        SourceFormat::Json => JsonReader::new(cursor).finish().map_err(parse_error)?,
        SourceFormat::Xlsx => xlsx::read_xlsx(bytes)?,
    };

    let table = table_from_dataframe(&df)?;
    info!(
        file = file_name,
        format = format.extension(),
        rows = table.row_count(),
        columns = table.columns().len(),
        "ingested dataset"
    );
    Ok(table)
}

/// Parse a file on disk.
pub fn load_path(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    load_bytes(name, &bytes)
}
