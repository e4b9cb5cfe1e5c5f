//! Excel workbooks. The first worksheet is read; its first row is the header.

use crate::error::{QaError, Result};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;

/// Read the first worksheet of an `.xlsx` workbook into a dataframe.
///
/// A column whose non-empty cells are all numbers becomes Float64; any other
/// column is kept as text.
pub fn read_xlsx(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| QaError::Ingestion(format!("failed to open workbook: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| QaError::Ingestion("workbook has no worksheets".to_string()))?
        .map_err(|e| QaError::Ingestion(format!("failed to read worksheet: {}", e)))?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(header) => header_names(header),
        None => return Ok(DataFrame::default()),
    };
    let body: Vec<&[Data]> = rows.collect();

    let series: Vec<Series> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cells: Vec<&Data> = body.iter().map(|row| row.get(i).unwrap_or(&Data::Empty)).collect();
            column_series(name, &cells)
        })
        .collect();
    Ok(DataFrame::new(series)?)
}

/// Header cells as column names; blanks become `Unnamed: <i>` and repeats get
/// a `.<n>` suffix.
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell {
                Data::Empty => format!("Unnamed: {}", i),
                other => other.to_string(),
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn column_series(name: &str, cells: &[&Data]) -> Series {
    let numeric = cells
        .iter()
        .all(|cell| matches!(cell, Data::Empty) || number(cell).is_some());
    if numeric {
        let values: Vec<Option<f64>> = cells.iter().map(|cell| number(cell)).collect();
        Series::new(name, values)
    } else {
        let values: Vec<Option<String>> = cells
            .iter()
            .map(|cell| match cell {
                Data::Empty => None,
                other => Some(other.to_string()),
            })
            .collect();
        Series::new(name, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names() {
        let header = vec![
            Data::String("Region".into()),
            Data::Empty,
            Data::String("Sales".into()),
            Data::String("Sales".into()),
        ];
        assert_eq!(header_names(&header), vec!["Region", "Unnamed: 1", "Sales", "Sales.1"]);
    }

    #[test]
    fn test_mixed_column_is_text() {
        let cells = [Data::Int(1), Data::String("n/a".into()), Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        let series = column_series("Qty", &refs);
        assert_eq!(series.dtype(), &DataType::String);
        assert_eq!(series.null_count(), 1);
    }

    #[test]
    fn test_numeric_column_allows_blanks() {
        let cells = [Data::Int(3), Data::Empty, Data::Float(2.5)];
        let refs: Vec<&Data> = cells.iter().collect();
        let series = column_series("Sales", &refs);
        assert_eq!(series.dtype(), &DataType::Float64);
        assert_eq!(series.f64().unwrap().get(2), Some(2.5));
    }

    #[test]
    fn test_garbage_bytes_are_an_ingestion_error() {
        let err = read_xlsx(b"not a zip archive").unwrap_err();
        assert!(matches!(err, QaError::Ingestion(_)));
    }
}
