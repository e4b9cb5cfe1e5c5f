//! Conversion from polars `DataFrame`s to the resolver's `Table`.

use crate::error::Result;
use crate::table::{Cell, Column, ColumnKind, Table};
use polars::prelude::*;

/// Build a `Table` from a dataframe.
///
/// Numeric dtypes become numeric columns (cast to Float64, nulls missing);
/// every other dtype, booleans included, becomes categorical text.
pub fn table_from_dataframe(df: &DataFrame) -> Result<Table> {
    let mut columns = Vec::with_capacity(df.width());
    for series in df.get_columns() {
        let name = series.name().to_string();
        let column = if series.dtype().is_numeric() {
            let floats = series.cast(&DataType::Float64)?;
            let values = floats.f64()?.into_iter().map(Cell::from).collect();
            Column::new(name, ColumnKind::Numeric, values)
        } else {
            Column::new(name, ColumnKind::Categorical, text_cells(series)?)
        };
        columns.push(column);
    }
    Table::new(columns)
}

fn text_cells(series: &Series) -> Result<Vec<Cell>> {
    if let Ok(strings) = series.cast(&DataType::String) {
        return Ok(strings.str()?.into_iter().map(Cell::from).collect());
    }
    // nested dtypes have no string cast; fall back to the value's display form
    (0..series.len())
        .map(|i| -> Result<Cell> {
            let value = series.get(i)?;
            Ok(match value {
                AnyValue::Null => Cell::Missing,
                other => Cell::Text(other.to_string()),
            })
        })
        .collect()
}
