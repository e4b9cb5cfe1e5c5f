//! Column classification and query-to-column matching.

use super::normalizer::normalize;
use crate::table::{Column, Table};

/// A table's columns split by kind, original order preserved in both halves
#[derive(Debug, Clone)]
pub struct ColumnClasses<'a> {
    pub numeric: Vec<&'a Column>,
    pub categorical: Vec<&'a Column>,
}

/// Partition every column of `table` into numeric and categorical sets.
pub fn classify_columns(table: &Table) -> ColumnClasses<'_> {
    let (numeric, categorical): (Vec<&Column>, Vec<&Column>) =
        table.columns().iter().partition(|c| c.is_numeric());
    ColumnClasses {
        numeric,
        categorical,
    }
}

/// Pick the numeric column a normalized query is about.
///
/// The first column (table order) whose normalized name is a substring of the
/// query wins. With no name match the first numeric column is used; `None`
/// only when the table has no numeric columns at all.
pub fn match_column<'a>(normalized_query: &str, numeric: &[&'a Column]) -> Option<&'a Column> {
    numeric
        .iter()
        .copied()
        .find(|column| normalized_query.contains(&normalize(column.name())))
        .or_else(|| numeric.first().copied())
}
