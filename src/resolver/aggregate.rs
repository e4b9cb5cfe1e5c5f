//! Aggregator - executes the classified intent against the matched column.
//!
//! Every expected shortfall (no numeric column, no usable values, unknown
//! intent) becomes a normal `QueryResult` with an explanatory answer. Only a
//! table that violates its own shape invariant produces an `Err`.

use super::intent::Intent;
use super::result::QueryResult;
use crate::error::Result;
use crate::table::{Cell, Column, Table};
use itertools::Itertools;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Highest,
    Lowest,
}

impl Extremum {
    fn noun(self) -> &'static str {
        match self {
            Extremum::Highest => "maximum",
            Extremum::Lowest => "minimum",
        }
    }

    fn adjective(self) -> &'static str {
        match self {
            Extremum::Highest => "highest",
            Extremum::Lowest => "lowest",
        }
    }

    fn intent(self) -> Intent {
        match self {
            Extremum::Highest => Intent::Max,
            Extremum::Lowest => Intent::Min,
        }
    }

    fn pick(self, a: f64, b: f64) -> f64 {
        match self {
            Extremum::Highest => a.max(b),
            Extremum::Lowest => a.min(b),
        }
    }
}

/// Run `intent` over `table`.
///
/// `matched` is the numeric column picked by the column matcher (if any) and
/// `categorical` the table's categorical columns in table order; the first of
/// those labels extremal rows.
pub fn aggregate(
    query: &str,
    intent: Intent,
    table: &Table,
    matched: Option<&Column>,
    categorical: &[&Column],
) -> Result<QueryResult> {
    let result = match intent {
        Intent::Count => {
            QueryResult::answered(query, intent, format!("{} rows", table.row_count()))
        }
        Intent::Sum => match matched {
            Some(column) => {
                // fold from +0.0 so an empty column prints "0", not "-0"
                let total = column.numbers().flatten().fold(0.0_f64, |acc, v| acc + v);
                QueryResult::answered(
                    query,
                    intent,
                    format!("Total {}: {}", column.name(), format_number(total)),
                )
            }
            None => no_numeric_column(query, intent, "total"),
        },
        Intent::Average => match matched {
            Some(column) => average(query, column),
            None => no_numeric_column(query, intent, "average"),
        },
        Intent::Max => extremal(query, Extremum::Highest, table, matched, categorical)?,
        Intent::Min => extremal(query, Extremum::Lowest, table, matched, categorical)?,
        Intent::Unknown => QueryResult::unrecognized(query),
    };
    Ok(result)
}

fn average(query: &str, column: &Column) -> QueryResult {
    let (sum, count) = column
        .numbers()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return no_numeric_data(query, Intent::Average, column, "average");
    }
    let mean = round2(sum / count as f64);
    QueryResult::answered(
        query,
        Intent::Average,
        format!("Average {}: {}", column.name(), format_number(mean)),
    )
}

fn extremal(
    query: &str,
    which: Extremum,
    table: &Table,
    matched: Option<&Column>,
    categorical: &[&Column],
) -> Result<QueryResult> {
    let intent = which.intent();
    let column = match matched {
        Some(column) => column,
        None => return Ok(no_numeric_column(query, intent, which.noun())),
    };

    let target = match column.numbers().flatten().reduce(|a, b| which.pick(a, b)) {
        Some(v) => v,
        None => return Ok(no_numeric_data(query, intent, column, which.noun())),
    };

    // ties are kept: every row holding exactly the extremal value is reported
    let indices: Vec<usize> = column
        .numbers()
        .enumerate()
        .filter(|(_, v)| *v == Some(target))
        .map(|(i, _)| i)
        .collect();
    debug!(
        column = column.name(),
        value = target,
        rows = indices.len(),
        "extremal rows selected"
    );

    let rows = indices
        .iter()
        .map(|&i| table.row(i))
        .collect::<Result<Vec<_>>>()?;

    let answer = match categorical.first() {
        Some(label) => {
            let labels = indices
                .iter()
                .map(|&i| label.values().get(i).map(label_text).unwrap_or_default())
                .join(", ");
            format!(
                "{}(s) [{}] have {} {} = {}",
                label.name(),
                labels,
                which.adjective(),
                column.name(),
                format_number(target)
            )
        }
        None => format!(
            "{} {} = {}",
            capitalize(which.adjective()),
            column.name(),
            format_number(target)
        ),
    };

    Ok(QueryResult::answered(query, intent, answer).with_details(rows))
}

fn no_numeric_column(query: &str, intent: Intent, purpose: &str) -> QueryResult {
    QueryResult::answered(query, intent, format!("No numeric column found for {}.", purpose))
}

fn no_numeric_data(query: &str, intent: Intent, column: &Column, purpose: &str) -> QueryResult {
    QueryResult::answered(
        query,
        intent,
        format!("No numeric data in column {} for {}.", column.name(), purpose),
    )
}

fn label_text(cell: &Cell) -> String {
    match cell {
        Cell::Missing => "null".to_string(),
        other => other.to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Round to two decimals on the exact binary value, halves to even
/// (0.125 -> 0.12). Safe up to `f64::MAX`.
fn round2(v: f64) -> f64 {
    format!("{:.2}", v).parse().unwrap_or(v)
}

/// Integral values print without a fractional part ("55", not "55.0").
pub fn format_number(v: f64) -> String {
    format!("{}", v)
}
