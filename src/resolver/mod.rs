//! Query resolver - answers a free-text question about one table.
//!
//! Pipeline: normalize -> classify columns -> match column -> classify intent
//! -> aggregate. Each call is a pure function of its inputs; nothing is cached
//! between calls.

pub mod aggregate;
pub mod columns;
pub mod intent;
pub mod normalizer;
pub mod result;

pub use aggregate::{aggregate, format_number};
pub use columns::{classify_columns, match_column, ColumnClasses};
pub use intent::{classify_intent, Intent, INTENT_KEYWORDS};
pub use normalizer::normalize;
pub use result::{QueryResult, UNRECOGNIZED_QUERY_ANSWER};

use crate::error::Result;
use crate::table::Table;
use tracing::debug;

/// A question as typed plus its matching key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub raw: String,
    pub normalized: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// Form echoed back in results
    pub fn echo(&self) -> String {
        self.raw.to_lowercase()
    }
}

/// Resolve `raw_query` against `table`.
///
/// Unrecognized questions, missing numeric columns and empty data all come
/// back as `Ok` results with an explanatory answer.
pub fn resolve(raw_query: &str, table: &Table) -> Result<QueryResult> {
    let query = Query::new(raw_query);
    let classes = classify_columns(table);
    let matched = match_column(&query.normalized, &classes.numeric);
    let intent = classify_intent(&query.normalized);

    debug!(
        query = %query.normalized,
        intent = %intent,
        column = matched.map(|c| c.name()).unwrap_or("<none>"),
        "resolving query"
    );

    aggregate(&query.echo(), intent, table, matched, &classes.categorical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_query_normalized_once() {
        let q = Query::new("What is the TOTAL Sales?");
        assert_eq!(q.normalized, "whatisthetotalsales");
        assert_eq!(q.echo(), "what is the total sales?");
    }

    #[test]
    fn test_resolve_picks_named_column() {
        let table = Table::new(vec![
            Column::numeric("Price", [1.0, 2.0]),
            Column::numeric("Qty", [5.0, 7.0]),
        ])
        .unwrap();
        let result = resolve("sum of qty", &table).unwrap();
        assert_eq!(result.answer, "Total Qty: 12");
        assert_eq!(result.intent, Some(Intent::Sum));
    }
}
