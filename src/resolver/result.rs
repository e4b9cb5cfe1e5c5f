use super::intent::Intent;
use crate::table::Row;
use serde::Serialize;

pub const UNRECOGNIZED_QUERY_ANSWER: &str =
    "Could not interpret query. Try total, average, highest, lowest, or row count.";

/// Outcome of resolving one query, in the shape returned to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub answer: String,
    /// Intent tag; `None` for unrecognized queries
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    pub fn answered(query: impl Into<String>, intent: Intent, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
            intent: intent.is_known().then_some(intent),
            details: None,
            error: None,
        }
    }

    pub fn unrecognized(query: impl Into<String>) -> Self {
        Self::answered(query, Intent::Unknown, UNRECOGNIZED_QUERY_ANSWER)
    }

    /// Result for a computation that could not complete
    pub fn failed(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: String::new(),
            intent: None,
            details: None,
            error: Some(error.into()),
        }
    }

    pub fn with_details(mut self, rows: Vec<Row>) -> Self {
        self.details = Some(rows);
        self
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
