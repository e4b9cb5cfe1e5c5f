//! Intent classifier - maps a normalized query to one aggregate operation.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Count,
    Sum,
    Average,
    Max,
    Min,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Count => "count",
            Intent::Sum => "sum",
            Intent::Average => "average",
            Intent::Max => "max",
            Intent::Min => "min",
            Intent::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Intent::Unknown
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword tiers in priority order. The first tier with any keyword contained
/// in the query decides the intent; later tiers are never consulted.
pub const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Count, &["howmanyrows", "numberofrows"]),
    (Intent::Sum, &["total", "sum"]),
    (Intent::Average, &["average", "avg", "mean"]),
    (Intent::Max, &["highest", "maximum", "max"]),
    (Intent::Min, &["lowest", "minimum", "min"]),
];

/// Classify an already-normalized query. Total: anything unmatched is `Unknown`.
pub fn classify_intent(normalized_query: &str) -> Intent {
    INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| normalized_query.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::normalizer::normalize;

    #[test]
    fn test_each_tier() {
        assert_eq!(classify_intent("howmanyrowsarethere"), Intent::Count);
        assert_eq!(classify_intent("numberofrows"), Intent::Count);
        assert_eq!(classify_intent("sumofsales"), Intent::Sum);
        assert_eq!(classify_intent("meanprice"), Intent::Average);
        assert_eq!(classify_intent("avgqty"), Intent::Average);
        assert_eq!(classify_intent("maximumrevenue"), Intent::Max);
        assert_eq!(classify_intent("lowestcost"), Intent::Min);
        assert_eq!(classify_intent("hellothere"), Intent::Unknown);
    }

    #[test]
    fn test_priority_beats_token_order() {
        assert_eq!(classify_intent(&normalize("total and average")), Intent::Sum);
        assert_eq!(classify_intent(&normalize("average and total")), Intent::Sum);
        // tier 2 is checked before tier 5 even inside a column name
        assert_eq!(classify_intent(&normalize("lowest minimum_total")), Intent::Sum);
    }

    #[test]
    fn test_count_needs_row_phrase() {
        // "how many" alone is not a row count request
        assert_eq!(classify_intent(&normalize("how many customers")), Intent::Unknown);
        assert_eq!(classify_intent(&normalize("How many rows?")), Intent::Count);
    }

    #[test]
    fn test_keyword_table_order_is_fixed() {
        let order: Vec<Intent> = INTENT_KEYWORDS.iter().map(|(i, _)| *i).collect();
        assert_eq!(
            order,
            vec![Intent::Count, Intent::Sum, Intent::Average, Intent::Max, Intent::Min]
        );
    }

    #[test]
    fn test_serde_tag() {
        assert_eq!(serde_json::to_string(&Intent::Average).unwrap(), "\"average\"");
    }
}
