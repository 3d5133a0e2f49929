//! Search request and response types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `attribute = "value"` equality predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPredicate {
    pub attribute: String,
    pub value: String,
}

impl FilterPredicate {
    /// Render the predicate in the engine's filter grammar.
    ///
    /// The value is always quoted with `"` escaped. Other backslashes are
    /// kept verbatim, as the engine only unescapes `\"` inside a literal.
    pub fn to_expression(&self) -> String {
        format!("{} = \"{}\"", self.attribute, escape_filter_value(&self.value))
    }

    /// Whether `value` survives quoting unchanged.
    ///
    /// A backslash right before a quote or at the very end would pair with
    /// the quote that follows it in the literal.
    pub fn is_quotable(value: &str) -> bool {
        !value.ends_with('\\') && !value.contains("\\\"")
    }
}

/// Escape a literal for use inside a double-quoted filter string.
pub(crate) fn escape_filter_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Conjunction of equality predicates, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    predicates: Vec<FilterPredicate>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an equality predicate.
    pub fn push(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        self.predicates.push(FilterPredicate {
            attribute: attribute.into(),
            value: value.into(),
        });
    }

    pub fn predicates(&self) -> &[FilterPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render all predicates joined with `AND`.
    pub fn to_expression(&self) -> String {
        self.predicates
            .iter()
            .map(FilterPredicate::to_expression)
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query, never empty.
    pub query: String,
    pub filter: Option<SearchFilter>,
    /// Maximum number of hits to return. Engine default when `None`.
    pub limit: Option<usize>,
    /// Number of hits to skip. Engine default when `None`.
    pub offset: Option<usize>,
}

impl SearchRequest {
    /// The rendered filter expression, if any predicates were given.
    pub fn filter_expression(&self) -> Option<String> {
        self.filter
            .as_ref()
            .filter(|filter| !filter.is_empty())
            .map(SearchFilter::to_expression)
    }
}

/// Ranked hits returned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Matching documents in relevance order.
    pub hits: Vec<Value>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub estimated_total_hits: Option<u64>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
}

impl SearchResponse {
    /// A response with no hits.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            query: String::new(),
            estimated_total_hits: Some(0),
            processing_time_ms: None,
        }
    }
}
