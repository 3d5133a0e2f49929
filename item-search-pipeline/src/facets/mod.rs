//! Distinct attribute values for filter pickers.

use std::collections::BTreeSet;

use serde::Serialize;

use item_search_shared::Record;

/// Distinct non-empty values of `attribute` across `records`, sorted.
pub fn distinct_values(records: &[Record], attribute: &str) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|record| record.get(attribute))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Brand and category choices offered to search clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetChoices {
    pub brands: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FacetChoices {
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            brands: distinct_values(records, "brand"),
            categories: distinct_values(records, "category"),
        }
    }
}
