//! Meilisearch index configuration.
//!
//! This module defines the settings for the item catalog index.

use std::collections::{BTreeMap, BTreeSet};

use item_search_shared::{
    Faceting, IndexSettings, MinWordSizeForTypos, Pagination, ProximityPrecision, TypoTolerance,
    ID_FIELD,
};

/// The default name of the search index.
pub const INDEX_NAME: &str = "items";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Get the settings for the item catalog index.
///
/// The configuration includes:
/// - **Searchable attributes**: item name first, then brand and category
/// - **Filterable attributes**: brand and category, used by the search filters
/// - **Typo tolerance**: one typo from 2 characters, two typos from 3
/// - **Synonyms**: common pharmacy abbreviations (ml, tab, cap, q)
/// - **Pagination**: up to 30000 reachable hits
pub fn catalog_settings() -> IndexSettings {
    let synonyms: BTreeMap<String, Vec<String>> = [
        ("ml", strings(&["milliliter", "milliliters"])),
        ("tab", strings(&["tablet", "tablets"])),
        ("cap", strings(&["capsule", "capsules"])),
        ("asp", strings(&["aspidosperma", "aspido"])),
        ("q", strings(&["mother tincture", "tincture", "tinct"])),
        ("bioforce", strings(&["bio force"])),
    ]
    .into_iter()
    .map(|(term, equivalents)| (term.to_string(), equivalents))
    .collect();

    IndexSettings {
        primary_key: ID_FIELD.to_string(),
        searchable_attributes: Some(strings(&["item_name", "brand", "category"])),
        filterable_attributes: Some(BTreeSet::from(["brand".to_string(), "category".to_string()])),
        sortable_attributes: Some(BTreeSet::from(["item_name".to_string()])),
        typo_tolerance: Some(TypoTolerance {
            enabled: Some(true),
            min_word_size_for_typos: Some(MinWordSizeForTypos {
                one_typo: 2,
                two_typos: 3,
            }),
            disable_on_words: Some(Vec::new()),
            disable_on_attributes: Some(Vec::new()),
        }),
        ranking_rules: Some(strings(&["words", "typo", "proximity", "attribute", "exactness"])),
        synonyms: Some(synonyms),
        faceting: Some(Faceting {
            max_values_per_facet: 100,
        }),
        pagination: Some(Pagination {
            max_total_hits: 30000,
        }),
        proximity_precision: Some(ProximityPrecision::ByWord),
    }
}
