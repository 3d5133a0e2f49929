//! Index-level search configuration.
//!
//! The shape follows the engine's settings object (camelCase keys). Every
//! option is optional: absent options are left out of the serialized body so
//! a settings patch only touches what it names.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::record::ID_FIELD;

fn default_primary_key() -> String {
    ID_FIELD.to_string()
}

/// Search configuration applied to the index on every sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    /// Primary key used when the index is created. Not part of the settings patch.
    #[serde(skip, default = "default_primary_key")]
    pub primary_key: String,
    /// Attributes searched by free-text queries, in ranking order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_attributes: Option<Vec<String>>,
    /// Attributes accepted in filter expressions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable_attributes: Option<BTreeSet<String>>,
    /// Attributes accepted in sort clauses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sortable_attributes: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typo_tolerance: Option<TypoTolerance>,
    /// Ordered ranking rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking_rules: Option<Vec<String>>,
    /// Term to equivalent terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faceting: Option<Faceting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity_precision: Option<ProximityPrecision>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            primary_key: default_primary_key(),
            searchable_attributes: None,
            filterable_attributes: None,
            sortable_attributes: None,
            typo_tolerance: None,
            ranking_rules: None,
            synonyms: None,
            faceting: None,
            pagination: None,
            proximity_precision: None,
        }
    }
}

impl IndexSettings {
    /// Settings containing only the searchable attributes.
    ///
    /// Applied right after index creation so the index is searchable before
    /// the full settings land.
    pub fn base(&self) -> Self {
        Self {
            primary_key: self.primary_key.clone(),
            searchable_attributes: self.searchable_attributes.clone(),
            ..Self::default()
        }
    }

    /// Whether `attribute` may appear in a filter expression.
    pub fn is_filterable(&self, attribute: &str) -> bool {
        self.filterable_attributes
            .as_ref()
            .is_some_and(|attrs| attrs.contains(attribute))
    }

    /// Set the primary key.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }
}

/// Typo tolerance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypoTolerance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_word_size_for_typos: Option<MinWordSizeForTypos>,
    /// Words matched exactly, never with typos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_on_words: Option<Vec<String>>,
    /// Attributes matched exactly, never with typos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_on_attributes: Option<Vec<String>>,
}

/// Minimum word lengths before one or two typos are tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinWordSizeForTypos {
    pub one_typo: u8,
    pub two_typos: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faceting {
    pub max_values_per_facet: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub max_total_hits: u32,
}

/// How word proximity is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProximityPrecision {
    ByWord,
    ByAttribute,
}
