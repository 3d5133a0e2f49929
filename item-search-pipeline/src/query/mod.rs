//! Builds validated search requests from caller input.

use std::collections::BTreeSet;

use tracing::debug;

use crate::errors::PipelineError;
use item_search_shared::{FilterPredicate, IndexSettings, SearchFilter, SearchRequest};

/// Turns a free-text query and optional equality filters into a
/// `SearchRequest`.
///
/// Filters are only accepted on attributes the index declares filterable.
/// Missing or empty filter values are ignored.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    filterable: BTreeSet<String>,
}

impl QueryBuilder {
    pub fn new<I, S>(filterable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            filterable: filterable.into_iter().map(Into::into).collect(),
        }
    }

    /// Builder accepting the filterable attributes of `settings`.
    pub fn from_settings(settings: &IndexSettings) -> Self {
        Self {
            filterable: settings.filterable_attributes.clone().unwrap_or_default(),
        }
    }

    /// Validate the input and build the request.
    ///
    /// Predicates are combined with AND in the order given.
    pub fn build<'a, I>(
        &self,
        free_text: Option<&str>,
        filters: I,
    ) -> Result<SearchRequest, PipelineError>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let query = free_text
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or(PipelineError::EmptyQuery)?;

        let mut filter = SearchFilter::new();
        for (attribute, value) in filters {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            if !self.filterable.contains(attribute) {
                return Err(PipelineError::invalid_filter(format!(
                    "attribute `{attribute}` is not filterable"
                )));
            }
            if !FilterPredicate::is_quotable(value) {
                return Err(PipelineError::invalid_filter(format!(
                    "value for `{attribute}` cannot end with a backslash or escape a quote"
                )));
            }
            filter.push(attribute, value);
        }

        debug!(query, filter = %filter, "Built search request");

        Ok(SearchRequest {
            query: query.to_string(),
            filter: (!filter.is_empty()).then_some(filter),
            limit: None,
            offset: None,
        })
    }
}
