//! # Item Search
//!
//! Service that keeps a Meilisearch index in sync with the item catalog file
//! and exposes search, status and facet lookups over HTTP.
//!
//! This crate provides the configuration, dependency wiring and HTTP surface
//! around the pipeline components.

pub mod api;
pub mod config;
pub mod service;

pub use api::build_router;
pub use config::{AppConfig, Dependencies};
pub use service::{SearchParams, SearchService, SyncSummary};

use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] item_search_repository::SearchError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
