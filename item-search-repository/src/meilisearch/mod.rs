//! Meilisearch implementation of the engine client.
//!
//! This module provides a concrete implementation of `IndexEngineClient`
//! using Meilisearch as the backend.

mod client;
mod index_config;
mod queries;

pub use client::MeilisearchClient;
pub use index_config::{catalog_settings, INDEX_NAME};
pub use queries::build_search_body;
