//! # Item Search Repository
//!
//! This crate provides the trait and implementations for interacting with the
//! search engine. It includes definitions for errors, the engine client
//! interface, a Meilisearch implementation and a retrying wrapper.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod meilisearch;
pub mod retry;

pub use config::EngineConfig;
pub use errors::SearchError;
pub use interfaces::IndexEngineClient;
pub use meilisearch::MeilisearchClient;
pub use retry::{RetryPolicy, RetryingClient};
