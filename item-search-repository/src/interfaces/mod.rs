//! Interface definitions for the search engine client.
//!
//! This module defines the abstract `IndexEngineClient` trait that allows
//! for dependency injection and swappable engine implementations.

mod index_engine_client;

pub use index_engine_client::IndexEngineClient;
