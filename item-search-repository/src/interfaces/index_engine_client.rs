//! Index engine client trait definition.
//!
//! This module defines the narrow capability the rest of the service uses to
//! drive the remote search engine. No business logic lives behind it: each
//! method is one request/response pair.

use async_trait::async_trait;

use crate::errors::SearchError;
use item_search_shared::{
    IndexSettings, IndexStats, Record, SearchRequest, SearchResponse, SyncTask,
};

/// Abstract interface for search engine operations.
///
/// Implementations can be swapped for different backends (Meilisearch, an
/// in-memory fake, a retrying wrapper) without touching the callers.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Transport failures surface as `SearchError::EngineUnreachable` and
/// non-success responses as `SearchError::EngineRejected`, carrying the status
/// code and body. No method retries on its own.
#[async_trait]
pub trait IndexEngineClient: Send + Sync {
    /// Delete an index.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(task))` - The deletion was accepted
    /// * `Ok(None)` - The index did not exist
    /// * `Err(SearchError)` - Any other failure
    async fn delete_index(&self, index: &str) -> Result<Option<SyncTask>, SearchError>;

    /// Create an index with the given primary key.
    ///
    /// Creation is asynchronous on the engine side; the returned task tracks it.
    async fn create_index(&self, index: &str, primary_key: &str)
        -> Result<SyncTask, SearchError>;

    /// Apply the settings that are present, leaving the others untouched.
    async fn patch_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<SyncTask, SearchError>;

    /// Add or replace documents, matched by primary key.
    async fn upsert_documents(&self, index: &str, records: &[Record])
        -> Result<SyncTask, SearchError>;

    /// Fetch the current state of a task.
    async fn get_task(&self, task_id: u64) -> Result<SyncTask, SearchError>;

    /// Fetch document statistics for an index.
    async fn get_index_stats(&self, index: &str) -> Result<IndexStats, SearchError>;

    /// List the most recent tasks, most recent first.
    async fn list_recent_tasks(&self, limit: usize) -> Result<Vec<SyncTask>, SearchError>;

    /// Execute a search query against the index.
    ///
    /// Ranking is entirely the engine's responsibility; hits are returned in
    /// the order the engine produced them.
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the engine reports itself available
    /// * `Ok(false)` - If the engine answered but is not available
    /// * `Err(SearchError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchError>;
}
