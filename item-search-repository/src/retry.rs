//! Retrying engine client wrapper.
//!
//! Engine clients never retry on their own. `RetryingClient` layers a bounded
//! exponential backoff over any other client for deployments that want it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::errors::SearchError;
use crate::interfaces::IndexEngineClient;
use item_search_shared::{
    IndexSettings, IndexStats, Record, SearchRequest, SearchResponse, SyncTask,
};

/// Backoff configuration for `RetryingClient`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for the doubling delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryPolicy {
    /// Default delays with a custom retry budget.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }
}

/// Engine client that retries transient failures of another client.
///
/// Only errors for which `SearchError::is_retryable` holds are retried
/// (unreachable engine, 429, 5xx). Client errors surface immediately.
pub struct RetryingClient {
    inner: Box<dyn IndexEngineClient>,
    policy: RetryPolicy,
}

impl RetryingClient {
    /// Wrap `inner` with the given policy.
    pub fn new(inner: Box<dyn IndexEngineClient>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, SearchError>> + Send,
        T: Send,
    {
        let mut delay = self.policy.initial_delay;
        let mut attempt = 0;

        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(operation, attempt, "Engine call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    warn!(
                        operation,
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Engine call failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.policy.max_delay);
                }
                Err(e) => {
                    debug!(operation, attempt, error = %e, "Giving up on engine call");
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl IndexEngineClient for RetryingClient {
    async fn delete_index(&self, index: &str) -> Result<Option<SyncTask>, SearchError> {
        let inner = &*self.inner;
        self.with_retry("delete_index", move || inner.delete_index(index)).await
    }

    async fn create_index(&self, index: &str, primary_key: &str) -> Result<SyncTask, SearchError> {
        let inner = &*self.inner;
        self.with_retry("create_index", move || inner.create_index(index, primary_key)).await
    }

    async fn patch_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<SyncTask, SearchError> {
        let inner = &*self.inner;
        self.with_retry("patch_settings", move || inner.patch_settings(index, settings)).await
    }

    async fn upsert_documents(
        &self,
        index: &str,
        records: &[Record],
    ) -> Result<SyncTask, SearchError> {
        let inner = &*self.inner;
        self.with_retry("upsert_documents", move || inner.upsert_documents(index, records)).await
    }

    async fn get_task(&self, task_id: u64) -> Result<SyncTask, SearchError> {
        let inner = &*self.inner;
        self.with_retry("get_task", move || inner.get_task(task_id)).await
    }

    async fn get_index_stats(&self, index: &str) -> Result<IndexStats, SearchError> {
        let inner = &*self.inner;
        self.with_retry("get_index_stats", move || inner.get_index_stats(index)).await
    }

    async fn list_recent_tasks(&self, limit: usize) -> Result<Vec<SyncTask>, SearchError> {
        let inner = &*self.inner;
        self.with_retry("list_recent_tasks", move || inner.list_recent_tasks(limit)).await
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        let inner = &*self.inner;
        self.with_retry("search", move || inner.search(index, request)).await
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        // Reported as-is, never retried.
        self.inner.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_search_shared::TaskStatus;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Mock client that fails a fixed number of times before succeeding.
    struct FlakyClient {
        calls: Arc<AtomicU32>,
        failures: u32,
        error: SearchError,
    }

    impl FlakyClient {
        fn new(failures: u32, error: SearchError) -> (Self, Arc<AtomicU32>) {
            let calls = Arc::new(AtomicU32::new(0));
            let client = Self {
                calls: calls.clone(),
                failures,
                error,
            };
            (client, calls)
        }

        fn attempt(&self) -> Result<(), SearchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl IndexEngineClient for FlakyClient {
        async fn delete_index(&self, _index: &str) -> Result<Option<SyncTask>, SearchError> {
            self.attempt().map(|_| None)
        }

        async fn create_index(&self, _index: &str, _pk: &str) -> Result<SyncTask, SearchError> {
            self.attempt().map(|_| SyncTask::new(1, TaskStatus::Enqueued))
        }

        async fn patch_settings(
            &self,
            _index: &str,
            _settings: &IndexSettings,
        ) -> Result<SyncTask, SearchError> {
            self.attempt().map(|_| SyncTask::new(2, TaskStatus::Enqueued))
        }

        async fn upsert_documents(
            &self,
            _index: &str,
            _records: &[Record],
        ) -> Result<SyncTask, SearchError> {
            self.attempt().map(|_| SyncTask::new(3, TaskStatus::Enqueued))
        }

        async fn get_task(&self, task_id: u64) -> Result<SyncTask, SearchError> {
            self.attempt().map(|_| SyncTask::new(task_id, TaskStatus::Succeeded))
        }

        async fn get_index_stats(&self, _index: &str) -> Result<IndexStats, SearchError> {
            self.attempt().map(|_| IndexStats {
                document_count: 0,
                is_fully_indexed: true,
            })
        }

        async fn list_recent_tasks(&self, _limit: usize) -> Result<Vec<SyncTask>, SearchError> {
            self.attempt().map(|_| Vec::new())
        }

        async fn search(
            &self,
            _index: &str,
            _request: &SearchRequest,
        ) -> Result<SearchResponse, SearchError> {
            self.attempt().map(|_| SearchResponse::empty())
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            self.attempt().map(|_| true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures() {
        let (flaky, calls) = FlakyClient::new(2, SearchError::unreachable("connection refused"));
        let client = RetryingClient::new(Box::new(flaky), RetryPolicy::default());

        let task = client.get_task(7).await.unwrap();

        assert_eq!(task.uid, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let (flaky, calls) = FlakyClient::new(10, SearchError::rejected(503, "unavailable"));
        let client = RetryingClient::new(Box::new(flaky), RetryPolicy::with_max_retries(2));

        let err = client.create_index("items", "id").await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_are_not_retried() {
        let (flaky, calls) = FlakyClient::new(1, SearchError::rejected(400, "invalid filter"));
        let client = RetryingClient::new(Box::new(flaky), RetryPolicy::default());

        let request = SearchRequest {
            query: "aspirin".to_string(),
            filter: None,
            limit: None,
            offset: None,
        };
        assert!(client.search("items", &request).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_health_check_is_not_retried() {
        let (flaky, calls) = FlakyClient::new(1, SearchError::unreachable("down"));
        let client = RetryingClient::new(Box::new(flaky), RetryPolicy::default());

        assert!(client.health_check().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
