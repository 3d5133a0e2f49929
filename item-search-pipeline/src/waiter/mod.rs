//! Polls engine tasks until they settle.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, instrument, warn};

use crate::errors::PipelineError;
use item_search_repository::IndexEngineClient;
use item_search_shared::SyncTask;

/// Waits for engine tasks to reach a terminal state.
pub struct TaskWaiter {
    client: Arc<dyn IndexEngineClient>,
}

impl TaskWaiter {
    pub fn new(client: Arc<dyn IndexEngineClient>) -> Self {
        Self { client }
    }

    /// Poll `task_id` every `poll_interval` until it is terminal or
    /// `max_wait` has elapsed.
    ///
    /// The task is polled at least once, and once more at the deadline. The
    /// terminal task is returned whatever its outcome; callers decide what a
    /// `failed` or `canceled` task means for them.
    #[instrument(skip(self))]
    pub async fn await_completion(
        &self,
        task_id: u64,
        poll_interval: Duration,
        max_wait: Duration,
    ) -> Result<SyncTask, PipelineError> {
        let deadline = Instant::now() + max_wait;
        let mut polls = 0u32;

        loop {
            let task = self.client.get_task(task_id).await?;
            polls += 1;

            if task.status.is_terminal() {
                debug!(polls, status = %task.status, "Task finished");
                return Ok(task);
            }

            let now = Instant::now();
            if now >= deadline {
                warn!(polls, status = %task.status, "Gave up waiting for task");
                return Err(PipelineError::TaskTimeout {
                    task_id,
                    last_status: task.status,
                });
            }

            sleep(poll_interval.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use item_search_repository::SearchError;
    use item_search_shared::{
        IndexSettings, IndexStats, Record, SearchRequest, SearchResponse, TaskStatus,
    };
    use std::sync::Mutex;

    /// Mock client that reports a scripted status sequence for every task.
    /// The last status repeats once the script runs out.
    struct ScriptedClient {
        script: Mutex<Vec<TaskStatus>>,
        polls: Mutex<u32>,
    }

    impl ScriptedClient {
        fn new(script: &[TaskStatus]) -> Self {
            let mut script = script.to_vec();
            script.reverse();
            Self {
                script: Mutex::new(script),
                polls: Mutex::new(0),
            }
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }
    }

    #[async_trait]
    impl IndexEngineClient for ScriptedClient {
        async fn delete_index(&self, _index: &str) -> Result<Option<SyncTask>, SearchError> {
            unimplemented!()
        }

        async fn create_index(&self, _index: &str, _pk: &str) -> Result<SyncTask, SearchError> {
            unimplemented!()
        }

        async fn patch_settings(
            &self,
            _index: &str,
            _settings: &IndexSettings,
        ) -> Result<SyncTask, SearchError> {
            unimplemented!()
        }

        async fn upsert_documents(
            &self,
            _index: &str,
            _records: &[Record],
        ) -> Result<SyncTask, SearchError> {
            unimplemented!()
        }

        async fn get_task(&self, task_id: u64) -> Result<SyncTask, SearchError> {
            *self.polls.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            let status = if script.len() > 1 {
                script.pop().unwrap()
            } else {
                script[0]
            };
            Ok(SyncTask::new(task_id, status))
        }

        async fn get_index_stats(&self, _index: &str) -> Result<IndexStats, SearchError> {
            unimplemented!()
        }

        async fn list_recent_tasks(&self, _limit: usize) -> Result<Vec<SyncTask>, SearchError> {
            unimplemented!()
        }

        async fn search(
            &self,
            _index: &str,
            _request: &SearchRequest,
        ) -> Result<SearchResponse, SearchError> {
            unimplemented!()
        }

        async fn health_check(&self) -> Result<bool, SearchError> {
            Ok(true)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_until_succeeded() {
        let client = Arc::new(ScriptedClient::new(&[
            TaskStatus::Enqueued,
            TaskStatus::Processing,
            TaskStatus::Succeeded,
        ]));
        let waiter = TaskWaiter::new(client.clone());

        let task = waiter
            .await_completion(4, Duration::from_millis(500), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(task.uid, 4);
        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(client.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_task_is_returned() {
        let client = Arc::new(ScriptedClient::new(&[TaskStatus::Failed]));
        let waiter = TaskWaiter::new(client);

        let task = waiter
            .await_completion(1, Duration::from_millis(500), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_last_status() {
        let client = Arc::new(ScriptedClient::new(&[TaskStatus::Processing]));
        let waiter = TaskWaiter::new(client.clone());

        let err = waiter
            .await_completion(9, Duration::from_millis(500), Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::TaskTimeout {
                task_id: 9,
                last_status: TaskStatus::Processing
            }
        ));
        // Polls at 0, 0.5, 1.0, 1.5 and 2.0 seconds.
        assert_eq!(client.polls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_wait_polls_once() {
        let client = Arc::new(ScriptedClient::new(&[TaskStatus::Enqueued]));
        let waiter = TaskWaiter::new(client.clone());

        let result = waiter
            .await_completion(2, Duration::from_millis(500), Duration::ZERO)
            .await;

        assert!(matches!(result, Err(PipelineError::TaskTimeout { .. })));
        assert_eq!(client.polls(), 1);
    }
}
