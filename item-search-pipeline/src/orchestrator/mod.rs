//! Orchestrator module for the item search pipeline.
//!
//! Drives a full resync: the index is dropped, recreated, configured and
//! repopulated from the loaded records.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::waiter::TaskWaiter;
use item_search_repository::{IndexEngineClient, SearchError};
use item_search_shared::{IndexSettings, Record, SyncTask, TaskStatus};

/// Configuration for the sync orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Wait for each issued task to finish before moving on.
    pub await_tasks: bool,
    /// Delay between task polls when awaiting.
    pub poll_interval: Duration,
    /// Maximum time to wait for a single task.
    pub max_wait: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            await_tasks: false,
            poll_interval: Duration::from_millis(500),
            max_wait: Duration::from_secs(30),
        }
    }
}

/// Steps of a resync, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    CreateIndex,
    BaseSettings,
    ExtendedSettings,
    UpsertDocuments,
}

/// A step that was rejected, failed or timed out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFailure {
    pub step: SyncStep,
    pub message: String,
}

/// Outcome of one resync.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncResult {
    /// Records accepted by the engine (and indexed, when tasks are awaited).
    pub documents_submitted: usize,
    /// Every task the engine accepted, in issue order. Awaited tasks carry
    /// their final state.
    pub tasks_issued: Vec<SyncTask>,
    /// Steps that did not complete.
    pub failures: Vec<StepFailure>,
}

impl SyncResult {
    /// Whether both settings steps went through.
    pub fn settings_applied(&self) -> bool {
        !self
            .failures
            .iter()
            .any(|f| matches!(f.step, SyncStep::BaseSettings | SyncStep::ExtendedSettings))
    }

    /// Whether every step went through.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, step: SyncStep, message: impl Into<String>) {
        self.failures.push(StepFailure {
            step,
            message: message.into(),
        });
    }
}

/// Orchestrator that rebuilds the index from a set of records.
///
/// Only one resync runs at a time; a second call while one is in flight is
/// rejected with `PipelineError::SyncInProgress`.
pub struct SyncOrchestrator {
    client: Arc<dyn IndexEngineClient>,
    waiter: TaskWaiter,
    index: String,
    options: SyncOptions,
    in_flight: Mutex<()>,
}

impl SyncOrchestrator {
    /// Create a new orchestrator with default options.
    pub fn new(client: Arc<dyn IndexEngineClient>, index: impl Into<String>) -> Self {
        Self::with_options(client, index, SyncOptions::default())
    }

    /// Create a new orchestrator with custom options.
    pub fn with_options(
        client: Arc<dyn IndexEngineClient>,
        index: impl Into<String>,
        options: SyncOptions,
    ) -> Self {
        Self {
            waiter: TaskWaiter::new(client.clone()),
            client,
            index: index.into(),
            options,
            in_flight: Mutex::new(()),
        }
    }

    /// The index this orchestrator manages.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Rebuild the index from `records`.
    ///
    /// Only the index creation is fatal. Every later step is attempted even
    /// when an earlier one failed, and failures are collected in the result.
    #[instrument(
        skip(self, records, settings),
        fields(index = %self.index, record_count = records.len())
    )]
    pub async fn full_resync(
        &self,
        records: &[Record],
        settings: &IndexSettings,
    ) -> Result<SyncResult, PipelineError> {
        let _guard = self.in_flight.try_lock().map_err(|_| {
            warn!("Rejecting resync, another one is running");
            PipelineError::SyncInProgress
        })?;

        info!(await_tasks = self.options.await_tasks, "Starting full resync");
        let mut result = SyncResult::default();

        self.drop_existing(&mut result).await;
        self.create(&settings.primary_key, &mut result).await?;

        self.track(
            SyncStep::BaseSettings,
            self.client.patch_settings(&self.index, &settings.base()).await,
            &mut result,
        )
        .await;
        self.track(
            SyncStep::ExtendedSettings,
            self.client.patch_settings(&self.index, settings).await,
            &mut result,
        )
        .await;

        if records.is_empty() {
            info!("No records to upload");
        } else if self
            .track(
                SyncStep::UpsertDocuments,
                self.client.upsert_documents(&self.index, records).await,
                &mut result,
            )
            .await
        {
            result.documents_submitted = records.len();
        }

        if result.is_complete() {
            info!(
                documents = result.documents_submitted,
                tasks = result.tasks_issued.len(),
                "Resync complete"
            );
        } else {
            warn!(
                documents = result.documents_submitted,
                failures = result.failures.len(),
                "Resync finished with failures"
            );
        }

        Ok(result)
    }

    /// Delete the index if it exists. Problems here are logged only.
    async fn drop_existing(&self, result: &mut SyncResult) {
        match self.client.delete_index(&self.index).await {
            Ok(Some(task)) => {
                let task = if self.options.await_tasks {
                    match self.wait(&task).await {
                        Ok(done) => done,
                        Err(e) => {
                            warn!(error = %e, "Index deletion did not finish");
                            task
                        }
                    }
                } else {
                    task
                };
                debug!(task_id = task.uid, status = %task.status, "Index deletion issued");
                result.tasks_issued.push(task);
            }
            Ok(None) => debug!("No existing index to delete"),
            Err(e) => warn!(error = %e, "Failed to delete index, continuing"),
        }
    }

    /// Create the index. A rejected request or a failed creation task aborts
    /// the resync; a timeout does not, as the engine runs tasks in order.
    async fn create(
        &self,
        primary_key: &str,
        result: &mut SyncResult,
    ) -> Result<(), PipelineError> {
        let task = self
            .client
            .create_index(&self.index, primary_key)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create index");
                e
            })?;

        if !self.options.await_tasks {
            result.tasks_issued.push(task);
            return Ok(());
        }

        match self.wait(&task).await {
            Ok(done) if done.status == TaskStatus::Succeeded => {
                result.tasks_issued.push(done);
                Ok(())
            }
            Ok(done) => {
                let message = failure_message(&done);
                error!(task_id = done.uid, %message, "Index creation failed");
                Err(PipelineError::TaskFailed {
                    task_id: done.uid,
                    message,
                })
            }
            Err(e) => {
                warn!(error = %e, "Index creation did not finish, continuing");
                result.fail(SyncStep::CreateIndex, e.to_string());
                result.tasks_issued.push(task);
                Ok(())
            }
        }
    }

    /// Record the outcome of a non-fatal step. Returns whether it went through.
    async fn track(
        &self,
        step: SyncStep,
        outcome: Result<SyncTask, SearchError>,
        result: &mut SyncResult,
    ) -> bool {
        let task = match outcome {
            Ok(task) => task,
            Err(e) => {
                warn!(?step, error = %e, "Sync step rejected");
                result.fail(step, e.to_string());
                return false;
            }
        };

        if !self.options.await_tasks {
            debug!(?step, task_id = task.uid, "Task issued");
            result.tasks_issued.push(task);
            return true;
        }

        match self.wait(&task).await {
            Ok(done) if done.status == TaskStatus::Succeeded => {
                result.tasks_issued.push(done);
                true
            }
            Ok(done) => {
                let message = failure_message(&done);
                warn!(?step, task_id = done.uid, %message, "Sync step failed");
                result.fail(step, message);
                result.tasks_issued.push(done);
                false
            }
            Err(e) => {
                warn!(?step, error = %e, "Sync step did not finish");
                result.fail(step, e.to_string());
                result.tasks_issued.push(task);
                false
            }
        }
    }

    async fn wait(&self, task: &SyncTask) -> Result<SyncTask, PipelineError> {
        self.waiter
            .await_completion(task.uid, self.options.poll_interval, self.options.max_wait)
            .await
    }
}

fn failure_message(task: &SyncTask) -> String {
    task.error_message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("task ended as {}", task.status))
}
