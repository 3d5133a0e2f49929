//! Engine status reporting.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::errors::PipelineError;
use item_search_repository::IndexEngineClient;
use item_search_shared::{IndexStats, SyncTask};

/// Number of recent tasks included in a report.
pub const RECENT_TASK_LIMIT: usize = 5;

/// Recent engine activity and document statistics of the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// Most recent tasks first, at most `RECENT_TASK_LIMIT`.
    pub recent_tasks: Vec<SyncTask>,
    pub stats: IndexStats,
}

/// Reports recent tasks and index statistics.
pub struct StatusReporter {
    client: Arc<dyn IndexEngineClient>,
    index: String,
}

impl StatusReporter {
    pub fn new(client: Arc<dyn IndexEngineClient>, index: impl Into<String>) -> Self {
        Self {
            client,
            index: index.into(),
        }
    }

    /// Fetch the report. Either engine call failing fails the whole report.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn report(&self) -> Result<StatusReport, PipelineError> {
        let (mut recent_tasks, stats) = tokio::try_join!(
            self.client.list_recent_tasks(RECENT_TASK_LIMIT),
            self.client.get_index_stats(&self.index),
        )?;

        recent_tasks.sort_by(|a, b| b.uid.cmp(&a.uid));
        recent_tasks.truncate(RECENT_TASK_LIMIT);

        Ok(StatusReport {
            recent_tasks,
            stats,
        })
    }
}
