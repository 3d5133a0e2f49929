//! Engine task and index statistics types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an engine task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    /// Reported by the engine when a task is cancelled before it runs.
    Canceled,
}

impl TaskStatus {
    /// Whether the task will not change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enqueued => "enqueued",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error details attached to a failed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// An asynchronous operation accepted by the engine.
///
/// Write calls return a summarized task (`taskUid`); the task endpoints return
/// the full object (`uid`). Both decode into this type. Tasks are only ever
/// read back from the engine, never changed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTask {
    #[serde(alias = "taskUid")]
    pub uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type", default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub enqueued_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
}

impl SyncTask {
    /// Create a task with the given id and status.
    pub fn new(uid: u64, status: TaskStatus) -> Self {
        Self {
            uid,
            index_uid: None,
            status,
            task_type: None,
            enqueued_at: None,
            error: None,
        }
    }

    /// Set the index the task belongs to.
    pub fn with_index(mut self, index_uid: impl Into<String>) -> Self {
        self.index_uid = Some(index_uid.into());
        self
    }

    /// Set the task type (e.g. `indexCreation`).
    pub fn with_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    /// Error message reported by the engine, if the task failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

/// Document statistics of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: u64,
    /// `true` when the engine has no indexing work pending for the index.
    pub is_fully_indexed: bool,
}
