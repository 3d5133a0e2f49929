//! Error types for the item search pipeline.

use item_search_repository::SearchError;
use item_search_shared::TaskStatus;
use thiserror::Error;

/// Errors that can occur in the item search pipeline.
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    /// The source file could not be opened.
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    /// The source file could not be parsed.
    #[error("Malformed source at line {line}: {reason}")]
    MalformedSource { line: u64, reason: String },

    /// A task did not reach a terminal state within the allowed time.
    #[error("Task {task_id} did not finish in time (last status: {last_status})")]
    TaskTimeout { task_id: u64, last_status: TaskStatus },

    /// A task reached a terminal state other than `succeeded`.
    #[error("Task {task_id} failed: {message}")]
    TaskFailed { task_id: u64, message: String },

    /// The free-text query was missing or blank.
    #[error("Query parameter 'q' is required")]
    EmptyQuery,

    /// A filter names an attribute that is not filterable.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Another resync is still running.
    #[error("A resync is already in progress")]
    SyncInProgress,

    /// Error from the search engine.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),
}

impl PipelineError {
    /// Create a source unavailable error.
    pub fn source_unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed source error.
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            line,
            reason: reason.into(),
        }
    }

    /// Create an invalid filter error.
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    /// Whether the error was caused by the caller's input rather than the
    /// engine or the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::InvalidFilter(_))
    }
}
