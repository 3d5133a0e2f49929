//! # Item Search Pipeline
//!
//! This crate provides the components that move item data from the source
//! file into the search engine and query it back.
//!
//! ## Architecture
//!
//! 1. **Loader**: Reads the item source into records
//! 2. **Orchestrator**: Rebuilds the index (drop, create, configure, upload)
//! 3. **Waiter**: Optionally waits for the engine tasks a resync issues
//! 4. **Query**: Validates search input and builds engine requests
//! 5. **Status**: Reports recent engine tasks and index statistics

pub mod errors;
pub mod facets;
pub mod loader;
pub mod orchestrator;
pub mod query;
pub mod status;
pub mod waiter;

#[cfg(test)]
mod test_support;

pub use errors::PipelineError;
pub use facets::{distinct_values, FacetChoices};
pub use loader::{LoadReport, LoadSummary, LoaderConfig, RecordLoader};
pub use orchestrator::{StepFailure, SyncOptions, SyncOrchestrator, SyncResult, SyncStep};
pub use query::QueryBuilder;
pub use status::{StatusReport, StatusReporter, RECENT_TASK_LIMIT};
pub use waiter::TaskWaiter;
