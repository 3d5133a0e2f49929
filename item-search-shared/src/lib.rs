//! # Item Search Shared
//!
//! Shared types for the item search service: source records, index settings,
//! engine tasks and search requests. Everything here is plain data; the
//! crates that talk to the engine or parse files depend on it.

mod record;
mod search;
mod settings;
mod task;

pub use record::{Record, ID_FIELD};
pub use search::{FilterPredicate, SearchFilter, SearchRequest, SearchResponse};
pub use settings::{
    Faceting, IndexSettings, MinWordSizeForTypos, Pagination, ProximityPrecision, TypoTolerance,
};
pub use task::{IndexStats, SyncTask, TaskError, TaskStatus};
