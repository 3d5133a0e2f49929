//! In-memory engine used by the pipeline tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};

use item_search_repository::{IndexEngineClient, SearchError};
use item_search_shared::{
    IndexSettings, IndexStats, Record, SearchRequest, SearchResponse, SyncTask, TaskStatus,
};

#[derive(Debug, Default, Clone)]
pub struct FakeIndex {
    pub primary_key: String,
    pub settings: Map<String, Value>,
    pub documents: BTreeMap<String, Record>,
}

#[derive(Default)]
struct State {
    indexes: HashMap<String, FakeIndex>,
    tasks: Vec<SyncTask>,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
}

/// Engine that applies every write immediately and records a succeeded task.
#[derive(Default)]
pub struct FakeEngine {
    state: Mutex<State>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `operation` fail with a 500 response.
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn index(&self, name: &str) -> Option<FakeIndex> {
        self.state.lock().unwrap().indexes.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, operation: &'static str) -> Result<MutexGuard<'_, State>, SearchError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(SearchError::rejected(500, format!("{operation} failed")));
        }
        Ok(state)
    }
}

impl State {
    fn task(&mut self, index: &str, task_type: &str) -> SyncTask {
        let task = SyncTask::new(self.tasks.len() as u64, TaskStatus::Succeeded)
            .with_index(index)
            .with_type(task_type);
        self.tasks.push(task.clone());
        task
    }

    fn index_mut(&mut self, index: &str) -> Result<&mut FakeIndex, SearchError> {
        self.indexes
            .get_mut(index)
            .ok_or_else(|| SearchError::rejected(404, format!("Index `{index}` not found.")))
    }
}

#[async_trait]
impl IndexEngineClient for FakeEngine {
    async fn delete_index(&self, index: &str) -> Result<Option<SyncTask>, SearchError> {
        let mut state = self.enter("delete_index")?;
        if state.indexes.remove(index).is_none() {
            return Ok(None);
        }
        Ok(Some(state.task(index, "indexDeletion")))
    }

    async fn create_index(&self, index: &str, primary_key: &str) -> Result<SyncTask, SearchError> {
        let mut state = self.enter("create_index")?;
        state.indexes.insert(
            index.to_string(),
            FakeIndex {
                primary_key: primary_key.to_string(),
                ..FakeIndex::default()
            },
        );
        Ok(state.task(index, "indexCreation"))
    }

    async fn patch_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<SyncTask, SearchError> {
        let mut state = self.enter("patch_settings")?;
        let patch = match serde_json::to_value(settings) {
            Ok(Value::Object(patch)) => patch,
            _ => return Err(SearchError::serialization("settings are not an object")),
        };
        let target = state.index_mut(index)?;
        target.settings.extend(patch);
        Ok(state.task(index, "settingsUpdate"))
    }

    async fn upsert_documents(
        &self,
        index: &str,
        records: &[Record],
    ) -> Result<SyncTask, SearchError> {
        let mut state = self.enter("upsert_documents")?;
        let target = state.index_mut(index)?;
        let primary_key = target.primary_key.clone();
        for record in records {
            let key = record.get(&primary_key).unwrap_or_default().to_string();
            target.documents.insert(key, record.clone());
        }
        Ok(state.task(index, "documentAdditionOrUpdate"))
    }

    async fn get_task(&self, task_id: u64) -> Result<SyncTask, SearchError> {
        let state = self.enter("get_task")?;
        state
            .tasks
            .get(task_id as usize)
            .cloned()
            .ok_or_else(|| SearchError::rejected(404, format!("Task `{task_id}` not found.")))
    }

    async fn get_index_stats(&self, index: &str) -> Result<IndexStats, SearchError> {
        let mut state = self.enter("get_index_stats")?;
        let target = state.index_mut(index)?;
        Ok(IndexStats {
            document_count: target.documents.len() as u64,
            is_fully_indexed: true,
        })
    }

    async fn list_recent_tasks(&self, limit: usize) -> Result<Vec<SyncTask>, SearchError> {
        let state = self.enter("list_recent_tasks")?;
        Ok(state.tasks.iter().rev().take(limit).cloned().collect())
    }

    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        let mut state = self.enter("search")?;
        let target = state.index_mut(index)?;
        let needle = request.query.to_lowercase();
        let hits = target
            .documents
            .values()
            .filter(|record| {
                record
                    .fields()
                    .any(|(_, value)| value.to_lowercase().contains(&needle))
            })
            .filter_map(|record| serde_json::to_value(record).ok())
            .collect::<Vec<_>>();

        Ok(SearchResponse {
            estimated_total_hits: Some(hits.len() as u64),
            hits,
            query: request.query.clone(),
            processing_time_ms: Some(0),
        })
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let _state = self.enter("health_check")?;
        Ok(true)
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_is_recorded() {
        let engine = FakeEngine::new();

        assert!(engine.health_check().await.unwrap());
        engine.fail_on("health_check");
        assert!(engine.health_check().await.is_err());
        assert_eq!(engine.calls(), vec!["health_check", "health_check"]);
    }
}
