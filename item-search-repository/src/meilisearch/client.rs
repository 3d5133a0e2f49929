//! Meilisearch client implementation.
//!
//! This module provides the concrete implementation of `IndexEngineClient`
//! over the Meilisearch HTTP API.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::EngineConfig;
use crate::errors::SearchError;
use crate::interfaces::IndexEngineClient;
use crate::meilisearch::queries::{build_create_index_body, build_search_body};
use item_search_shared::{
    IndexSettings, IndexStats, Record, SearchRequest, SearchResponse, SyncTask,
};

/// Index statistics as returned by `GET /indexes/{index}/stats`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIndexStats {
    #[serde(default)]
    number_of_documents: u64,
    #[serde(default)]
    is_indexing: bool,
}

/// Page of tasks as returned by `GET /tasks`.
#[derive(Debug, Deserialize)]
struct TaskList {
    results: Vec<SyncTask>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// Meilisearch client implementation.
///
/// Every request carries the configured key as a bearer token.
///
/// # Example
///
/// ```ignore
/// use item_search_repository::{EngineConfig, MeilisearchClient};
/// let config = EngineConfig::new("http://localhost:7700").with_api_key("masterKey");
/// let client = MeilisearchClient::new(&config)?;
///
/// let task = client.create_index("items", "id").await?;
/// println!("index creation enqueued as task {}", task.uid);
/// ```
pub struct MeilisearchClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl MeilisearchClient {
    /// Create a new client for the engine described by `config`.
    ///
    /// # Returns
    ///
    /// * `Ok(MeilisearchClient)` - A new client instance
    /// * `Err(SearchError::InvalidConfig)` - If the URL is invalid or the HTTP client cannot be
    ///   built
    pub fn new(config: &EngineConfig) -> Result<Self, SearchError> {
        let base_url = Url::parse(&config.url).map_err(|e| {
            SearchError::invalid_config(format!("Invalid engine URL {}: {}", config.url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SearchError::invalid_config(format!(
                "Engine URL {} cannot be used as a base URL",
                config.url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SearchError::invalid_config(e.to_string()))?;

        info!(
            url = %base_url,
            authenticated = config.api_key.is_some(),
            "Created Meilisearch client"
        );

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SearchError> {
        let response = builder
            .send()
            .await
            .map_err(|e| SearchError::unreachable(e.to_string()))?;
        Self::check_status(response).await
    }

    async fn check_status(response: Response) -> Result<Response, SearchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "Engine request failed");
        Err(SearchError::rejected(status.as_u16(), body))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SearchError> {
        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }
}

#[async_trait]
impl IndexEngineClient for MeilisearchClient {
    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<Option<SyncTask>, SearchError> {
        let response = self
            .request(Method::DELETE, self.endpoint(&["indexes", index]))
            .send()
            .await
            .map_err(|e| SearchError::unreachable(e.to_string()))?;

        // 404 is acceptable - index may not exist
        if response.status() == StatusCode::NOT_FOUND {
            debug!(index = %index, "Index did not exist");
            return Ok(None);
        }

        let task: SyncTask = Self::decode(Self::check_status(response).await?).await?;
        debug!(index = %index, task_uid = task.uid, "Index deletion enqueued");
        Ok(Some(task))
    }

    #[instrument(skip(self))]
    async fn create_index(&self, index: &str, primary_key: &str) -> Result<SyncTask, SearchError> {
        let response = self
            .send(
                self.request(Method::POST, self.endpoint(&["indexes"]))
                    .json(&build_create_index_body(index, primary_key)),
            )
            .await?;

        let task: SyncTask = Self::decode(response).await?;
        debug!(index = %index, task_uid = task.uid, "Index creation enqueued");
        Ok(task)
    }

    #[instrument(skip(self, settings))]
    async fn patch_settings(
        &self,
        index: &str,
        settings: &IndexSettings,
    ) -> Result<SyncTask, SearchError> {
        let response = self
            .send(
                self.request(Method::PATCH, self.endpoint(&["indexes", index, "settings"]))
                    .json(settings),
            )
            .await?;

        let task: SyncTask = Self::decode(response).await?;
        debug!(index = %index, task_uid = task.uid, "Settings update enqueued");
        Ok(task)
    }

    #[instrument(skip(self, records), fields(record_count = records.len()))]
    async fn upsert_documents(
        &self,
        index: &str,
        records: &[Record],
    ) -> Result<SyncTask, SearchError> {
        let payload =
            serde_json::to_vec(records).map_err(|e| SearchError::serialization(e.to_string()))?;

        let response = self
            .send(
                self.request(Method::POST, self.endpoint(&["indexes", index, "documents"]))
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload),
            )
            .await?;

        let task: SyncTask = Self::decode(response).await?;
        debug!(index = %index, task_uid = task.uid, "Document upsert enqueued");
        Ok(task)
    }

    async fn get_task(&self, task_id: u64) -> Result<SyncTask, SearchError> {
        let task_id = task_id.to_string();
        let response = self
            .send(self.request(Method::GET, self.endpoint(&["tasks", &task_id])))
            .await?;

        Self::decode(response).await
    }

    async fn get_index_stats(&self, index: &str) -> Result<IndexStats, SearchError> {
        let response = self
            .send(self.request(Method::GET, self.endpoint(&["indexes", index, "stats"])))
            .await?;

        let raw: RawIndexStats = Self::decode(response).await?;
        Ok(IndexStats {
            document_count: raw.number_of_documents,
            is_fully_indexed: !raw.is_indexing,
        })
    }

    async fn list_recent_tasks(&self, limit: usize) -> Result<Vec<SyncTask>, SearchError> {
        let response = self
            .send(
                self.request(Method::GET, self.endpoint(&["tasks"]))
                    .query(&[("limit", limit)]),
            )
            .await?;

        let page: TaskList = Self::decode(response).await?;
        Ok(page.results)
    }

    #[instrument(skip(self, request), fields(query = %request.query))]
    async fn search(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse, SearchError> {
        let response = self
            .send(
                self.request(Method::POST, self.endpoint(&["indexes", index, "search"]))
                    .json(&build_search_body(request)),
            )
            .await?;

        let result: SearchResponse = Self::decode(response).await?;
        debug!(hits = result.hits.len(), "Search completed");
        Ok(result)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .send(self.request(Method::GET, self.endpoint(&["health"])))
            .await?;

        let health: HealthResponse = Self::decode(response).await?;
        debug!(status = %health.status, "Engine health");
        Ok(health.status == "available")
    }
}
