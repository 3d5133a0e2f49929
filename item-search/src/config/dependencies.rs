//! Dependency initialization and wiring for the item search service.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::service::SearchService;
use crate::ServiceError;
use item_search_repository::meilisearch::catalog_settings;
use item_search_repository::{
    EngineConfig, IndexEngineClient, MeilisearchClient, RetryPolicy, RetryingClient,
};
use item_search_shared::IndexSettings;

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub config: AppConfig,
    /// The service ready to serve requests.
    pub service: Arc<SearchService>,
}

impl Dependencies {
    /// Initialize all dependencies from the given configuration.
    ///
    /// An unhealthy or unreachable engine is logged, not fatal: the service
    /// starts anyway and reports engine errors per request.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServiceError)` - If the client or settings cannot be built
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!(
            engine_url = %config.engine_url,
            index = %config.index_name,
            data_file = %config.data_file.display(),
            await_tasks = config.sync_options.await_tasks,
            max_retries = config.max_retries,
            "Initializing dependencies"
        );

        let client = build_client(&config)?;

        match client.health_check().await {
            Ok(true) => info!("Meilisearch connection verified"),
            Ok(false) => warn!("Meilisearch reports it is not available"),
            Err(e) => warn!(error = %e, "Meilisearch health check failed"),
        }

        let settings = load_index_settings(config.settings_file.as_deref())?;
        let service = Arc::new(SearchService::new(client, &config, settings));

        Ok(Self { config, service })
    }
}

/// Build the engine client, wrapped in a retrying client when retries are on.
pub fn build_client(config: &AppConfig) -> Result<Arc<dyn IndexEngineClient>, ServiceError> {
    let mut engine_config = EngineConfig::new(&config.engine_url);
    if let Some(key) = &config.api_key {
        engine_config = engine_config.with_api_key(key);
    }

    let client = MeilisearchClient::new(&engine_config)?;

    if config.max_retries == 0 {
        return Ok(Arc::new(client));
    }

    Ok(Arc::new(RetryingClient::new(
        Box::new(client),
        RetryPolicy::with_max_retries(config.max_retries),
    )))
}

/// Read index settings from `path`, or use the built-in catalog settings.
pub fn load_index_settings(path: Option<&Path>) -> Result<IndexSettings, ServiceError> {
    let Some(path) = path else {
        return Ok(catalog_settings());
    };

    let raw = fs::read_to_string(path).map_err(|e| {
        ServiceError::config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let settings: IndexSettings = serde_json::from_str(&raw).map_err(|e| {
        ServiceError::config(format!("Invalid index settings in {}: {}", path.display(), e))
    })?;

    info!(path = %path.display(), "Loaded index settings");
    Ok(settings)
}
