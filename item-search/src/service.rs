//! Service facade tying the pipeline components to one index and source file.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::AppConfig;
use item_search_pipeline::{
    FacetChoices, LoadReport, LoadSummary, PipelineError, QueryBuilder, RecordLoader,
    StatusReport, StatusReporter, SyncOrchestrator, SyncResult,
};
use item_search_repository::IndexEngineClient;
use item_search_shared::{IndexSettings, SearchResponse};

/// Query parameters accepted by a search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Outcome of a load followed by a resync.
#[derive(Debug, Clone, Serialize)]
pub struct SyncSummary {
    #[serde(flatten)]
    pub load: LoadSummary,
    pub settings_applied: bool,
    pub sync: SyncResult,
}

/// Everything the HTTP surface and startup need, for one index.
pub struct SearchService {
    client: Arc<dyn IndexEngineClient>,
    orchestrator: SyncOrchestrator,
    reporter: StatusReporter,
    queries: QueryBuilder,
    loader: RecordLoader,
    settings: IndexSettings,
    data_file: PathBuf,
    index: String,
}

impl SearchService {
    pub fn new(
        client: Arc<dyn IndexEngineClient>,
        config: &AppConfig,
        settings: IndexSettings,
    ) -> Self {
        Self {
            orchestrator: SyncOrchestrator::with_options(
                client.clone(),
                config.index_name.clone(),
                config.sync_options,
            ),
            reporter: StatusReporter::new(client.clone(), config.index_name.clone()),
            queries: QueryBuilder::from_settings(&settings),
            loader: RecordLoader::new(),
            client,
            settings,
            data_file: config.data_file.clone(),
            index: config.index_name.clone(),
        }
    }

    /// Load the source file and rebuild the index from it.
    ///
    /// An unreadable source syncs an empty catalog; the reason is kept in
    /// the summary.
    #[instrument(skip(self), fields(index = %self.index))]
    pub async fn sync(&self) -> Result<SyncSummary, PipelineError> {
        let report = self.load_records().await;
        let sync = self
            .orchestrator
            .full_resync(&report.records, &self.settings)
            .await?;

        let summary = SyncSummary {
            load: LoadSummary::from(&report),
            settings_applied: sync.settings_applied(),
            sync,
        };
        info!(
            records_loaded = summary.load.records_loaded,
            settings_applied = summary.settings_applied,
            "Sync finished"
        );
        Ok(summary)
    }

    /// Run a validated search against the index.
    #[instrument(skip(self))]
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, PipelineError> {
        let mut request = self.queries.build(
            params.q.as_deref(),
            [
                ("brand", params.brand.as_deref()),
                ("category", params.category.as_deref()),
            ],
        )?;
        request.limit = params.limit;
        request.offset = params.offset;

        let response = self.client.search(&self.index, &request).await?;
        Ok(response)
    }

    /// Recent tasks and index statistics.
    pub async fn status(&self) -> Result<StatusReport, PipelineError> {
        self.reporter.report().await
    }

    /// Distinct brands and categories in the source file.
    pub async fn facets(&self) -> FacetChoices {
        let report = self.load_records().await;
        FacetChoices::from_records(&report.records)
    }

    /// Whether the engine reports itself available.
    pub async fn engine_available(&self) -> bool {
        match self.client.health_check().await {
            Ok(available) => available,
            Err(e) => {
                warn!(error = %e, "Engine health check failed");
                false
            }
        }
    }

    /// The index this service manages.
    pub fn index(&self) -> &str {
        &self.index
    }

    async fn load_records(&self) -> LoadReport {
        let loader = self.loader.clone();
        let path = self.data_file.clone();

        match tokio::task::spawn_blocking(move || loader.load(&path)).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Loader task failed");
                LoadReport::from_error(PipelineError::source_unavailable(
                    self.data_file.display().to_string(),
                    e.to_string(),
                ))
            }
        }
    }
}
