//! HTTP API for the item search service.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::service::{SearchParams, SearchService, SyncSummary};
use item_search_pipeline::{FacetChoices, PipelineError, StatusReport};
use item_search_shared::{SearchResponse, SyncTask};

/// Error body returned by every failing route: `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Map an error from a resync. Engine failures that abort the resync are
    /// reported as a bad gateway.
    fn from_sync(err: PipelineError) -> Self {
        match err {
            PipelineError::SearchError(_) | PipelineError::TaskFailed { .. } => Self {
                status: StatusCode::BAD_GATEWAY,
                message: err.to_string(),
            },
            other => other.into(),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            PipelineError::SyncInProgress => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Document statistics in the shape clients expect.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexStatsBody {
    number_of_documents: u64,
    is_indexed: bool,
}

#[derive(Debug, Serialize)]
struct StatusBody {
    tasks: Vec<SyncTask>,
    index_stats: IndexStatsBody,
}

impl From<StatusReport> for StatusBody {
    fn from(report: StatusReport) -> Self {
        Self {
            tasks: report.recent_tasks,
            index_stats: IndexStatsBody {
                number_of_documents: report.stats.document_count,
                is_indexed: report.stats.is_fully_indexed,
            },
        }
    }
}

async fn sync_handler(
    State(service): State<Arc<SearchService>>,
) -> Result<Json<SyncSummary>, ApiError> {
    let summary = service.sync().await.map_err(ApiError::from_sync)?;
    Ok(Json(summary))
}

async fn search_handler(
    State(service): State<Arc<SearchService>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let response = service.search(&params).await?;
    Ok(Json(response))
}

async fn status_handler(
    State(service): State<Arc<SearchService>>,
) -> Result<Json<StatusBody>, ApiError> {
    let report = service.status().await?;
    Ok(Json(report.into()))
}

async fn facets_handler(State(service): State<Arc<SearchService>>) -> Json<FacetChoices> {
    Json(service.facets().await)
}

async fn health_handler(State(service): State<Arc<SearchService>>) -> Json<serde_json::Value> {
    let engine = if service.engine_available().await {
        "available"
    } else {
        "unavailable"
    };
    Json(json!({ "status": "ok", "engine": engine }))
}

/// Build the HTTP API router around the given service.
pub fn build_router(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/sync", post(sync_handler))
        .route("/search", get(search_handler))
        .route("/status", get(status_handler))
        .route("/facets", get(facets_handler))
        .route("/health", get(health_handler))
        .with_state(service)
}
