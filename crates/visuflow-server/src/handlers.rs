//! REST API handlers

use std::io::Write;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use visuflow_core::Graph;
use visuflow_sources::{
    DEFAULT_ROW_LIMIT, DataSource, DemoSource, GithubSource, SourceError, SqliteSource, SqliteView,
    load_graph, parse_json,
};

use crate::{Adopted, ServerState};

/// An error rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        let status = if err.is_bad_input() {
            StatusCode::BAD_REQUEST
        } else if err.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            tracing::warn!("Load failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SqliteParams {
    pub table: Option<String>,
    pub query: Option<String>,
    pub limit: Option<usize>,
}

impl SqliteParams {
    fn view(self) -> Result<SqliteView, ApiError> {
        match (self.table, self.query) {
            (Some(_), Some(_)) => Err(ApiError::bad_request("pass either table or query, not both")),
            (Some(name), None) => Ok(SqliteView::Table {
                name,
                limit: self.limit.unwrap_or(DEFAULT_ROW_LIMIT),
            }),
            (None, Some(sql)) => Ok(SqliteView::Query(sql)),
            (None, None) => Ok(SqliteView::Schema),
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// The current snapshot, if anything has been loaded.
pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Result<Json<Adopted>, ApiError> {
    state
        .current()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no graph has been loaded yet"))
}

/// Raw JSON document in the request body.
pub async fn load_json(
    State(state): State<Arc<ServerState>>,
    body: String,
) -> Result<Json<Adopted>, ApiError> {
    let value = parse_json(&body)?;
    let graph = build(&state, value).await?;
    Ok(Json(state.adopt(graph, "json:<upload>").await))
}

/// `{ "url": "https://github.com/owner/repo" }`
pub async fn load_github(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<GithubRequest>, JsonRejection>,
) -> Result<Json<Adopted>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let source = GithubSource::new(state.github.clone(), &request.url)?;
    let graph = load_graph(&source, &state.engine).await?;
    Ok(Json(state.adopt(graph, source.describe()).await))
}

/// Database file bytes in the body; `?table=` or `?query=` pick a view.
pub async fn load_sqlite(
    State(state): State<Arc<ServerState>>,
    params: Result<Query<SqliteParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<Adopted>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let view = params.view()?;
    if body.is_empty() {
        return Err(ApiError::bad_request("request body must contain a SQLite database"));
    }

    let label = match &view {
        SqliteView::Schema => "sqlite:<upload>".to_string(),
        SqliteView::Table { name, .. } => format!("sqlite:<upload>#{}", name),
        SqliteView::Query(_) => "sqlite:<upload>?query".to_string(),
    };

    // the file must outlive the load
    let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&body)?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(SourceError::from)?
    .map_err(SourceError::from)?;

    let source = SqliteSource::new(file.path(), view);
    let graph = load_graph(&source, &state.engine).await?;
    drop(file);

    Ok(Json(state.adopt(graph, label).await))
}

/// A built-in sample, `json` or `sqlite`.
pub async fn load_demo(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
) -> Result<Json<Adopted>, ApiError> {
    let demo: DemoSource = kind.parse().map_err(ApiError::bad_request)?;
    let graph = load_graph(&demo, &state.engine).await?;
    Ok(Json(state.adopt(graph, demo.describe()).await))
}

async fn build(state: &ServerState, value: Value) -> Result<Graph, ApiError> {
    let engine = state.engine.clone();
    let graph = tokio::task::spawn_blocking(move || Graph::build(&value, &engine))
        .await
        .map_err(SourceError::from)?;
    tracing::info!(
        "Built graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
