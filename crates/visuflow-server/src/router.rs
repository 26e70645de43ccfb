//! Axum router setup

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    ServerState,
    handlers::{get_graph, health_check, load_demo, load_github, load_json, load_sqlite},
    websocket::ws_handler,
};

/// Largest accepted upload (JSON text or database file).
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health_check))
        .route("/api/graph", get(get_graph))
        .route("/api/graph/json", post(load_json))
        .route("/api/graph/github", post(load_github))
        .route("/api/graph/sqlite", post(load_sqlite))
        .route("/api/graph/demo/:kind", post(load_demo))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
