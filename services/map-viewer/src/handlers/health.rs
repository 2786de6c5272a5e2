//! Health checks, metrics, and monitoring endpoints.

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::menu::MenuState;
use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /ready - Ready once the menu has loaded
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.menu_state().await {
        MenuState::Ready => (StatusCode::OK, "Ready"),
        MenuState::Loading => (StatusCode::SERVICE_UNAVAILABLE, "Loading"),
        MenuState::Failed => (StatusCode::SERVICE_UNAVAILABLE, "Menu failed to load"),
    }
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Metrics exporter not installed").into_response(),
    }
}

/// GET /api/metrics - counters as JSON
pub async fn api_metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
