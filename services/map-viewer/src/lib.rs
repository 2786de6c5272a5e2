//! Map viewer service library.
//!
//! Serves a Leaflet page whose sidebar menu is built from a WMS
//! GetCapabilities document, tracks the selected overlay per page session,
//! and hands out WFS download links for the selected layer.

pub mod config;
pub mod download;
pub mod fetcher;
pub mod handlers;
pub mod menu;
pub mod metrics;
pub mod session;
pub mod sessions;
pub mod state;

use axum::{
    extract::Extension,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the HTTP router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Page
        .route("/", get(handlers::index_handler))
        .route("/static/viewer.js", get(handlers::viewer_js_handler))
        // Page API
        .route("/api/menu", get(handlers::menu_handler))
        .route("/api/select", post(handlers::select_handler))
        .route("/api/session", get(handlers::session_handler))
        .route("/api/overlay", delete(handlers::clear_overlay_handler))
        .route("/api/download/:format", get(handlers::download_handler))
        .route("/api/panel/toggle", post(handlers::toggle_panel_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/metrics", get(handlers::api_metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
