//! HTTP request handlers.
//!
//! - `viewer`: the page shell and its script
//! - `api`: menu, selection, session and download endpoints used by the page
//! - `health`: health, readiness and metrics

pub mod api;
pub mod health;
pub mod viewer;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

use wms_common::ViewerError;

pub use api::{
    clear_overlay_handler, download_handler, menu_handler, select_handler, session_handler,
    toggle_panel_handler,
};
pub use health::{api_metrics_handler, health_handler, metrics_handler, ready_handler};
pub use viewer::{index_handler, viewer_js_handler};

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    error: String,
}

/// JSON error response wrapping a [`ViewerError`].
#[derive(Debug)]
pub struct ApiError(pub ViewerError);

impl From<ViewerError> for ApiError {
    fn from(err: ViewerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(kind = self.0.kind(), error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            kind: self.0.kind(),
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
