//! Page shell and script.

use axum::{
    extract::Extension,
    http::header,
    response::{Html, IntoResponse},
};
use std::sync::Arc;
use tracing::debug;

use renderer::{render_page, PageSettings};

use crate::state::AppState;

/// Client script driving the map and the menu container.
pub const VIEWER_JS: &str = include_str!("../../static/viewer.js");

/// GET / - the viewer page with the current menu container contents
///
/// Each load opens a new page session; a reload starts with no selection.
pub async fn index_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    state.metrics.record_page_request();
    let (id, _) = state.sessions.open().await;
    debug!(session = id.as_str(), "Page session opened");

    let settings = PageSettings {
        session_id: Some(id.0),
        ..state.config.page_settings()
    };
    let menu = state.menu.read().await;
    let menu_html = menu.container_html().unwrap_or_default();
    Html(render_page(&settings, menu_html))
}

/// GET /static/viewer.js
pub async fn viewer_js_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        VIEWER_JS,
    )
}
