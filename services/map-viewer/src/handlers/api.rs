//! JSON endpoints used by the page script.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use renderer::{render_layer_info, LayerInfoView};
use wms_common::LayerRecord;
use wms_protocol::{geoservice_links, kml_url, legend_url, OutputFormat};

use super::ApiError;
use crate::menu::{ClickTarget, MenuState, SELECTION_FAILED_ALERT};
use crate::session::WmsOverlay;
use crate::sessions::{PageSession, PageSessionHandle};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub state: MenuState,
    /// Menu container contents; absent when the page has no container.
    pub html: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub overlay: Option<WmsOverlay>,
    pub selection: Option<LayerRecord>,
    pub panel_visible: bool,
    pub panel_html: String,
    pub info_html: Option<String>,
    /// User-facing message when the last action failed.
    pub alert: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub format: OutputFormat,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PanelResponse {
    pub visible: bool,
}

async fn session_response(
    state: &AppState,
    page: &PageSessionHandle,
    alert: Option<String>,
) -> SessionResponse {
    let session = page.lock().await;
    let info_html = session.selection().map(|layer| {
        let legend = legend_url(&state.config.wms_base_url, &layer.name);
        let links = geoservice_links(&state.config.geoserver_root, &layer.name);
        let kml = kml_url(&state.config.wms_base_url, &layer.name);
        render_layer_info(&LayerInfoView {
            layer,
            legend_url: &legend,
            links: &links,
            kml_url: &kml,
        })
    });

    SessionResponse {
        overlay: session.active_overlay().cloned(),
        selection: session.selection().cloned(),
        panel_visible: session.panel().is_visible(),
        panel_html: session.panel().render(),
        info_html,
        alert,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/menu - current menu state and container markup
pub async fn menu_handler(Extension(state): Extension<Arc<AppState>>) -> Json<MenuResponse> {
    state.metrics.record_api_request("menu");
    let menu = state.menu.read().await;
    Json(MenuResponse {
        state: menu.state(),
        html: menu.container_html().map(str::to_string),
        error: menu.error().map(str::to_string),
    })
}

/// POST /api/select - a click inside the menu container
#[instrument(skip(state, id), fields(session = %id.as_str()))]
pub async fn select_handler(
    Extension(state): Extension<Arc<AppState>>,
    id: PageSession,
    Json(target): Json<ClickTarget>,
) -> Json<SessionResponse> {
    state.metrics.record_api_request("select");
    let page = state.sessions.get_or_open(&id).await;
    let dispatch = {
        let menu = state.menu.read().await;
        menu.click_for(&target, &*page).await
    };

    let alert = match dispatch {
        Some(dispatch) if !dispatch.succeeded() => Some(SELECTION_FAILED_ALERT.to_string()),
        Some(dispatch) => {
            debug!(layer = %dispatch.selection.name, "Selection applied");
            None
        }
        None => None,
    };
    Json(session_response(&state, &page, alert).await)
}

/// GET /api/session - overlay, selection and panel of the calling page
pub async fn session_handler(
    Extension(state): Extension<Arc<AppState>>,
    id: PageSession,
) -> Json<SessionResponse> {
    state.metrics.record_api_request("session");
    let page = state.sessions.get_or_open(&id).await;
    Json(session_response(&state, &page, None).await)
}

/// GET /api/download/:format - WFS GetFeature URL for the selected layer
#[instrument(skip(state, id), fields(session = %id.as_str()))]
pub async fn download_handler(
    Extension(state): Extension<Arc<AppState>>,
    id: PageSession,
    Path(format): Path<String>,
) -> Result<Json<DownloadResponse>, ApiError> {
    state.metrics.record_api_request("download");
    let format: OutputFormat = format.parse()?;
    let page = state.sessions.get_or_open(&id).await;
    let url = page.lock().await.panel().download_url(format)?;
    state.metrics.record_download(format.slug());
    info!(format = format.slug(), url = %url, "Download requested");
    Ok(Json(DownloadResponse { format, url }))
}

/// POST /api/panel/toggle - show or hide the download card
pub async fn toggle_panel_handler(
    Extension(state): Extension<Arc<AppState>>,
    id: PageSession,
) -> Json<PanelResponse> {
    state.metrics.record_api_request("panel_toggle");
    let page = state.sessions.get_or_open(&id).await;
    let visible = page.lock().await.toggle_download_panel();
    debug!(visible, "Download panel toggled");
    Json(PanelResponse { visible })
}

/// DELETE /api/overlay - remove the active overlay
pub async fn clear_overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    id: PageSession,
) -> Result<Json<SessionResponse>, ApiError> {
    state.metrics.record_api_request("overlay_clear");
    let page = state.sessions.get_or_open(&id).await;
    page.lock().await.clear_overlay()?;
    Ok(Json(session_response(&state, &page, None).await))
}
