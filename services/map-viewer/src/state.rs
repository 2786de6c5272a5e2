//! Application state and shared resources.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;

use metrics_exporter_prometheus::PrometheusHandle;
use renderer::MenuRenderer;
use wms_common::ViewerResult;

use crate::config::ViewerConfig;
use crate::fetcher::CapabilitiesSource;
use crate::menu::{load_menu, MenuController, MenuState};
use crate::metrics::MetricsCollector;
use crate::session::OverlaySettings;
use crate::sessions::{SessionStore, SessionTemplate};

/// Shared application state.
pub struct AppState {
    pub config: ViewerConfig,
    pub menu: RwLock<MenuController>,
    pub sessions: SessionStore,
    pub metrics: Arc<MetricsCollector>,
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ViewerConfig, prometheus: Option<PrometheusHandle>) -> Self {
        let metrics = Arc::new(MetricsCollector::new());

        let template = SessionTemplate {
            overlay: OverlaySettings {
                wms_base_url: config.wms_base_url.clone(),
                tile_version: config.tile_version.clone(),
                attribution: config.overlay_attribution.clone(),
                max_zoom: config.overlay_max_zoom,
            },
            wfs_base_url: config.wfs_base_url.clone(),
            wfs_version: config.wfs_version,
            download_native_crs: config.download_native_crs,
            initial_layer: config.initial_layer.clone(),
        };
        let sessions = SessionStore::new(template, config.max_sessions, metrics.clone());

        let menu = MenuController::new(
            MenuRenderer::with_max_depth(config.max_menu_depth),
            config.menu_placement,
        );

        Self {
            config,
            menu: RwLock::new(menu),
            sessions,
            metrics,
            prometheus,
        }
    }

    /// Load the catalog into the menu.
    ///
    /// The fetch runs without holding the menu lock so the page keeps
    /// serving the spinner meanwhile.
    pub async fn load_menu(&self, source: &dyn CapabilitiesSource) -> ViewerResult<()> {
        let (renderer, placement) = {
            let menu = self.menu.read().await;
            (*menu.renderer(), menu.placement())
        };

        info!(source = %source.describe(), "Loading capabilities");
        let started = Instant::now();
        let outcome = load_menu(source, placement, &renderer).await;

        let mut menu = self.menu.write().await;
        let result = menu.finish(outcome);
        self.metrics.record_capabilities_load(
            started.elapsed(),
            result.is_ok(),
            menu.tree().layer_count(),
        );
        result
    }

    pub async fn menu_state(&self) -> MenuState {
        self.menu.read().await.state()
    }
}
