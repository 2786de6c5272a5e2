//! Map session: the single active WMS overlay and the selected layer.
//!
//! At most one overlay is attached at a time. Selecting a layer removes the
//! previous overlay before adding the new one, so a failure part way leaves
//! either the old overlay or nothing, never both. The download panel is
//! shown while an overlay is attached and hidden when it goes away.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use wms_common::{LayerRecord, ViewerError, ViewerResult};
use wms_protocol::WmsTileParams;

use crate::download::WfsDownloadPanel;
use crate::menu::{LayerSelection, LayerSelectionListener};
use crate::metrics::MetricsCollector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OverlayId(pub u64);

/// A WMS tile overlay as handed to the map client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WmsOverlay {
    pub id: OverlayId,
    pub layer: String,
    pub base_url: String,
    pub params: WmsTileParams,
    pub tile_url: String,
    pub attribution: String,
    pub max_zoom: u8,
}

/// How overlays are built for this server.
#[derive(Debug, Clone)]
pub struct OverlaySettings {
    pub wms_base_url: String,
    pub tile_version: String,
    pub attribution: String,
    pub max_zoom: u8,
}

/// The surface overlays are attached to.
pub trait MapSurface: Send {
    fn add_overlay(&mut self, overlay: &WmsOverlay) -> ViewerResult<()>;
    fn remove_overlay(&mut self, id: OverlayId) -> ViewerResult<()>;
    fn has_overlay(&self, id: OverlayId) -> bool;
    fn overlay_count(&self) -> usize;
}

/// Server-side record of the overlays the page should display.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    attached: Vec<WmsOverlay>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(&self) -> &[WmsOverlay] {
        &self.attached
    }
}

impl MapSurface for OverlayRegistry {
    fn add_overlay(&mut self, overlay: &WmsOverlay) -> ViewerResult<()> {
        if self.has_overlay(overlay.id) {
            return Err(ViewerError::Internal(format!("overlay {} already attached", overlay.id.0)));
        }
        self.attached.push(overlay.clone());
        Ok(())
    }

    fn remove_overlay(&mut self, id: OverlayId) -> ViewerResult<()> {
        let before = self.attached.len();
        self.attached.retain(|o| o.id != id);
        if self.attached.len() == before {
            return Err(ViewerError::Internal(format!("overlay {} is not attached", id.0)));
        }
        Ok(())
    }

    fn has_overlay(&self, id: OverlayId) -> bool {
        self.attached.iter().any(|o| o.id == id)
    }

    fn overlay_count(&self) -> usize {
        self.attached.len()
    }
}

pub struct MapSession<M: MapSurface> {
    map: M,
    settings: OverlaySettings,
    active: Option<WmsOverlay>,
    selection: Option<LayerRecord>,
    panel: WfsDownloadPanel,
    next_id: u64,
}

pub type ServerSession = MapSession<OverlayRegistry>;

impl<M: MapSurface> MapSession<M> {
    pub fn new(map: M, settings: OverlaySettings, panel: WfsDownloadPanel) -> Self {
        Self {
            map,
            settings,
            active: None,
            selection: None,
            panel,
            next_id: 1,
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn active_overlay(&self) -> Option<&WmsOverlay> {
        self.active.as_ref()
    }

    pub fn selection(&self) -> Option<&LayerRecord> {
        self.selection.as_ref()
    }

    pub fn panel(&self) -> &WfsDownloadPanel {
        &self.panel
    }

    /// Replace the overlay with `selection` and point the panel at it.
    ///
    /// An empty name does nothing.
    pub fn select_layer(&mut self, selection: &LayerSelection) -> ViewerResult<()> {
        if selection.name.trim().is_empty() {
            debug!("Empty layer name, selection ignored");
            return Ok(());
        }

        if let Err(e) = self.swap_overlay(&selection.name) {
            error!(layer = %selection.name, error = %e, "Error updating layer");
            return Err(ViewerError::Selection(e.to_string()));
        }

        let record = selection.to_record();
        self.panel
            .update_layer(&record.name, record.display_title(), record.data_url.as_deref());
        info!(layer = %record.name, title = %record.title, "Layer selected");
        self.selection = Some(record);
        Ok(())
    }

    /// Attach the start-up overlay without selecting it.
    pub fn show_initial_layer(&mut self, name: &str) -> ViewerResult<()> {
        self.swap_overlay(name)
    }

    /// Detach the active overlay, if any.
    pub fn clear_overlay(&mut self) -> ViewerResult<()> {
        if let Some(active) = self.active.take() {
            if let Err(e) = self.map.remove_overlay(active.id) {
                self.active = Some(active);
                return Err(e);
            }
            self.on_overlay_removed();
        }
        Ok(())
    }

    /// Ctrl+D. Returns the new visibility.
    pub fn toggle_download_panel(&mut self) -> bool {
        self.panel.toggle()
    }

    fn swap_overlay(&mut self, name: &str) -> ViewerResult<()> {
        if let Some(previous) = self.active.take() {
            if self.map.has_overlay(previous.id) {
                if let Err(e) = self.map.remove_overlay(previous.id) {
                    // Still attached, keep tracking it.
                    self.active = Some(previous);
                    return Err(e);
                }
            }
            self.on_overlay_removed();
        }

        let overlay = self.build_overlay(name);
        self.map.add_overlay(&overlay)?;
        debug!(layer = name, id = overlay.id.0, "Overlay attached");
        self.active = Some(overlay);
        self.on_overlay_added();
        Ok(())
    }

    fn build_overlay(&mut self, name: &str) -> WmsOverlay {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        let params = WmsTileParams::new(name).with_version(self.settings.tile_version.as_str());
        WmsOverlay {
            id,
            layer: name.to_string(),
            base_url: self.settings.wms_base_url.clone(),
            tile_url: params.url(&self.settings.wms_base_url),
            params,
            attribution: self.settings.attribution.clone(),
            max_zoom: self.settings.max_zoom,
        }
    }

    fn on_overlay_added(&mut self) {
        self.panel.set_visible(true);
    }

    fn on_overlay_removed(&mut self) {
        self.panel.set_visible(false);
    }
}

/// A session shared between request handlers and the menu.
pub struct SharedSession<M: MapSurface> {
    inner: Mutex<MapSession<M>>,
    metrics: Arc<MetricsCollector>,
}

impl<M: MapSurface> SharedSession<M> {
    pub fn new(session: MapSession<M>, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            inner: Mutex::new(session),
            metrics,
        }
    }

    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, MapSession<M>> {
        self.inner.lock().await
    }
}

#[async_trait]
impl<M: MapSurface + 'static> LayerSelectionListener for SharedSession<M> {
    async fn layer_selected(&self, selection: &LayerSelection) -> ViewerResult<()> {
        let result = self.inner.lock().await.select_layer(selection);
        self.metrics.record_selection(result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMS: &str = "https://geo.example.org/geoserver/wms";

    fn settings() -> OverlaySettings {
        OverlaySettings {
            wms_base_url: WMS.to_string(),
            tile_version: "1.1.1".to_string(),
            attribution: "IDESEFIN".to_string(),
            max_zoom: 22,
        }
    }

    fn session() -> ServerSession {
        MapSession::new(
            OverlayRegistry::new(),
            settings(),
            WfsDownloadPanel::new("https://geo.example.org/geoserver/wfs"),
        )
    }

    fn pick(name: &str, title: &str) -> LayerSelection {
        LayerSelection {
            name: name.to_string(),
            title: title.to_string(),
            record: None,
        }
    }

    /// Surface that can be told to refuse adds or removes.
    #[derive(Default)]
    struct FlakyMap {
        inner: OverlayRegistry,
        fail_add: bool,
        fail_remove: bool,
    }

    impl MapSurface for FlakyMap {
        fn add_overlay(&mut self, overlay: &WmsOverlay) -> ViewerResult<()> {
            if self.fail_add {
                return Err(ViewerError::Internal("tile layer rejected".to_string()));
            }
            self.inner.add_overlay(overlay)
        }

        fn remove_overlay(&mut self, id: OverlayId) -> ViewerResult<()> {
            if self.fail_remove {
                return Err(ViewerError::Internal("remove rejected".to_string()));
            }
            self.inner.remove_overlay(id)
        }

        fn has_overlay(&self, id: OverlayId) -> bool {
            self.inner.has_overlay(id)
        }

        fn overlay_count(&self) -> usize {
            self.inner.overlay_count()
        }
    }

    #[test]
    fn test_select_attaches_overlay_and_updates_panel() {
        let mut session = session();
        session.select_layer(&pick("ZONE:A", "Zona A")).unwrap();

        let overlay = session.active_overlay().unwrap();
        assert_eq!(overlay.layer, "ZONE:A");
        assert_eq!(overlay.params.version, "1.1.1");
        assert!(overlay.tile_url.starts_with(WMS));
        assert_eq!(session.map().overlay_count(), 1);
        assert_eq!(session.selection().unwrap().title, "Zona A");
        assert_eq!(session.panel().current().unwrap().name, "ZONE:A");
        assert!(session.panel().is_visible());
    }

    #[test]
    fn test_second_selection_replaces_first() {
        let mut session = session();
        session.select_layer(&pick("a", "A")).unwrap();
        session.select_layer(&pick("b", "B")).unwrap();

        assert_eq!(session.map().overlay_count(), 1);
        assert_eq!(session.map().attached()[0].layer, "b");
        assert_eq!(session.selection().unwrap().name, "b");
    }

    #[test]
    fn test_reselecting_same_layer_keeps_one_overlay() {
        let mut session = session();
        session.select_layer(&pick("a", "A")).unwrap();
        session.select_layer(&pick("a", "A")).unwrap();
        assert_eq!(session.map().overlay_count(), 1);
    }

    #[test]
    fn test_empty_name_is_noop() {
        let mut session = session();
        session.select_layer(&pick("a", "A")).unwrap();
        session.select_layer(&pick("", "Nothing")).unwrap();
        assert_eq!(session.active_overlay().unwrap().layer, "a");
        assert_eq!(session.selection().unwrap().name, "a");
    }

    #[test]
    fn test_failed_add_leaves_no_overlay() {
        let mut session = MapSession::new(
            FlakyMap::default(),
            settings(),
            WfsDownloadPanel::new("http://wfs"),
        );
        session.select_layer(&pick("a", "A")).unwrap();

        session.map.fail_add = true;
        let err = session.select_layer(&pick("b", "B")).unwrap_err();
        assert!(matches!(err, ViewerError::Selection(_)));
        assert_eq!(session.map().overlay_count(), 0);
        assert!(session.active_overlay().is_none());
        // The previous selection stays in the slot.
        assert_eq!(session.selection().unwrap().name, "a");
        assert!(!session.panel().is_visible());
    }

    #[test]
    fn test_failed_remove_keeps_old_overlay_only() {
        let mut session = MapSession::new(
            FlakyMap::default(),
            settings(),
            WfsDownloadPanel::new("http://wfs"),
        );
        session.select_layer(&pick("a", "A")).unwrap();

        session.map.fail_remove = true;
        assert!(session.select_layer(&pick("b", "B")).is_err());
        assert_eq!(session.map().overlay_count(), 1);
        assert_eq!(session.active_overlay().unwrap().layer, "a");

        // Once removal works again the tracked overlay is swapped out.
        session.map.fail_remove = false;
        session.select_layer(&pick("b", "B")).unwrap();
        assert_eq!(session.map().overlay_count(), 1);
        assert_eq!(session.active_overlay().unwrap().layer, "b");
    }

    #[test]
    fn test_panel_follows_overlay() {
        let mut session = session();
        session.show_initial_layer("LIMITES:limite").unwrap();
        assert!(session.panel().is_visible());
        assert!(session.panel().current().is_none());
        assert!(session.selection().is_none());

        session.clear_overlay().unwrap();
        assert!(!session.panel().is_visible());
        assert_eq!(session.map().overlay_count(), 0);
    }

    #[test]
    fn test_toggle_panel() {
        let mut session = session();
        assert!(session.toggle_download_panel());
        assert!(!session.toggle_download_panel());
    }

    #[test]
    fn test_selection_keeps_catalog_data_url() {
        let mut session = session();
        let selection = LayerSelection {
            name: "USO:uso".to_string(),
            title: "Uso".to_string(),
            record: Some(LayerRecord::new("USO:uso", "Uso").with_data_url("https://d/x.zip")),
        };
        session.select_layer(&selection).unwrap();
        assert_eq!(session.panel().raw_data_url(), Some("https://d/x.zip"));
    }

    #[tokio::test]
    async fn test_shared_session_as_listener() {
        let metrics = Arc::new(MetricsCollector::new());
        let shared = SharedSession::new(session(), metrics.clone());
        shared.layer_selected(&pick("a", "A")).await.unwrap();
        shared.layer_selected(&pick("b", "B")).await.unwrap();

        let guard = shared.lock().await;
        assert_eq!(guard.map().overlay_count(), 1);
        assert_eq!(metrics.snapshot().selections, 2);
    }
}
