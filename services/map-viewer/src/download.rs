//! WFS download panel state.
//!
//! Tracks the layer the download buttons act on and whether the card is
//! shown. Layers that publish a direct data URL get a single raw-data button
//! instead of the WFS format buttons.

use serde::Serialize;
use tracing::{debug, warn};

use renderer::{render_download_panel, DownloadPanelView};
use wms_common::{ViewerError, ViewerResult};
use wms_protocol::{GetFeatureRequest, OutputFormat, WfsVersion};

/// The layer the panel currently offers downloads for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelLayer {
    pub name: String,
    pub title: String,
    pub data_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WfsDownloadPanel {
    wfs_base_url: String,
    version: WfsVersion,
    /// Ask the server to reproject downloads to EPSG:4326.
    reproject: bool,
    current: Option<PanelLayer>,
    visible: bool,
}

impl WfsDownloadPanel {
    pub fn new(wfs_base_url: impl Into<String>) -> Self {
        Self {
            wfs_base_url: wfs_base_url.into(),
            version: WfsVersion::default(),
            reproject: true,
            current: None,
            visible: false,
        }
    }

    pub fn with_version(mut self, version: WfsVersion) -> Self {
        self.version = version;
        self
    }

    /// Download features in the layer's native CRS.
    pub fn with_native_crs(mut self) -> Self {
        self.reproject = false;
        self
    }

    /// Point the panel at a new layer and show it.
    ///
    /// `data_url` must already be normalized (no "null"/"semData" sentinels).
    pub fn update_layer(&mut self, name: &str, title: &str, data_url: Option<&str>) {
        if name.is_empty() {
            warn!("Layer name is missing, download panel not updated");
            return;
        }
        self.current = Some(PanelLayer {
            name: name.to_string(),
            title: title.to_string(),
            data_url: data_url.map(str::to_string),
        });
        debug!(layer = name, has_data_url = data_url.is_some(), "Download panel updated");
        self.set_visible(true);
    }

    pub fn current(&self) -> Option<&PanelLayer> {
        self.current.as_ref()
    }

    /// GetFeature URL for the current layer.
    pub fn download_url(&self, format: OutputFormat) -> ViewerResult<String> {
        let layer = self.current.as_ref().ok_or(ViewerError::NoLayerSelected)?;
        let mut request = GetFeatureRequest::new(layer.name.as_str(), format).with_version(self.version);
        if !self.reproject {
            request = request.without_srs();
        }
        Ok(request.url(&self.wfs_base_url))
    }

    pub fn raw_data_url(&self) -> Option<&str> {
        self.current.as_ref().and_then(|l| l.data_url.as_deref())
    }

    /// Format buttons to show: none when a raw data URL replaces them.
    pub fn visible_formats(&self) -> &'static [OutputFormat] {
        if self.raw_data_url().is_some() {
            &[]
        } else {
            &OutputFormat::ALL
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Flip visibility (Ctrl+D). Returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn view(&self) -> DownloadPanelView<'_> {
        DownloadPanelView {
            title: self.current.as_ref().map(|l| {
                if l.title.is_empty() {
                    l.name.as_str()
                } else {
                    l.title.as_str()
                }
            }),
            visible: self.visible,
            formats: self.visible_formats(),
            raw_data_url: self.raw_data_url(),
        }
    }

    pub fn render(&self) -> String {
        render_download_panel(&self.view())
    }
}
