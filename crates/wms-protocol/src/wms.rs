//! WMS request URLs handed to the browser: capabilities, tiles, legends.

use serde::Serialize;

use crate::build_url;

/// Version used for the GetCapabilities request.
pub const CAPABILITIES_VERSION: &str = "1.3.0";

/// Version used for tile requests (Leaflet's WMS layer speaks 1.1.1 by default).
pub const DEFAULT_TILE_VERSION: &str = "1.1.1";

/// Legend rendering options understood by GeoServer.
pub const LEGEND_OPTIONS: &str = "dpi:120;forceLabels:on;fontAntiAliasing:true;countMatched:false;fontName:sans;hideEmptyRules:false;forceTitles:off";

/// GetCapabilities URL for a WMS endpoint.
pub fn capabilities_url(base_url: &str, version: &str) -> String {
    build_url(
        base_url,
        &[("service", "WMS"), ("version", version), ("request", "GetCapabilities")],
    )
}

/// Parameters of the WMS tile overlay for one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WmsTileParams {
    pub layers: String,
    pub format: String,
    pub transparent: bool,
    pub version: String,
}

impl WmsTileParams {
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layers: layer.into(),
            format: "image/png".to_string(),
            transparent: true,
            version: DEFAULT_TILE_VERSION.to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Base tile URL; the map client appends bbox/size per tile.
    pub fn url(&self, base_url: &str) -> String {
        let transparent = if self.transparent { "true" } else { "false" };
        build_url(
            base_url,
            &[
                ("service", "WMS"),
                ("layers", &self.layers),
                ("format", &self.format),
                ("transparent", transparent),
                ("version", &self.version),
            ],
        )
    }
}

/// GetLegendGraphic URL for a layer.
pub fn legend_url(base_url: &str, layer: &str) -> String {
    build_url(
        base_url,
        &[
            ("service", "WMS"),
            ("request", "GetLegendGraphic"),
            ("format", "image/png"),
            ("layer", layer),
            ("LEGEND_OPTIONS", LEGEND_OPTIONS),
        ],
    )
}

/// KML reflector link for a layer.
pub fn kml_url(base_url: &str, layer: &str) -> String {
    build_url(&format!("{}/kml", base_url.trim_end_matches('/')), &[("layers", layer)])
}

/// Per-layer OWS capabilities links ("virtual services").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoserviceLinks {
    pub wms: String,
    pub wfs: String,
}

/// Build the virtual-service links for a qualified layer name.
///
/// `workspace:layer` maps to `{root}/workspace/layer/ows`.
pub fn geoservice_links(geoserver_root: &str, layer: &str) -> GeoserviceLinks {
    let path = layer.replacen(':', "/", 1);
    let ows = format!("{}/{}/ows", geoserver_root.trim_end_matches('/'), path);
    GeoserviceLinks {
        wms: build_url(&ows, &[("service", "WMS"), ("request", "GetCapabilities")]),
        wfs: build_url(&ows, &[("service", "WFS"), ("request", "GetCapabilities")]),
    }
}
