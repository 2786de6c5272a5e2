//! OGC WMS/WFS client-side protocol support.
//!
//! Supports:
//! - WMS 1.1.1 and 1.3.0 GetCapabilities parsing into a menu tree
//! - WMS tile, legend and KML URLs
//! - WFS 1.1.0 / 2.0.0 GetFeature download URLs

pub mod capabilities;
pub mod wfs;
pub mod wms;

pub use capabilities::{build_menu_tree, parse_layers, process_capabilities, CapabilitiesLayer};
pub use wfs::{GetFeatureRequest, OutputFormat, WfsVersion};
pub use wms::{capabilities_url, geoservice_links, kml_url, legend_url, GeoserviceLinks, WmsTileParams};

/// Append form-encoded query parameters to a base URL.
pub fn build_url(base_url: &str, params: &[(&str, &str)]) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        return base_url.to_string();
    }
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", base_url, separator, query)
}
