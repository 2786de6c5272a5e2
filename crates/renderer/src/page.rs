//! Viewer page shell.
//!
//! Emits the fixed containers the page script works against
//! (`map`, `menu-container`, the download card slot and the layer info
//! slot) plus the map settings as an inline JSON blob.

use serde::Serialize;

use crate::escape::escape_html;

/// Map settings handed to the page script.
#[derive(Debug, Clone, Serialize)]
pub struct PageSettings {
    pub title: String,
    pub center: [f64; 2],
    pub zoom: u8,
    pub basemap_url: String,
    pub basemap_attribution: String,
    pub basemap_subdomains: String,
    pub basemap_max_zoom: u8,
    /// Page session id the script sends back on every API call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Render the full HTML document for the viewer.
pub fn render_page(settings: &PageSettings, menu_html: &str) -> String {
    let json = serde_json::to_string(settings)
        .unwrap_or_else(|_| "{}".to_string())
        // Keep the JSON from closing the surrounding <script>.
        .replace("</", "<\\/");

    format!(
        r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css">
<style>
html, body {{ height: 100%; margin: 0; }}
#layout {{ display: flex; height: 100%; }}
#sidebar {{ width: 340px; overflow-y: auto; padding: .75rem; }}
#map {{ flex: 1; }}
#download-card-slot {{ position: absolute; right: 1rem; bottom: 1.5rem; z-index: 1000; min-width: 220px; }}
</style>
</head>
<body>
<div id="layout">
  <aside id="sidebar">
    <h1 class="h5">{title}</h1>
    <div class="accordion" id="accordionMenu">
      <div id="menu-container">{menu}</div>
    </div>
    <div id="layer-info-slot" class="mt-3"></div>
  </aside>
  <div id="map"></div>
</div>
<div id="download-card-slot"></div>
<script id="viewer-settings" type="application/json">{json}</script>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js"></script>
<script type="module" src="/static/viewer.js"></script>
</body>
</html>
"##,
        title = escape_html(&settings.title),
        menu = menu_html,
        json = json
    )
}
