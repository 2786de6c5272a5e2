//! Layer information card: title, abstract, metadata, legend, services.

use wms_common::{LayerRecord, NOT_AVAILABLE};
use wms_protocol::GeoserviceLinks;

use crate::escape::escape_html;

/// DOM id of the information card.
pub const LAYER_INFO_CARD_ID: &str = "layer-info-card";

pub struct LayerInfoView<'a> {
    pub layer: &'a LayerRecord,
    pub legend_url: &'a str,
    pub links: &'a GeoserviceLinks,
    /// KML reflector download for the layer.
    pub kml_url: &'a str,
}

pub fn render_layer_info(view: &LayerInfoView<'_>) -> String {
    let layer = view.layer;
    let mut html = format!(r#"<div id="{}" class="card shadow-sm">"#, LAYER_INFO_CARD_ID);
    html.push_str(r#"<div class="card-body">"#);
    html.push_str(&format!(
        r#"<h5 id="layerTitle" class="card-title">{}</h5>"#,
        escape_html(layer.display_title())
    ));
    html.push_str(&format!(
        r#"<p class="text-muted small mb-1"><code id="layerName">{}</code></p>"#,
        escape_html(&layer.name)
    ));
    html.push_str(&format!(
        r#"<p id="layerAbstract" class="card-text">{}</p>"#,
        escape_html(layer.abstract_or_default())
    ));

    match layer.metadata_url.as_deref() {
        Some(url) => html.push_str(&format!(
            r#"<p><a id="layerMetadataUrl" href="{}" target="_blank" rel="noopener"><i class="bi bi-file-earmark-text"></i> Metadata</a></p>"#,
            escape_html(url)
        )),
        None => html.push_str(&format!(
            r#"<p><span id="layerMetadataUrl" class="text-muted">Metadata: {}</span></p>"#,
            NOT_AVAILABLE
        )),
    }

    html.push_str(&format!(
        r#"<img id="layerLegend" class="img-fluid mb-2" alt="Legend" src="{}">"#,
        escape_html(view.legend_url)
    ));

    html.push_str(r#"<div id="geoservicesLinks">"#);
    html.push_str(&format!(
        r#"<a href="{}" target="_blank" rel="noopener" class="btn btn-outline-secondary btn-sm m-1"><i class="bi bi-globe"></i> WMS</a>"#,
        escape_html(&view.links.wms)
    ));
    html.push_str(&format!(
        r#"<a href="{}" target="_blank" rel="noopener" class="btn btn-outline-secondary btn-sm m-1"><i class="bi bi-vector-pen"></i> WFS</a>"#,
        escape_html(&view.links.wfs)
    ));
    html.push_str(&format!(
        r#"<a id="layerKml" href="{}" target="_blank" rel="noopener" class="btn btn-outline-secondary btn-sm m-1"><i class="bi bi-download"></i> KML</a>"#,
        escape_html(view.kml_url)
    ));
    html.push_str("</div></div></div>");
    html
}
