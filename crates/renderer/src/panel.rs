//! WFS download card markup.

use wms_protocol::OutputFormat;

use crate::escape::escape_html;

/// DOM id of the download card.
pub const DOWNLOAD_CARD_ID: &str = "wfs-downloader-card";

/// Title shown before any layer is picked.
pub const NO_LAYER_TITLE: &str = "Select a layer";

/// What the download card should currently show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPanelView<'a> {
    /// Selected layer title (or name); `None` before the first selection
    pub title: Option<&'a str>,
    pub visible: bool,
    /// Format buttons to show; empty hides them
    pub formats: &'a [OutputFormat],
    /// Raw data link, shown as its own button when present
    pub raw_data_url: Option<&'a str>,
}

/// Render the download card.
///
/// Format buttons carry `data-format`; the page script resolves them
/// through the download route so an unselected panel can alert instead of
/// navigating.
pub fn render_download_panel(view: &DownloadPanelView<'_>) -> String {
    let display = if view.visible { "block" } else { "none" };
    let title = escape_html(view.title.filter(|t| !t.is_empty()).unwrap_or(NO_LAYER_TITLE));

    let mut html = format!(
        r#"<div id="{}" class="card shadow-sm" style="display: {};">"#,
        DOWNLOAD_CARD_ID, display
    );
    html.push_str(&format!(
        r#"<div class="card-header"><h6 id="card-title" class="mb-0">{}</h6></div>"#,
        title
    ));
    html.push_str(r#"<div class="card-body">"#);

    for format in view.formats {
        html.push_str(&format!(
            r##"<a href="#" class="btn btn-primary btn-sm wfs-download-btn m-1" data-format="{}"><i class="bi {}"></i> {}</a>"##,
            format.slug(),
            format.icon(),
            format.label()
        ));
    }

    if let Some(url) = view.raw_data_url {
        html.push_str(&format!(
            r#"<a href="{}" target="_blank" rel="noopener" class="btn btn-secondary btn-sm wfs-dataurl-btn m-1"><i class="bi bi-file-earmark-zip"></i> DataURL</a>"#,
            escape_html(url)
        ));
    }

    html.push_str("</div></div>");
    html
}
