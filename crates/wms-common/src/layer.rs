//! Layer records extracted from a WMS capabilities document.

use serde::{Deserialize, Serialize};

/// Displayed when a layer has no abstract or no ISO metadata link.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel used by the catalog for "this layer has no downloadable data URL".
pub const NO_DATA_URL: &str = "semData";

/// One catalog layer, as advertised by the map server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Server-unique identifier, e.g. "LIMITES_ADMINISTRATIVOS:bairros"
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Optional description/abstract
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,

    /// ISO 19115:2003 metadata link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_url: Option<String>,

    /// Direct link to the raw data package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
}

impl LayerRecord {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            abstract_text: None,
            metadata_url: None,
            data_url: None,
        }
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = non_empty(text.into());
        self
    }

    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = non_empty(url.into());
        self
    }

    /// Set the data URL. Empty strings and the literal "null" (any case)
    /// mean there is no data URL.
    pub fn with_data_url(mut self, url: impl Into<String>) -> Self {
        self.data_url = normalize_data_url(&url.into());
        self
    }

    /// Title shown in menus; falls back to the layer name.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    pub fn abstract_or_default(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    pub fn metadata_url_or_default(&self) -> &str {
        self.metadata_url.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Data URL, or the `semData` sentinel when there is none.
    pub fn data_url_or_sentinel(&self) -> &str {
        self.data_url.as_deref().unwrap_or(NO_DATA_URL)
    }

    /// Split a qualified name like "ZONE:A" into (workspace, layer).
    pub fn split_name(&self) -> (Option<&str>, &str) {
        match self.name.split_once(':') {
            Some((workspace, layer)) => (Some(workspace), layer),
            None => (None, &self.name),
        }
    }
}

/// Map a raw `xlink:href` value to a data URL.
pub fn normalize_data_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed == NO_DATA_URL
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
