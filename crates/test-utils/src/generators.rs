//! Generators for synthetic capabilities documents.
//!
//! Useful when a test needs a catalog shape that the fixed fixtures don't
//! cover, e.g. deep menu paths or many layers sharing one node.

/// A layer entry to emit.
#[derive(Debug, Clone, Default)]
pub struct LayerSpec {
    pub name: String,
    pub title: String,
    pub keywords: Vec<String>,
    pub data_url: Option<String>,
    pub metadata_url: Option<String>,
}

impl LayerSpec {
    pub fn new(name: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn keyword(mut self, keyword: &str) -> Self {
        self.keywords.push(keyword.to_string());
        self
    }

    pub fn data_url(mut self, url: &str) -> Self {
        self.data_url = Some(url.to_string());
        self
    }

    pub fn metadata_url(mut self, url: &str) -> Self {
        self.metadata_url = Some(url.to_string());
        self
    }
}

/// Builds a WMS 1.3.0 capabilities document with the given nested layers.
///
/// Text content is XML-escaped, so arbitrary titles can be used.
///
/// # Example
///
/// ```
/// use test_utils::{capabilities_document, LayerSpec};
///
/// let xml = capabilities_document(&[LayerSpec::new("a", "A").keyword("menu_x")]);
/// assert!(xml.contains("<Keyword>menu_x</Keyword>"));
/// ```
pub fn capabilities_document(layers: &[LayerSpec]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <WMS_Capabilities version=\"1.3.0\" xmlns=\"http://www.opengis.net/wms\" \
         xmlns:xlink=\"http://www.w3.org/1999/xlink\">\n<Capability>\n<Layer>\n<Title>Generated</Title>\n",
    );

    for layer in layers {
        xml.push_str("<Layer queryable=\"1\">\n");
        xml.push_str(&format!("<Name>{}</Name>\n", escape_xml(&layer.name)));
        xml.push_str(&format!("<Title>{}</Title>\n", escape_xml(&layer.title)));
        if !layer.keywords.is_empty() {
            xml.push_str("<KeywordList>");
            for keyword in &layer.keywords {
                xml.push_str(&format!("<Keyword>{}</Keyword>", escape_xml(keyword)));
            }
            xml.push_str("</KeywordList>\n");
        }
        if let Some(url) = &layer.metadata_url {
            xml.push_str(&format!(
                "<MetadataURL type=\"ISO19115:2003\"><OnlineResource xlink:href=\"{}\"/></MetadataURL>\n",
                escape_xml(url)
            ));
        }
        if let Some(url) = &layer.data_url {
            xml.push_str(&format!(
                "<DataURL><OnlineResource xlink:href=\"{}\"/></DataURL>\n",
                escape_xml(url)
            ));
        }
        xml.push_str("</Layer>\n");
    }

    xml.push_str("</Layer>\n</Capability>\n</WMS_Capabilities>\n");
    xml
}

/// A `menu_` keyword `depth` segments deep: `menu_l0_l1_..`.
pub fn deep_menu_keyword(depth: usize) -> String {
    let segments: Vec<String> = (0..depth).map(|i| format!("l{}", i)).collect();
    format!("menu_{}", segments.join("_"))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
