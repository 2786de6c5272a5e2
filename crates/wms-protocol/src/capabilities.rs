//! WMS GetCapabilities parsing and menu tree construction.
//!
//! Works on both WMS 1.1.1 and 1.3.0 documents. Element names are matched on
//! their local part, so `<wms:Layer>` and `<Layer>` are treated alike.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use quick_xml::name::QName;
use wms_common::{
    menu_path, LayerRecord, MenuNode, MenuPlacement, ViewerError, ViewerResult, MENU_KEYWORD_PREFIX,
};

/// `type` attribute of the metadata link we expose.
pub const ISO_METADATA_TYPE: &str = "ISO19115:2003";

/// A nested layer as read from the document, before menu filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitiesLayer {
    pub record: LayerRecord,
    pub keywords: Vec<String>,
}

impl CapabilitiesLayer {
    /// Keywords with the `menu_` prefix, in document order.
    ///
    /// A keyword with no segment after the prefix (`menu_`) is still
    /// returned; it places the layer nowhere.
    pub fn menu_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(|k| k.starts_with(MENU_KEYWORD_PREFIX))
    }
}

/// Fields collected for one open `<Layer>` element.
#[derive(Default)]
struct LayerFrame {
    order: usize,
    nested: bool,
    name: Option<String>,
    title: Option<String>,
    abstract_text: Option<String>,
    keywords: Vec<String>,
    metadata_url: Option<String>,
    data_url: Option<String>,
}

impl LayerFrame {
    fn into_layer(self) -> CapabilitiesLayer {
        let mut record = LayerRecord::new(self.name.unwrap_or_default(), self.title.unwrap_or_default());
        if let Some(text) = self.abstract_text {
            record = record.with_abstract(text);
        }
        if let Some(url) = self.metadata_url {
            record = record.with_metadata_url(url);
        }
        if let Some(url) = self.data_url {
            record = record.with_data_url(url);
        }
        CapabilitiesLayer {
            record,
            keywords: self.keywords,
        }
    }
}

/// Extract every `Layer` that is a child of another `Layer`.
///
/// The root container layer is skipped. Empty input yields no layers;
/// input that is not well-formed XML yields `ViewerError::Parse`.
pub fn parse_layers(xml: &str) -> ViewerResult<Vec<CapabilitiesLayer>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut frames: Vec<LayerFrame> = Vec::new();
    let mut finished: Vec<(usize, CapabilitiesLayer)> = Vec::new();
    let mut next_order = 0;
    let mut text = String::new();
    let mut in_iso_metadata = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                text.clear();
                match name.as_str() {
                    "Layer" => {
                        frames.push(LayerFrame {
                            order: next_order,
                            nested: parent_is(&stack, "Layer"),
                            ..Default::default()
                        });
                        next_order += 1;
                    }
                    "MetadataURL" if parent_is(&stack, "Layer") => {
                        in_iso_metadata = plain_attribute(&e, b"type")?.as_deref() == Some(ISO_METADATA_TYPE);
                    }
                    "OnlineResource" => record_online_resource(&e, &stack, in_iso_metadata, &mut frames)?,
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() {
                    // A self-closing root element is a complete (empty) document.
                    continue;
                }
                if local_name(&e) == "OnlineResource" {
                    record_online_resource(&e, &stack, in_iso_metadata, &mut frames)?;
                }
            }
            Ok(Event::Text(t)) => {
                let value = t.unescape().map_err(|e| {
                    ViewerError::Parse(format!("bad text at position {}: {}", reader.buffer_position(), e))
                })?;
                if stack.is_empty() {
                    return Err(ViewerError::Parse(format!(
                        "content outside the root element at position {}",
                        reader.buffer_position()
                    )));
                }
                text.push_str(&value);
            }
            Ok(Event::CData(c)) => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.pop();
                let value = text.trim().to_string();
                text.clear();

                match name.as_str() {
                    "Name" | "Title" | "Abstract" if parent_is(&stack, "Layer") => {
                        if let Some(frame) = frames.last_mut() {
                            let slot = match name.as_str() {
                                "Name" => &mut frame.name,
                                "Title" => &mut frame.title,
                                _ => &mut frame.abstract_text,
                            };
                            if slot.is_none() {
                                *slot = Some(value);
                            }
                        }
                    }
                    "Keyword" if parent_is(&stack, "KeywordList") && grandparent_is(&stack, "Layer") => {
                        if let Some(frame) = frames.last_mut() {
                            frame.keywords.push(value);
                        }
                    }
                    "MetadataURL" => in_iso_metadata = false,
                    "Layer" => {
                        if let Some(frame) = frames.pop() {
                            if frame.nested {
                                finished.push((frame.order, frame.into_layer()));
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ViewerError::Parse(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ViewerError::Parse(format!("unexpected end of document inside <{}>", open)));
    }

    finished.sort_by_key(|(order, _)| *order);
    Ok(finished.into_iter().map(|(_, layer)| layer).collect())
}

/// Group layers into a tree keyed by their `menu_` keywords.
///
/// Layers without a menu keyword are left out. With `MenuPlacement::First`
/// only the first menu keyword counts, even when it has no segments; the
/// layer is then left out rather than placed by a later keyword.
pub fn build_menu_tree(layers: Vec<CapabilitiesLayer>, placement: MenuPlacement) -> MenuNode {
    let mut root = MenuNode::root();
    let mut omitted = 0usize;

    for layer in layers {
        let paths: Vec<Vec<&str>> = match placement {
            MenuPlacement::First => layer.menu_keywords().take(1).filter_map(menu_path).collect(),
            MenuPlacement::All => layer.menu_keywords().filter_map(menu_path).collect(),
        };

        if paths.is_empty() {
            omitted += 1;
            continue;
        }

        for path in paths {
            if let Err(e) = root.insert(path.as_slice(), layer.record.clone()) {
                warn!(layer = %layer.record.name, error = %e, "Skipping menu placement");
            }
        }
    }

    debug!(
        nodes = root.node_count(),
        layers = root.layer_count(),
        omitted = omitted,
        "Built menu tree"
    );
    root
}

/// Parse a capabilities document straight into a menu tree.
pub fn process_capabilities(xml: &str, placement: MenuPlacement) -> ViewerResult<MenuNode> {
    let layers = parse_layers(xml)?;
    Ok(build_menu_tree(layers, placement))
}

fn record_online_resource(
    e: &BytesStart<'_>,
    stack: &[String],
    in_iso_metadata: bool,
    frames: &mut [LayerFrame],
) -> ViewerResult<()> {
    let Some(frame) = frames.last_mut() else {
        return Ok(());
    };
    // The link must belong to a MetadataURL/DataURL that is a direct child of a Layer.
    if !grandparent_is(stack, "Layer") {
        return Ok(());
    }

    if parent_is(stack, "MetadataURL") && in_iso_metadata && frame.metadata_url.is_none() {
        frame.metadata_url = href_attribute(e)?;
    } else if parent_is(stack, "DataURL") && frame.data_url.is_none() {
        frame.data_url = href_attribute(e)?;
    }
    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Unprefixed attribute `key`; `xlink:type` does not match `type`.
fn plain_attribute(e: &BytesStart<'_>, key: &[u8]) -> ViewerResult<Option<String>> {
    find_attribute(e, |name| name.as_ref() == key)
}

/// Link target, written `xlink:href` or under any other prefix.
fn href_attribute(e: &BytesStart<'_>) -> ViewerResult<Option<String>> {
    find_attribute(e, |name| name.local_name().as_ref() == b"href")
}

fn find_attribute<F>(e: &BytesStart<'_>, matches: F) -> ViewerResult<Option<String>>
where
    F: Fn(QName<'_>) -> bool,
{
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ViewerError::Parse(format!("bad attribute: {}", err)))?;
        if matches(attr.key) {
            let value = attr
                .unescape_value()
                .map_err(|err| ViewerError::Parse(format!("bad attribute value: {}", err)))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parent_is(stack: &[String], name: &str) -> bool {
    stack.last().map(String::as_str) == Some(name)
}

fn grandparent_is(stack: &[String], name: &str) -> bool {
    stack.len() >= 2 && stack[stack.len() - 2] == name
}
