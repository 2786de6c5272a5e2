//! Navigation tree built from `menu_*` layer keywords.
//!
//! A keyword such as `menu_Cartografia Base_Quadras` places a layer at the
//! path `["Cartografia Base", "Quadras"]` below a synthetic root node.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{LayerRecord, ViewerError, ViewerResult};

/// Name of the synthetic root node.
pub const ROOT_NODE: &str = "root";

/// Prefix that marks a keyword as a menu placement.
pub const MENU_KEYWORD_PREFIX: &str = "menu_";

/// How layers carrying several menu keywords are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuPlacement {
    /// Only the first menu keyword is used
    #[default]
    First,
    /// The layer appears under every menu keyword
    All,
}

/// A node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    pub name: String,
    pub children: BTreeMap<String, MenuNode>,
    pub layers: Vec<LayerRecord>,
}

impl MenuNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: BTreeMap::new(),
            layers: Vec::new(),
        }
    }

    /// Empty tree rooted at the synthetic `root` node.
    pub fn root() -> Self {
        Self::new(ROOT_NODE)
    }

    pub fn is_root(&self) -> bool {
        self.name == ROOT_NODE
    }

    /// True when the tree holds neither children nor layers.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.layers.is_empty()
    }

    /// Attach `layer` at `path`, creating intermediate nodes.
    ///
    /// Empty segments are skipped; a path without any segment is rejected.
    pub fn insert<S: AsRef<str>>(&mut self, path: &[S], layer: LayerRecord) -> ViewerResult<()> {
        let segments: Vec<&str> = path
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(ViewerError::InvalidParameter {
                param: "menu path".to_string(),
                message: format!("layer '{}' has an empty menu path", layer.name),
            });
        }

        let mut node = self;
        for segment in segments {
            node = node
                .children
                .entry(segment.to_string())
                .or_insert_with(|| MenuNode::new(segment));
        }
        node.layers.push(layer);
        Ok(())
    }

    /// Node reached by following `path` from this node.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&MenuNode> {
        path.iter()
            .try_fold(self, |node, segment| node.children.get(segment.as_ref()))
    }

    /// First layer with the given name, depth-first.
    pub fn find_layer(&self, name: &str) -> Option<&LayerRecord> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .or_else(|| self.children.values().find_map(|c| c.find_layer(name)))
    }

    pub fn contains_layer(&self, name: &str) -> bool {
        self.find_layer(name).is_some()
    }

    /// Total number of layer entries in this subtree.
    pub fn layer_count(&self) -> usize {
        self.layers.len() + self.children.values().map(MenuNode::layer_count).sum::<usize>()
    }

    /// Number of nodes below this one.
    pub fn node_count(&self) -> usize {
        self.children.values().map(|c| 1 + c.node_count()).sum()
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
        let indent = "  ".repeat(level);
        if !self.is_root() {
            writeln!(f, "{}{}", indent, self.name)?;
        }
        for layer in &self.layers {
            writeln!(f, "{}  - {} ({})", indent, layer.display_title(), layer.name)?;
        }
        for child in self.children.values() {
            child.write_outline(f, level + 1)?;
        }
        Ok(())
    }
}

impl Default for MenuNode {
    fn default() -> Self {
        Self::root()
    }
}

/// Plain-text outline, one node per line, used for debug logging.
impl fmt::Display for MenuNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}

/// Split a `menu_a_b_c` keyword into its path segments.
///
/// Returns `None` for keywords without the prefix or without any segment.
pub fn menu_path(keyword: &str) -> Option<Vec<&str>> {
    let rest = keyword.strip_prefix(MENU_KEYWORD_PREFIX)?;
    let segments: Vec<&str> = rest.split('_').filter(|s| !s.trim().is_empty()).collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
