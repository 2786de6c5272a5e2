//! Menu tree → nested Bootstrap accordion markup.
//!
//! Each non-root node becomes one collapsible section: a header with the
//! node's icon and title, then a list of layer buttons, then the child
//! sections. Layer buttons carry the layer name in `data-layer`, which is
//! what the click dispatcher reads.

use std::collections::HashSet;

use tracing::warn;

use wms_common::{LayerRecord, MenuNode, ROOT_NODE};

use crate::escape::{escape_html, make_valid_id};
use crate::icons::icon_html;

/// Deepest section level rendered below the root.
pub const MAX_MENU_DEPTH: usize = 10;

/// Renders menu trees with a recursion bound.
#[derive(Debug, Clone, Copy)]
pub struct MenuRenderer {
    max_depth: usize,
}

impl Default for MenuRenderer {
    fn default() -> Self {
        Self {
            max_depth: MAX_MENU_DEPTH,
        }
    }
}

impl MenuRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Render the children of `root`; the root itself gets no section.
    pub fn render(&self, root: &MenuNode) -> String {
        let mut pass = RenderPass {
            max_depth: self.max_depth,
            used_ids: HashSet::new(),
        };
        pass.render_children(root, 1, ROOT_NODE)
    }
}

/// State of one render call; ids are unique within a pass.
struct RenderPass {
    max_depth: usize,
    used_ids: HashSet<String>,
}

impl RenderPass {
    fn render_node(&mut self, node: &MenuNode, depth: usize, parent_id: &str) -> String {
        if depth > self.max_depth {
            warn!(
                node = %node.name,
                depth = depth,
                max_depth = self.max_depth,
                "Maximum menu depth exceeded, branch not rendered"
            );
            return String::new();
        }

        let id = self.unique_id(format!("{}-{}-{}", parent_id, depth, make_valid_id(&node.name)));
        let icon = icon_html(&node.name);
        let title = escape_html(&node.name);
        let layers_html = render_layers(&node.layers);
        let children_html = self.render_children(node, depth + 1, &id);

        let mut html = String::new();
        html.push_str(r#"<div class="accordion-item mb-2">"#);
        html.push_str(&format!(r#"<h2 class="accordion-header" id="heading-{}">"#, id));
        html.push_str(&format!(
            r##"<button class="accordion-button collapsed text-uppercase" type="button" data-bs-toggle="collapse" data-bs-target="#collapse-{id}" aria-expanded="false" aria-controls="collapse-{id}">"##,
            id = id
        ));
        if !icon.is_empty() {
            html.push_str(&icon);
            html.push_str("&nbsp;");
        }
        html.push_str(&title);
        html.push_str("</button></h2>");
        html.push_str(&format!(
            r#"<div id="collapse-{id}" class="accordion-collapse collapse" aria-labelledby="heading-{id}">"#,
            id = id
        ));
        html.push_str(r#"<div class="accordion-body">"#);
        html.push_str(&layers_html);
        html.push_str(&children_html);
        html.push_str("</div></div></div>");
        html
    }

    fn render_children(&mut self, node: &MenuNode, depth: usize, parent_id: &str) -> String {
        if node.children.is_empty() {
            return String::new();
        }
        let sections: String = node
            .children
            .values()
            .map(|child| self.render_node(child, depth, parent_id))
            .collect();
        if sections.is_empty() {
            return String::new();
        }
        format!(r#"<div class="accordion" role="tablist">{}</div>"#, sections)
    }

    /// Reserve `candidate`, suffixing `-2`, `-3`, ... on collision.
    fn unique_id(&mut self, candidate: String) -> String {
        if self.used_ids.insert(candidate.clone()) {
            return candidate;
        }
        let mut n = 2;
        loop {
            let id = format!("{}-{}", candidate, n);
            if self.used_ids.insert(id.clone()) {
                return id;
            }
            n += 1;
        }
    }
}

fn render_layers(layers: &[LayerRecord]) -> String {
    if layers.is_empty() {
        return String::new();
    }
    let mut html = String::from(r#"<ul class="list-group list-group-flush">"#);
    for layer in layers {
        let name = escape_html(&layer.name);
        html.push_str(&format!(
            r#"<li class="list-group-item layer-item" data-layer-name="{name}"><button class="btn btn-link text-decoration-none text-start w-100" type="button" data-layer="{name}">{title}</button></li>"#,
            name = name,
            title = escape_html(layer.display_title())
        ));
    }
    html.push_str("</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a tree from `"a|b"`-style paths.
    fn tree(entries: &[(&str, LayerRecord)]) -> MenuNode {
        let mut root = MenuNode::root();
        for (path, layer) in entries {
            let segments: Vec<&str> = path.split('|').collect();
            root.insert(&segments, layer.clone()).unwrap();
        }
        root
    }

    /// All values of `attr="..."` in `html`.
    fn attr_values<'a>(html: &'a str, attr: &str) -> Vec<&'a str> {
        let needle = format!(r#"{}=""#, attr);
        html.match_indices(&needle)
            .map(|(i, _)| {
                let start = i + needle.len();
                let end = start + html[start..].find('"').unwrap();
                &html[start..end]
            })
            .collect()
    }

    #[test]
    fn test_empty_tree_renders_nothing() {
        assert_eq!(MenuRenderer::new().render(&MenuNode::root()), "");
    }

    #[test]
    fn test_root_has_no_section_of_its_own() {
        let root = tree(&[("Zoneamentos", LayerRecord::new("ZONE:A", "Zona A"))]);
        let html = MenuRenderer::new().render(&root);
        assert_eq!(html.matches("accordion-item").count(), 1);
        assert!(html.contains(r#"id="heading-root-1-Zoneamentos""#));
        assert!(html.contains(r#"<i class="bi bi-subtract"></i>&nbsp;Zoneamentos"#));
        assert!(html.contains(r#"data-layer="ZONE:A">Zona A</button>"#));
    }

    #[test]
    fn test_layers_render_before_children() {
        let root = tree(&[
            ("a|b", LayerRecord::new("child", "Child")),
            ("a", LayerRecord::new("own", "Own")),
        ]);
        let html = MenuRenderer::new().render(&root);
        let own = html.find(r#"data-layer="own""#).unwrap();
        let child_section = html.find("heading-root-1-a-2-b").unwrap();
        assert!(own < child_section);
    }

    #[test]
    fn test_empty_title_falls_back_to_name() {
        let root = tree(&[("x", LayerRecord::new("ws:untitled", ""))]);
        let html = MenuRenderer::new().render(&root);
        assert!(html.contains(r#"data-layer="ws:untitled">ws:untitled</button>"#));
    }

    #[test]
    fn test_escapes_titles_and_names() {
        let root = tree(&[(
            "<b>Sec</b>",
            LayerRecord::new(r#"x:"q""#, r#"<script>alert('x')</script> & "more""#),
        )]);
        let html = MenuRenderer::new().render(&root);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt; &amp; &quot;more&quot;"));
        assert!(html.contains(r#"data-layer="x:&quot;q&quot;""#));
    }

    #[test]
    fn test_colliding_sanitized_names_get_unique_ids() {
        let root = tree(&[
            ("a b", LayerRecord::new("1", "1")),
            ("a-b", LayerRecord::new("2", "2")),
            ("a  b", LayerRecord::new("3", "3")),
            ("???", LayerRecord::new("4", "4")),
            ("!!!", LayerRecord::new("5", "5")),
        ]);
        let html = MenuRenderer::new().render(&root);
        let ids = attr_values(&html, "id");
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(unique.len(), ids.len(), "duplicate ids in {:?}", ids);
    }

    #[test]
    fn test_ids_unique_across_repeated_renders_of_same_tree() {
        let root = tree(&[
            ("a|a|a", LayerRecord::new("1", "1")),
            ("a|b", LayerRecord::new("2", "2")),
        ]);
        let renderer = MenuRenderer::new();
        for _ in 0..2 {
            let html = renderer.render(&root);
            let ids = attr_values(&html, "id");
            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(unique.len(), ids.len());
        }
    }

    #[test]
    fn test_depth_bound_truncates_branch() {
        let path: Vec<String> = (0..15).map(|i| format!("l{}", i)).collect();
        let mut root = MenuNode::root();
        root.insert(&path, LayerRecord::new("deep", "Deep")).unwrap();

        let html = MenuRenderer::new().render(&root);
        assert_eq!(html.matches(r#"class="accordion-item"#).count(), MAX_MENU_DEPTH);
        assert!(html.contains("heading-root-1-l0"));
        assert!(!html.contains("-11-l10"));
        assert!(!html.contains(r#"data-layer="deep""#));
    }

    #[test]
    fn test_zero_depth_renders_nothing() {
        let root = tree(&[("a", LayerRecord::new("1", "1"))]);
        assert_eq!(MenuRenderer::with_max_depth(0).render(&root), "");
    }
}
