//! Menu lifecycle: load the catalog once, render it, dispatch layer clicks.
//!
//! The controller starts in `Loading` with a spinner in the menu container.
//! A successful load moves it to `Ready` with the accordion markup; any
//! failure moves it to `Failed` with an alert. Both end states are final.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use renderer::MenuRenderer;
use wms_common::{LayerRecord, MenuNode, MenuPlacement, ViewerError, ViewerResult};
use wms_protocol::process_capabilities;

use crate::fetcher::CapabilitiesSource;

pub const LOADING_HTML: &str = r#"<div class="text-center p-3"><div class="spinner-border text-secondary" role="status"><span class="visually-hidden">Loading...</span></div></div>"#;

pub const FAILED_HTML: &str =
    r#"<div class="alert alert-danger" role="alert">Error loading the menu. Please try again later.</div>"#;

/// Shown to the user when a listener fails to apply a selection.
pub const SELECTION_FAILED_ALERT: &str = "Error updating layer. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuState {
    Loading,
    Ready,
    Failed,
}

/// A click inside the menu container, as reported by the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickTarget {
    /// `data-layer` of the clicked element, absent for non-layer clicks.
    #[serde(default)]
    pub layer: Option<String>,
    /// Visible text of the clicked element.
    #[serde(default)]
    pub text: String,
}

/// A layer chosen from the menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSelection {
    pub name: String,
    pub title: String,
    /// The catalog entry, when the name is known to the tree.
    pub record: Option<LayerRecord>,
}

impl LayerSelection {
    /// Record for the selection, falling back to name and clicked title.
    pub fn to_record(&self) -> LayerRecord {
        let mut record = self
            .record
            .clone()
            .unwrap_or_else(|| LayerRecord::new(self.name.as_str(), self.title.as_str()));
        if !self.title.is_empty() {
            record.title = self.title.clone();
        }
        record
    }
}

/// Receives layer selections from the menu.
#[async_trait]
pub trait LayerSelectionListener: Send + Sync {
    async fn layer_selected(&self, selection: &LayerSelection) -> ViewerResult<()>;
}

/// Result of dispatching one click.
#[derive(Debug)]
pub struct Dispatch {
    pub selection: LayerSelection,
    pub failures: Vec<ViewerError>,
}

impl Dispatch {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetch, parse and render the catalog without touching controller state.
pub async fn load_menu(
    source: &dyn CapabilitiesSource,
    placement: MenuPlacement,
    renderer: &MenuRenderer,
) -> ViewerResult<(MenuNode, String)> {
    let xml = source.fetch().await?;
    let tree = process_capabilities(&xml, placement)?;
    debug!(outline = %tree, "Menu tree built");
    let markup = renderer.render(&tree);
    Ok((tree, markup))
}

pub struct MenuController {
    container: Option<String>,
    state: MenuState,
    tree: MenuNode,
    error: Option<String>,
    renderer: MenuRenderer,
    placement: MenuPlacement,
    listeners: Vec<Arc<dyn LayerSelectionListener>>,
}

impl MenuController {
    pub fn new(renderer: MenuRenderer, placement: MenuPlacement) -> Self {
        Self {
            container: Some(LOADING_HTML.to_string()),
            state: MenuState::Loading,
            tree: MenuNode::root(),
            error: None,
            renderer,
            placement,
            listeners: Vec::new(),
        }
    }

    /// A controller whose page has no menu container.
    pub fn without_container(renderer: MenuRenderer, placement: MenuPlacement) -> Self {
        Self {
            container: None,
            ..Self::new(renderer, placement)
        }
    }

    pub fn subscribe(&mut self, listener: Arc<dyn LayerSelectionListener>) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn tree(&self) -> &MenuNode {
        &self.tree
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Current contents of the menu container.
    pub fn container_html(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn renderer(&self) -> &MenuRenderer {
        &self.renderer
    }

    pub fn placement(&self) -> MenuPlacement {
        self.placement
    }

    /// Load the catalog and move to `Ready` or `Failed`.
    pub async fn initialize(&mut self, source: &dyn CapabilitiesSource) -> ViewerResult<()> {
        let outcome = load_menu(source, self.placement, &self.renderer).await;
        self.finish(outcome)
    }

    /// Apply the outcome of [`load_menu`].
    pub fn finish(&mut self, outcome: ViewerResult<(MenuNode, String)>) -> ViewerResult<()> {
        if self.state != MenuState::Loading {
            return Err(ViewerError::Internal("menu already initialized".to_string()));
        }

        let outcome = match (self.container.is_some(), outcome) {
            (false, _) => Err(ViewerError::Render("menu container not found".to_string())),
            (true, outcome) => outcome,
        };

        match outcome {
            Ok((tree, markup)) => {
                info!(
                    layers = tree.layer_count(),
                    nodes = tree.node_count(),
                    "Menu ready"
                );
                self.tree = tree;
                self.container = Some(markup);
                self.state = MenuState::Ready;
                Ok(())
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Error loading menu");
                if self.container.is_some() {
                    self.container = Some(FAILED_HTML.to_string());
                }
                self.error = Some(e.to_string());
                self.state = MenuState::Failed;
                Err(e)
            }
        }
    }

    /// Handle a click in the menu container.
    ///
    /// Returns `None` for clicks that do not name a layer, or while the
    /// menu is not ready. Listener errors are collected, not propagated.
    pub async fn click(&self, target: &ClickTarget) -> Option<Dispatch> {
        self.dispatch(target, None).await
    }

    /// Like [`click`](Self::click), notifying `page` before the subscribed
    /// listeners.
    pub async fn click_for(
        &self,
        target: &ClickTarget,
        page: &dyn LayerSelectionListener,
    ) -> Option<Dispatch> {
        self.dispatch(target, Some(page)).await
    }

    async fn dispatch(
        &self,
        target: &ClickTarget,
        page: Option<&dyn LayerSelectionListener>,
    ) -> Option<Dispatch> {
        if self.state != MenuState::Ready {
            debug!(state = ?self.state, "Ignoring click, menu not ready");
            return None;
        }
        let name = target.layer.as_deref().map(str::trim).filter(|n| !n.is_empty())?;

        let selection = LayerSelection {
            name: name.to_string(),
            title: target.text.trim().to_string(),
            record: self.tree.find_layer(name).cloned(),
        };
        if selection.record.is_none() {
            warn!(layer = name, "Selected layer is not in the catalog");
        }

        let listeners = page
            .into_iter()
            .chain(self.listeners.iter().map(|l| l.as_ref() as &dyn LayerSelectionListener));

        let mut failures = Vec::new();
        for listener in listeners {
            if let Err(e) = listener.layer_selected(&selection).await {
                error!(layer = name, error = %e, "Error updating layer");
                failures.push(e);
            }
        }

        Some(Dispatch {
            selection,
            failures,
        })
    }
}
