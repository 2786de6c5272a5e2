//! Page sessions.
//!
//! Every page load gets its own [`MapSession`]: its own overlay, selected
//! layer and download panel. The page sends its id back in the
//! `x-viewer-session` header on each API call. Sessions are kept in an LRU
//! so abandoned pages are evicted once the store is full.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use wms_common::ViewerError;
use wms_protocol::WfsVersion;

use crate::download::WfsDownloadPanel;
use crate::handlers::ApiError;
use crate::metrics::MetricsCollector;
use crate::session::{MapSession, OverlayRegistry, OverlaySettings, SharedSession};

/// Request header carrying the page session id.
pub const SESSION_HEADER: &str = "x-viewer-session";

const MAX_ID_LEN: usize = 64;

pub type PageSessionHandle = Arc<SharedSession<OverlayRegistry>>;

/// Session id taken from the `x-viewer-session` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageSession(pub String);

impl PageSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= MAX_ID_LEN
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PageSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if !PageSession::is_valid(id) {
            return Err(ApiError(ViewerError::InvalidParameter {
                param: SESSION_HEADER.to_string(),
                message: "missing or malformed page session id".to_string(),
            }));
        }
        Ok(PageSession(id.to_string()))
    }
}

/// What every new session starts from.
#[derive(Debug, Clone)]
pub struct SessionTemplate {
    pub overlay: OverlaySettings,
    pub wfs_base_url: String,
    pub wfs_version: WfsVersion,
    pub download_native_crs: bool,
    /// Overlay attached before the user picks anything.
    pub initial_layer: Option<String>,
}

pub struct SessionStore {
    sessions: Mutex<LruCache<String, PageSessionHandle>>,
    template: SessionTemplate,
    metrics: Arc<MetricsCollector>,
}

impl SessionStore {
    pub fn new(template: SessionTemplate, capacity: usize, metrics: Arc<MetricsCollector>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            template,
            metrics,
        }
    }

    /// Open a session for a freshly served page.
    pub async fn open(&self) -> (PageSession, PageSessionHandle) {
        let id = PageSession(Uuid::new_v4().to_string());
        let handle = self.insert(&id).await;
        (id, handle)
    }

    /// The session for `id`, starting a fresh one if it is unknown or was
    /// evicted.
    pub async fn get_or_open(&self, id: &PageSession) -> PageSessionHandle {
        if let Some(handle) = self.sessions.lock().await.get(id.as_str()) {
            return handle.clone();
        }
        debug!(session = id.as_str(), "Unknown page session, starting a new one");
        self.insert(id).await
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn insert(&self, id: &PageSession) -> PageSessionHandle {
        let handle = Arc::new(SharedSession::new(self.build(), self.metrics.clone()));

        let mut sessions = self.sessions.lock().await;
        if let Some((evicted, _)) = sessions.push(id.0.clone(), handle.clone()) {
            if evicted != id.0 {
                debug!(session = %evicted, "Page session evicted");
            }
        }
        self.metrics.record_session_opened(sessions.len());
        handle
    }

    fn build(&self) -> MapSession<OverlayRegistry> {
        let mut panel = WfsDownloadPanel::new(self.template.wfs_base_url.clone())
            .with_version(self.template.wfs_version);
        if self.template.download_native_crs {
            panel = panel.with_native_crs();
        }
        let mut session = MapSession::new(OverlayRegistry::new(), self.template.overlay.clone(), panel);
        if let Some(name) = self.template.initial_layer.as_deref() {
            if let Err(e) = session.show_initial_layer(name) {
                warn!(layer = name, error = %e, "Initial overlay not attached");
            }
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{LayerSelection, LayerSelectionListener};
    use axum::http::Request;

    fn template(initial_layer: Option<&str>) -> SessionTemplate {
        SessionTemplate {
            overlay: OverlaySettings {
                wms_base_url: "https://geo.example.org/geoserver/wms".to_string(),
                tile_version: "1.1.1".to_string(),
                attribution: "IDESEFIN".to_string(),
                max_zoom: 22,
            },
            wfs_base_url: "https://geo.example.org/geoserver/wfs".to_string(),
            wfs_version: WfsVersion::V2_0_0,
            download_native_crs: false,
            initial_layer: initial_layer.map(str::to_string),
        }
    }

    fn store(capacity: usize) -> SessionStore {
        SessionStore::new(template(None), capacity, Arc::new(MetricsCollector::new()))
    }

    fn pick(name: &str) -> LayerSelection {
        LayerSelection {
            name: name.to_string(),
            title: name.to_string(),
            record: None,
        }
    }

    async fn extract(header: Option<&str>) -> Result<PageSession, ApiError> {
        let mut builder = Request::builder().uri("/api/session");
        if let Some(value) = header {
            builder = builder.header(SESSION_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        PageSession::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_open_issues_distinct_ids() {
        let store = store(8);
        let (a, _) = store.open().await;
        let (b, _) = store.open().await;
        assert_ne!(a, b);
        assert!(PageSession::is_valid(a.as_str()));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_selection() {
        let store = store(8);
        let (a, handle_a) = store.open().await;
        let (b, _) = store.open().await;

        handle_a.layer_selected(&pick("ZONE:A")).await.unwrap();

        let a = store.get_or_open(&a).await;
        let b = store.get_or_open(&b).await;
        assert_eq!(a.lock().await.selection().unwrap().name, "ZONE:A");
        assert!(b.lock().await.selection().is_none());
        assert!(b.lock().await.active_overlay().is_none());
    }

    #[tokio::test]
    async fn test_least_recent_session_is_evicted() {
        let store = store(2);
        let (first, handle) = store.open().await;
        handle.layer_selected(&pick("a")).await.unwrap();
        store.open().await;
        store.open().await;
        assert_eq!(store.len().await, 2);

        // An evicted page starts over with an empty session.
        let reopened = store.get_or_open(&first).await;
        assert!(reopened.lock().await.selection().is_none());
    }

    #[tokio::test]
    async fn test_new_session_shows_initial_layer() {
        let store = SessionStore::new(
            template(Some("LIMITES_ADMINISTRATIVOS:limite_municipal")),
            4,
            Arc::new(MetricsCollector::new()),
        );
        let (_, handle) = store.open().await;
        let session = handle.lock().await;
        assert_eq!(
            session.active_overlay().map(|o| o.layer.as_str()),
            Some("LIMITES_ADMINISTRATIVOS:limite_municipal")
        );
        assert!(session.selection().is_none());
    }

    #[tokio::test]
    async fn test_header_extraction() {
        let id = extract(Some("3f2b-77aa")).await.unwrap();
        assert_eq!(id.as_str(), "3f2b-77aa");

        assert!(extract(None).await.is_err());
        assert!(extract(Some("")).await.is_err());
        assert!(extract(Some("../etc")).await.is_err());
        assert!(extract(Some("a".repeat(MAX_ID_LEN + 1).as_str())).await.is_err());
    }
}
