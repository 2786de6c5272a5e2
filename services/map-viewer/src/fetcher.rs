//! Capabilities document sources.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use wms_common::{ViewerError, ViewerResult};

/// Something that can produce a GetCapabilities document.
#[async_trait]
pub trait CapabilitiesSource: Send + Sync {
    /// Retrieve the raw XML text.
    async fn fetch(&self) -> ViewerResult<String>;

    /// Where the document comes from, for logs.
    fn describe(&self) -> String;
}

/// Fetches the document over HTTP with a request timeout.
pub struct HttpCapabilitiesFetcher {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpCapabilitiesFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ViewerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ViewerError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, err: reqwest::Error) -> ViewerError {
        if err.is_timeout() {
            ViewerError::Timeout(self.timeout)
        } else {
            ViewerError::Fetch(err.to_string())
        }
    }
}

#[async_trait]
impl CapabilitiesSource for HttpCapabilitiesFetcher {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> ViewerResult<String> {
        debug!("Requesting capabilities document");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Capabilities request failed");
            return Err(ViewerError::Fetch(format!("HTTP {} from {}", status, self.url)));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        info!(bytes = body.len(), "Capabilities document received");
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the document from disk, for offline use.
pub struct FileCapabilities {
    path: PathBuf,
}

impl FileCapabilities {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CapabilitiesSource for FileCapabilities {
    async fn fetch(&self) -> ViewerResult<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ViewerError::Fetch(format!("Failed to read {}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
