//! Error types for the map viewer.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Primary error type for viewer operations.
#[derive(Debug, Error)]
pub enum ViewerError {
    // === Capabilities Errors ===
    #[error("Failed to fetch capabilities: {0}")]
    Fetch(String),

    #[error("Capabilities request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed capabilities document: {0}")]
    Parse(String),

    // === Presentation Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Error updating layer: {0}")]
    Selection(String),

    #[error("Please select a layer first.")]
    NoLayerSelected,

    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ViewerError {
    /// Short name of the error class, used in logs and JSON bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::Fetch(_) | ViewerError::Timeout(_) => "FetchError",
            ViewerError::Parse(_) => "ParseError",
            ViewerError::Render(_) => "RenderError",
            ViewerError::Selection(_) => "SelectionError",
            ViewerError::NoLayerSelected => "NoLayerSelected",
            ViewerError::InvalidParameter { .. } => "InvalidParameterValue",
            ViewerError::Internal(_) => "InternalError",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ViewerError::InvalidParameter { .. } => 400,
            ViewerError::NoLayerSelected => 409,
            ViewerError::Fetch(_) | ViewerError::Parse(_) => 502,
            ViewerError::Timeout(_) => 504,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        ViewerError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_counts_as_fetch_error() {
        let err = ViewerError::Timeout(Duration::from_secs(30));
        assert_eq!(err.kind(), "FetchError");
        assert_eq!(err.http_status_code(), 504);
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = ViewerError::Timeout(Duration::from_millis(200));
        assert_eq!(err.to_string(), "Capabilities request timed out after 200ms");
    }

    #[test]
    fn test_no_layer_selected_message_is_user_facing() {
        let err = ViewerError::NoLayerSelected;
        assert_eq!(err.to_string(), "Please select a layer first.");
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_selection_error_display() {
        let err = ViewerError::Selection("map rejected overlay".to_string());
        assert_eq!(err.kind(), "SelectionError");
        assert!(err.to_string().starts_with("Error updating layer"));
    }
}
