// Error types for offline-cache
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Install failed while caching {asset}: {reason}")]
    Install { asset: String, reason: String },

    #[error("Asset {asset} returned non-OK status {status}")]
    BadStatus { asset: String, status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Offline and no fallback cached for {0}")]
    Offline(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt cache entry: {0}")]
    Corrupt(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),
}

impl CacheError {
    /// Whether this error means the upstream could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, CacheError::Network(_) | CacheError::Http(_))
    }
}

// Convert CacheError to HTTP responses for Axum
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, error_type) = match self {
            CacheError::Offline(_) | CacheError::Network(_) | CacheError::Http(_) => {
                (StatusCode::BAD_GATEWAY, "network_error")
            }
            CacheError::InvalidUrl(_) | CacheError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error")
            }
            CacheError::Storage(_) | CacheError::Corrupt(_) | CacheError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
