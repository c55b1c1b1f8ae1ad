// HTTP request handlers
// Author: kelexine (https://github.com/kelexine)

use super::routes::AppState;
use crate::error::CacheError;
use crate::models::request::resolve_local_path;
use crate::models::{CachedResponse, FetchRequest, RequestKey};
use crate::worker::ResponseSource;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest request body forwarded upstream.
const MAX_REQUEST_BODY: usize = 16 * 1024 * 1024;

/// Response header naming where the body came from (`hit`, `miss`, `fallback`).
pub const SOURCE_HEADER: &str = "x-offline-cache";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub cache_name: String,
    pub scope: String,
    pub offline_ready: bool,
    pub buckets: Vec<BucketSummary>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BucketSummary {
    pub name: String,
    pub entries: usize,
}

/// Reports the buckets present and whether the fallback page is cached.
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, CacheError> {
    let handler = &state.handler;
    let storage = handler.storage();

    let mut buckets = Vec::new();
    for name in storage.names().await? {
        let entries = storage.open(&name).await?.keys().await?.len();
        buckets.push(BucketSummary { name, entries });
    }

    let fallback = RequestKey::resolve(handler.scope(), &handler.config().fallback_path)?;
    let offline_ready = storage.match_any(&fallback).await?.is_some();

    Ok(Json(HealthResponse {
        status: if offline_ready {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        cache_name: handler.config().cache_name.clone(),
        scope: handler.scope().to_string(),
        offline_ready,
        buckets,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

/// Delivers the request to the handler as a fetch signal.
pub async fn fetch_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, CacheError> {
    let fetch_request = into_fetch_request(&state, request).await?;
    debug!("Fetch signal: {} {}", fetch_request.method, fetch_request.url);

    let outcome = state.handler.handle_fetch(fetch_request).await?;
    to_http_response(outcome.response, outcome.source)
}

async fn into_fetch_request(state: &AppState, request: Request) -> Result<FetchRequest, CacheError> {
    let (parts, body) = request.into_parts();

    let path = parts
        .uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");
    let url = resolve_local_path(state.handler.scope(), path)?;

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let body = axum::body::to_bytes(body, MAX_REQUEST_BODY)
        .await
        .map_err(|e| CacheError::InvalidRequest(format!("reading request body: {}", e)))?;

    Ok(FetchRequest {
        method: parts.method.as_str().to_string(),
        url,
        headers,
        body,
    })
}

fn to_http_response(response: CachedResponse, source: ResponseSource) -> Result<Response, CacheError> {
    let status = StatusCode::from_u16(response.status)
        .map_err(|e| CacheError::Internal(format!("bad status {}: {}", response.status, e)))?;

    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .header(SOURCE_HEADER, source.as_str())
        .body(Body::from(response.body))
        .map_err(|e| CacheError::Internal(format!("building response: {}", e)))
}
