// reqwest-backed fetcher
// Author: kelexine (https://github.com/kelexine)

use super::Fetcher;
use crate::config::UpstreamConfig;
use crate::error::{CacheError, Result};
use crate::models::{CachedResponse, FetchRequest};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;

/// Headers that describe a single hop and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "host",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Fetches requests from the upstream origin over HTTP.
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| CacheError::Network(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created upstream HTTP client");
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| CacheError::InvalidUrl(format!("bad method {}: {}", request.method, e)))?;

        let mut builder = self.http_client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            if HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h)) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CacheError::Network(format!("{} {}: {}", request.method, request.url, e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        // The body stream is single-use; buffer it so it can be duplicated
        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Network(format!("reading body of {}: {}", request.url, e)))?;

        debug!("Fetched {} {} -> {}", request.method, request.url, status);
        Ok(CachedResponse {
            status,
            headers,
            body,
        })
    }
}
