// Install and fetch signal handlers
// Author: kelexine (https://github.com/kelexine)

use super::{ASSETS, CACHE_NAME, FALLBACK_PATH};
use crate::cache::CacheStorage;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::metrics;
use crate::models::request::resolve_url;
use crate::models::{CachedResponse, FetchRequest, RequestKey};
use crate::network::Fetcher;
use futures::future::try_join_all;
use reqwest::Url;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Bucket name, asset list and fallback path used by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub cache_name: String,
    pub assets: Vec<String>,
    pub fallback_path: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            assets: ASSETS.iter().map(|a| a.to_string()).collect(),
            fallback_path: FALLBACK_PATH.to_string(),
        }
    }
}

impl From<&CacheConfig> for HandlerConfig {
    fn from(config: &CacheConfig) -> Self {
        Self {
            cache_name: config.name.clone(),
            assets: config.assets.clone(),
            fallback_path: config.fallback_path.clone(),
        }
    }
}

/// Result of a successful install signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    pub stored: usize,
}

/// Where a fetch signal's response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    Fallback,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "hit",
            ResponseSource::Network => "miss",
            ResponseSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: CachedResponse,
    pub source: ResponseSource,
}

/// Offline cache handler.
///
/// Stateless between signals: everything persistent lives in the injected
/// storage. Cheap to clone; clones share storage and fetcher.
#[derive(Clone)]
pub struct OfflineCacheHandler {
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
    scope: Url,
    config: Arc<HandlerConfig>,
}

impl OfflineCacheHandler {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
        scope: Url,
        config: HandlerConfig,
    ) -> Self {
        Self {
            storage,
            fetcher,
            scope,
            config: Arc::new(config),
        }
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Install signal: precache every asset into the named bucket.
    ///
    /// Assets are fetched concurrently. Nothing is written unless every
    /// fetch returned an OK response.
    pub async fn install(&self) -> Result<InstallReport> {
        let name = &self.config.cache_name;
        info!("Installing {} asset(s) into {}", self.config.assets.len(), name);

        let bucket = self.storage.open(name).await?;

        let mut requests = Vec::with_capacity(self.config.assets.len());
        for asset in &self.config.assets {
            requests.push((asset.as_str(), FetchRequest::get(resolve_url(&self.scope, asset)?)));
        }

        let fetched = try_join_all(requests.iter().map(|(asset, request)| async move {
            let response =
                self.fetcher
                    .fetch(request)
                    .await
                    .map_err(|e| CacheError::Install {
                        asset: asset.to_string(),
                        reason: e.to_string(),
                    })?;

            if !response.is_ok() {
                return Err(CacheError::BadStatus {
                    asset: asset.to_string(),
                    status: response.status,
                });
            }
            debug!("Fetched asset {} ({} bytes)", asset, response.body.len());
            Ok::<_, CacheError>((request.key(), response))
        }))
        .await;

        let entries = match fetched {
            Ok(entries) => entries,
            Err(e) => {
                error!("Install of {} failed: {}", name, e);
                metrics::record_install(false);
                return Err(e);
            }
        };

        let stored = entries.len();
        if let Err(e) = bucket.put_all(entries).await {
            error!("Install of {} failed while storing: {}", name, e);
            metrics::record_install(false);
            return Err(e);
        }

        metrics::record_install(true);
        info!("Installed {} entries into {}", stored, name);
        Ok(InstallReport {
            cache_name: name.clone(),
            stored,
        })
    }

    /// Fetch signal: cache first, then network, then the fallback page.
    ///
    /// Returns `CacheError::Offline` when the network fails and the
    /// fallback page was never cached.
    pub async fn handle_fetch(&self, request: FetchRequest) -> Result<FetchOutcome> {
        let key = request.key();

        if let Some(response) = self.storage.match_any(&key).await? {
            debug!("Cache hit: {}", key);
            metrics::record_cache_hit();
            return Ok(FetchOutcome {
                response,
                source: ResponseSource::Cache,
            });
        }
        debug!("Cache miss: {}", key);
        metrics::record_cache_miss();

        let started = Instant::now();
        match self.fetcher.fetch(&request).await {
            Ok(response) => {
                metrics::record_network_fetch(true, started.elapsed().as_secs_f64());
                self.store(key, response.duplicate()).await;
                Ok(FetchOutcome {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(e) => {
                metrics::record_network_fetch(false, started.elapsed().as_secs_f64());
                warn!("Network fetch failed for {}: {}", key, e);
                self.fallback(&request).await
            }
        }
    }

    /// Store a fetched copy. Failures are logged and never reach the caller.
    async fn store(&self, key: RequestKey, copy: CachedResponse) {
        if !key.is_get() {
            debug!("Not caching {}: only GET requests are stored", key);
            metrics::record_store("skipped");
            return;
        }
        if copy.is_partial() {
            debug!("Not caching {}: partial response", key);
            metrics::record_store("skipped");
            return;
        }

        let result = match self.storage.open(&self.config.cache_name).await {
            Ok(bucket) => bucket.put(key.clone(), copy).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => metrics::record_store("stored"),
            Err(e) => {
                warn!("Failed to cache {}: {}", key, e);
                metrics::record_store("failed");
            }
        }
    }

    async fn fallback(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        let key = RequestKey::resolve(&self.scope, &self.config.fallback_path)?;
        match self.storage.match_any(&key).await? {
            Some(response) => {
                info!("Offline: serving {} for {}", key.url, request.url);
                metrics::record_fallback(true);
                Ok(FetchOutcome {
                    response,
                    source: ResponseSource::Fallback,
                })
            }
            None => {
                metrics::record_fallback(false);
                Err(CacheError::Offline(request.url.to_string()))
            }
        }
    }
}
