// Shared test doubles
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use offline_cache::cache::{CacheStorage, MemoryStorage};
use offline_cache::error::{CacheError, Result};
use offline_cache::models::{CachedResponse, FetchRequest};
use offline_cache::network::Fetcher;
use offline_cache::worker::{HandlerConfig, OfflineCacheHandler};
use parking_lot::Mutex;
use reqwest::Url;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const SCOPE: &str = "http://app.test/";

pub fn scope() -> Url {
    Url::parse(SCOPE).unwrap()
}

pub fn url(path: &str) -> Url {
    scope().join(path).unwrap()
}

/// Network stand-in: serves canned responses, records every call and can
/// be switched offline.
pub struct FakeFetcher {
    routes: Mutex<HashMap<String, CachedResponse>>,
    online: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fetcher that serves the default asset list.
    pub fn with_site() -> Self {
        let fetcher = Self::new();
        fetcher.serve("./", CachedResponse::new(200, "<html>root</html>"));
        fetcher.serve(
            "./index.html",
            CachedResponse::new(200, "<html>index</html>").with_header("content-type", "text/html"),
        );
        fetcher.serve(
            "./manifest.webmanifest",
            CachedResponse::new(200, r#"{"name":"Watch Tycoon"}"#),
        );
        fetcher.serve(
            "./style.css",
            CachedResponse::new(200, "body{}").with_header("content-type", "text/css"),
        );
        fetcher
    }

    pub fn serve(&self, path: &str, response: CachedResponse) {
        self.serve_url(&url(path), response);
    }

    pub fn serve_url(&self, url: &Url, response: CachedResponse) {
        self.routes.lock().insert(url.as_str().to_string(), response);
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(CacheError::Network(format!("offline: {}", request.url)));
        }
        self.calls
            .lock()
            .push(format!("{} {}", request.method, request.url));

        Ok(self
            .routes
            .lock()
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| CachedResponse::new(404, "not found")))
    }
}

pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub fetcher: Arc<FakeFetcher>,
    pub handler: OfflineCacheHandler,
}

pub fn harness(fetcher: FakeFetcher) -> Harness {
    harness_at(fetcher, scope())
}

/// Harness whose handler is scoped to `scope` instead of the site root.
pub fn harness_at(fetcher: FakeFetcher, scope: Url) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let fetcher = Arc::new(fetcher);
    let handler = OfflineCacheHandler::new(
        storage.clone() as Arc<dyn CacheStorage>,
        fetcher.clone() as Arc<dyn Fetcher>,
        scope,
        HandlerConfig::default(),
    );
    Harness {
        storage,
        fetcher,
        handler,
    }
}
