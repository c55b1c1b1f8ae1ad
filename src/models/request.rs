// Intercepted request and cache key types
// Author: kelexine (https://github.com/kelexine)

use crate::error::{CacheError, Result};
use bytes::Bytes;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a cache entry: request method plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &Url) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.as_str().to_string(),
        }
    }

    /// GET key for a path relative to `scope` (e.g. `./index.html`).
    pub fn resolve(scope: &Url, path: &str) -> Result<Self> {
        let url = resolve_url(scope, path)?;
        Ok(Self::new("GET", &url))
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Resolve a worker-relative path against the scope URL.
pub fn resolve_url(scope: &Url, path: &str) -> Result<Url> {
    scope
        .join(path)
        .map_err(|e| CacheError::InvalidUrl(format!("{} (relative to {}): {}", path, scope, e)))
}

/// Map a path received by the host (e.g. `/index.html?v=2`) onto the scope.
///
/// The local root is mounted at the scope directory, so `/index.html` under
/// scope `https://example.com/game/` becomes `https://example.com/game/index.html`.
/// Results that leave the scope origin or directory are rejected.
pub fn resolve_local_path(scope: &Url, path_and_query: &str) -> Result<Url> {
    let relative = format!("./{}", path_and_query.trim_start_matches('/'));
    let url = scope
        .join(&relative)
        .map_err(|e| CacheError::InvalidRequest(format!("{}: {}", path_and_query, e)))?;

    let scope_dir = scope
        .path()
        .rfind('/')
        .map_or("/", |i| &scope.path()[..=i]);
    let same_origin = url.scheme() == scope.scheme()
        && url.host_str() == scope.host_str()
        && url.port_or_known_default() == scope.port_or_known_default();

    if !same_origin || !url.path().starts_with(scope_dir) {
        return Err(CacheError::InvalidRequest(format!(
            "{} resolves outside {}",
            path_and_query, scope
        )));
    }
    Ok(url)
}

/// An outgoing request delivered with a fetch signal.
///
/// Headers and body are opaque to the handler; they are only forwarded
/// to the network when the cache cannot answer.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl FetchRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_paths() {
        let scope = Url::parse("http://localhost:3000/").unwrap();

        let root = RequestKey::resolve(&scope, "./").unwrap();
        assert_eq!(root.url, "http://localhost:3000/");

        let index = RequestKey::resolve(&scope, "./index.html").unwrap();
        assert_eq!(index.url, "http://localhost:3000/index.html");
        assert!(index.is_get());
    }

    #[test]
    fn test_resolve_under_subdirectory_scope() {
        let scope = Url::parse("https://example.com/game/").unwrap();
        let key = RequestKey::resolve(&scope, "./manifest.webmanifest").unwrap();
        assert_eq!(key.url, "https://example.com/game/manifest.webmanifest");
    }

    #[test]
    fn test_local_path_mounted_at_scope_directory() {
        let scope = Url::parse("https://example.com/game/").unwrap();

        let index = resolve_local_path(&scope, "/index.html?v=2").unwrap();
        assert_eq!(index.as_str(), "https://example.com/game/index.html?v=2");

        let root = resolve_local_path(&scope, "/").unwrap();
        assert_eq!(root.as_str(), "https://example.com/game/");
    }

    #[test]
    fn test_local_path_cannot_switch_host() {
        let scope = Url::parse("http://app.test/").unwrap();

        let url = resolve_local_path(&scope, "//evil.test/steal").unwrap();
        assert_eq!(url.host_str(), Some("app.test"));
        assert_eq!(url.as_str(), "http://app.test/evil.test/steal");
    }

    #[test]
    fn test_local_path_cannot_climb_out_of_scope() {
        let scope = Url::parse("https://example.com/game/").unwrap();
        assert!(matches!(
            resolve_local_path(&scope, "/../admin"),
            Err(CacheError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_request_key_uppercases_method() {
        let url = Url::parse("http://localhost/").unwrap();
        let req = FetchRequest::get(url).with_method("post");
        assert_eq!(req.key().method, "POST");
        assert!(!req.key().is_get());
    }

    #[test]
    fn test_key_display() {
        let url = Url::parse("http://localhost/style.css").unwrap();
        assert_eq!(
            RequestKey::new("get", &url).to_string(),
            "GET http://localhost/style.css"
        );
    }
}
