// Network access for cache misses
// Author: kelexine (https://github.com/kelexine)

mod client;

pub use client::HttpFetcher;

use crate::error::Result;
use crate::models::{CachedResponse, FetchRequest};
use async_trait::async_trait;

/// Performs a live fetch.
///
/// Any HTTP status is a successful fetch. An `Err` means the request
/// never produced a response (connection refused, DNS failure, timeout).
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse>;
}
