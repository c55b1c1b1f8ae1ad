//! Named cache buckets and the storage that holds them.
//!
//! The handler never touches a global cache: it is given a
//! [`CacheStorage`] handle, which is either the on-disk store used by the
//! server or the in-memory store used in tests.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod disk;
pub mod memory;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;

use crate::error::Result;
use crate::models::{CachedResponse, RequestKey};
use async_trait::async_trait;
use std::sync::Arc;

/// A single named bucket of request → response entries.
///
/// Entries are only ever added or overwritten by key.
#[async_trait]
pub trait CacheBucket: Send + Sync {
    fn name(&self) -> &str;

    /// Stored response for `key`. Only `GET` keys can match.
    async fn match_request(&self, key: &RequestKey) -> Result<Option<CachedResponse>>;

    /// Store `response` under `key`, replacing any previous entry.
    async fn put(&self, key: RequestKey, response: CachedResponse) -> Result<()>;

    /// Store a batch of entries that were all fetched successfully.
    async fn put_all(&self, entries: Vec<(RequestKey, CachedResponse)>) -> Result<()> {
        for (key, response) in entries {
            self.put(key, response).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>>;

    async fn contains(&self, key: &RequestKey) -> Result<bool> {
        Ok(self.match_request(key).await?.is_some())
    }
}

/// All buckets known to the host, in creation order.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the bucket called `name`, creating it empty if absent.
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>>;

    /// Bucket names in creation order.
    async fn names(&self) -> Result<Vec<String>>;

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.names().await?.iter().any(|n| n == name))
    }

    /// First match for `key` across every bucket, oldest bucket first.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedResponse>> {
        for name in self.names().await? {
            let bucket = self.open(&name).await?;
            if let Some(response) = bucket.match_request(key).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
