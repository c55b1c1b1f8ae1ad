// In-memory cache storage
// Author: kelexine (https://github.com/kelexine)

use super::{CacheBucket, CacheStorage};
use crate::error::Result;
use crate::models::{CachedResponse, RequestKey};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Storage that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
    buckets: RwLock<Vec<Arc<MemoryBucket>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Bucket backed by an insertion-ordered entry list.
pub struct MemoryBucket {
    name: String,
    entries: RwLock<Vec<(RequestKey, CachedResponse)>>,
}

impl MemoryBucket {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CacheBucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, key: &RequestKey) -> Result<Option<CachedResponse>> {
        if !key.is_get() {
            return Ok(None);
        }
        let entries = self.entries.read();
        Ok(entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, r)| r.duplicate()))
    }

    async fn put(&self, key: RequestKey, response: CachedResponse) -> Result<()> {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = response,
            None => entries.push((key, response)),
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        Ok(self.entries.read().iter().map(|(k, _)| k.clone()).collect())
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>> {
        if let Some(bucket) = self.buckets.read().iter().find(|b| b.name == name) {
            return Ok(Arc::clone(bucket) as Arc<dyn CacheBucket>);
        }

        let mut buckets = self.buckets.write();
        // Another task may have created it between the two locks
        if let Some(bucket) = buckets.iter().find(|b| b.name == name) {
            return Ok(Arc::clone(bucket) as Arc<dyn CacheBucket>);
        }
        debug!("Creating in-memory bucket {}", name);
        let bucket = Arc::new(MemoryBucket::new(name));
        buckets.push(Arc::clone(&bucket));
        Ok(bucket as Arc<dyn CacheBucket>)
    }

    async fn names(&self) -> Result<Vec<String>> {
        Ok(self.buckets.read().iter().map(|b| b.name.clone()).collect())
    }
}
