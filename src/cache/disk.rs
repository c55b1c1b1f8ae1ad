// On-disk cache storage
// Author: kelexine (https://github.com/kelexine)
//
// Layout under the storage root:
//
//   index.json                  bucket names in creation order
//   <sha256(name)>/<sha256(key)>.entry
//
// An entry file is one line of JSON metadata followed by the raw body.
// Every write goes to a temp file first and is renamed into place.

use super::{CacheBucket, CacheStorage};
use crate::error::{CacheError, Result};
use crate::models::response::ResponseHead;
use crate::models::{CachedResponse, RequestKey};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

const INDEX_FILE: &str = "index.json";
const ENTRY_EXT: &str = "entry";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Default, Serialize, Deserialize)]
struct BucketIndex {
    buckets: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: RequestKey,
    head: ResponseHead,
    stored_at: DateTime<Utc>,
}

/// Storage that persists buckets across restarts.
pub struct DiskStorage {
    root: PathBuf,
    /// Serializes index updates
    index_lock: Mutex<()>,
}

impl DiskStorage {
    /// Open (creating if needed) a storage root directory.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!("Cache storage at {}", root.display());
        Ok(Self {
            root,
            index_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, name: &str) -> PathBuf {
        self.root.join(hash_hex(name.as_bytes()))
    }

    async fn read_index(&self) -> Result<BucketIndex> {
        match fs::read(self.root.join(INDEX_FILE)).await {
            Ok(raw) => serde_json::from_slice(&raw)
                .map_err(|e| CacheError::Corrupt(format!("{}: {}", INDEX_FILE, e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BucketIndex::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheBucket>> {
        let dir = self.bucket_dir(name);

        let _guard = self.index_lock.lock().await;
        let mut index = self.read_index().await?;
        if !index.buckets.iter().any(|n| n == name) {
            debug!("Creating bucket {} at {}", name, dir.display());
            fs::create_dir_all(&dir).await?;
            index.buckets.push(name.to_string());
            write_atomic(&self.root.join(INDEX_FILE), &serde_json::to_vec(&index)?).await?;
        }

        let bucket = Arc::new(DiskBucket {
            name: name.to_string(),
            dir,
        });
        Ok(bucket as Arc<dyn CacheBucket>)
    }

    async fn names(&self) -> Result<Vec<String>> {
        Ok(self.read_index().await?.buckets)
    }

    /// Lookup reads the index once and never takes the index lock.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedResponse>> {
        for name in self.read_index().await?.buckets {
            let bucket = DiskBucket {
                dir: self.bucket_dir(&name),
                name,
            };
            if let Some(response) = bucket.match_request(key).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

/// Bucket stored as one directory of entry files.
pub struct DiskBucket {
    name: String,
    dir: PathBuf,
}

impl DiskBucket {
    fn entry_path(&self, key: &RequestKey) -> PathBuf {
        let stem = hash_hex(key.to_string().as_bytes());
        self.dir.join(format!("{}.{}", stem, ENTRY_EXT))
    }
}

#[async_trait]
impl CacheBucket for DiskBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, key: &RequestKey) -> Result<Option<CachedResponse>> {
        if !key.is_get() {
            return Ok(None);
        }

        let raw = match fs::read(self.entry_path(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (meta, body) = decode_entry(raw)?;
        if meta.key != *key {
            // Hash collision or stale file; treat as a miss
            return Ok(None);
        }
        Ok(Some(CachedResponse::from_parts(meta.head, body)))
    }

    async fn put(&self, key: RequestKey, response: CachedResponse) -> Result<()> {
        let path = self.entry_path(&key);
        let meta = EntryMeta {
            key,
            head: response.head(),
            stored_at: Utc::now(),
        };

        let mut data = serde_json::to_vec(&meta)?;
        data.push(b'\n');
        data.extend_from_slice(&response.body);

        write_atomic(&path, &data).await?;
        debug!("Stored {} in {}", meta.key, self.name);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        let mut metas = Vec::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXT) {
                continue;
            }
            let (meta, _) = decode_entry(fs::read(&path).await?)?;
            metas.push(meta);
        }

        metas.sort_by_key(|m| m.stored_at);
        Ok(metas.into_iter().map(|m| m.key).collect())
    }
}

fn hash_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

fn decode_entry(raw: Vec<u8>) -> Result<(EntryMeta, Bytes)> {
    let split = raw
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| CacheError::Corrupt("entry has no metadata line".to_string()))?;

    let meta: EntryMeta = serde_json::from_slice(&raw[..split])
        .map_err(|e| CacheError::Corrupt(format!("entry metadata: {}", e)))?;
    let body = Bytes::from(raw).slice(split + 1..);
    Ok((meta, body))
}

async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension(format!(
        "tmp-{}-{}",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&tmp, data).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(CacheError::Storage(format!(
            "failed to move entry into {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}
