//! The offline cache handler and its fixed inputs.
//!
//! The handler reacts to two host signals:
//!
//! - **install**: precache the asset list into the named bucket, all or nothing.
//! - **fetch**: answer from cache, else from the network (caching the
//!   result), else with the cached fallback page.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handler;

pub use handler::{FetchOutcome, HandlerConfig, InstallReport, OfflineCacheHandler, ResponseSource};

/// Bucket identifier. Bumping the version starts a fresh bucket; older
/// buckets are left in place.
pub const CACHE_NAME: &str = "watch-tycoon-v1";

/// Precached at install time, relative to the handler scope.
pub const ASSETS: &[&str] = &["./", "./index.html", "./manifest.webmanifest"];

/// Served when the network is unreachable and the request itself is not cached.
pub const FALLBACK_PATH: &str = "./index.html";
