// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{
    gather_metrics, CACHE_LOOKUPS, CACHE_STORES, INSTALLS, NETWORK_FETCHES,
    NETWORK_FETCH_DURATION, OFFLINE_FALLBACKS,
};

/// Helper to record cache lookup outcomes
pub fn record_cache_hit() {
    CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
}

pub fn record_cache_miss() {
    CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
}

/// Helper to record store attempts (`stored`, `skipped`, `failed`)
pub fn record_store(result: &str) {
    CACHE_STORES.with_label_values(&[result]).inc();
}

/// Helper to record a live fetch
pub fn record_network_fetch(success: bool, duration_secs: f64) {
    let result = if success { "success" } else { "failure" };
    NETWORK_FETCHES.with_label_values(&[result]).inc();
    NETWORK_FETCH_DURATION
        .with_label_values(&[result])
        .observe(duration_secs);
}

pub fn record_fallback(served: bool) {
    let result = if served { "served" } else { "missing" };
    OFFLINE_FALLBACKS.with_label_values(&[result]).inc();
}

pub fn record_install(success: bool) {
    let result = if success { "success" } else { "failure" };
    INSTALLS.with_label_values(&[result]).inc();
}
