// Prometheus metrics registry and collectors
// Author: kelexine (https://github.com/kelexine)

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache lookups for intercepted requests
    pub static ref CACHE_LOOKUPS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_lookups_total", "Total cache lookups for intercepted requests"),
        &["outcome"], // outcome: hit, miss
        REGISTRY
    ).unwrap();

    /// Writes of fetched responses into the bucket
    pub static ref CACHE_STORES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_stores_total", "Total attempts to store a fetched response"),
        &["result"], // result: stored, skipped, failed
        REGISTRY
    ).unwrap();

    // ============================================================================
    // NETWORK METRICS
    // ============================================================================

    /// Live fetches issued on cache miss
    pub static ref NETWORK_FETCHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("network_fetches_total", "Total live network fetches"),
        &["result"], // result: success, failure
        REGISTRY
    ).unwrap();

    /// Live fetch duration
    pub static ref NETWORK_FETCH_DURATION: HistogramVec = register_histogram_vec_with_registry!(
        HistogramOpts::new("network_fetch_duration_seconds", "Live network fetch duration")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["result"],
        REGISTRY
    ).unwrap();

    /// Offline fallback responses
    pub static ref OFFLINE_FALLBACKS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("offline_fallbacks_total", "Total offline fallback attempts"),
        &["result"], // result: served, missing
        REGISTRY
    ).unwrap();

    // ============================================================================
    // LIFECYCLE METRICS
    // ============================================================================

    /// Install signal outcomes
    pub static ref INSTALLS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("installs_total", "Total install attempts"),
        &["result"], // result: success, failure
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
