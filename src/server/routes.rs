// HTTP routes configuration
// Author: kelexine (https://github.com/kelexine)

use super::handlers::{fetch_handler, health_handler, metrics_handler};
use super::middleware::request_id_layers;
use crate::worker::OfflineCacheHandler;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Paths under this prefix are answered by the host itself and never
/// reach the fetch handler.
pub const CONTROL_PREFIX: &str = "/_offline-cache";

#[derive(Clone)]
pub struct AppState {
    pub handler: OfflineCacheHandler,
}

/// Build the host router. Every request not aimed at a control endpoint
/// is delivered to the handler as a fetch signal.
pub fn create_router(handler: OfflineCacheHandler) -> Router {
    let state = AppState { handler };

    let (set_request_id, propagate_request_id) = request_id_layers();

    Router::new()
        .route(&format!("{}/health", CONTROL_PREFIX), get(health_handler))
        .route(&format!("{}/metrics", CONTROL_PREFIX), get(metrics_handler))
        .fallback(fetch_handler)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state)
}
