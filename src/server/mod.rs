//! HTTP host for the offline cache handler.
//!
//! The server plays the part of the browser: it runs the install signal
//! before accepting connections, then turns every incoming request into a
//! fetch signal.
//!
//! # Components
//!
//! - `handlers`: fetch delivery plus the health and metrics endpoints.
//! - `middleware`: request ID tracking.
//! - `routes`: the router that ties everything together.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod handlers;
mod middleware;
mod routes;

pub use handlers::{BucketSummary, HealthResponse, HealthStatus, SOURCE_HEADER};
pub use routes::{create_router, AppState, CONTROL_PREFIX};
