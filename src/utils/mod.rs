//! Utility functions and helpers for offline-cache.
//!
//! # Submodules
//!
//! - `logging`: Tracing and logging initialization.
//! - `retry`: Backoff-driven retry of whole install attempts.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
pub mod retry;
