//! Value types shared between the cache, the network client and the handler.
//!
//! - `request`: the intercepted request and the key it is stored under.
//! - `response`: a fully buffered response that can be duplicated.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod request;
pub mod response;

pub use request::{FetchRequest, RequestKey};
pub use response::CachedResponse;
