// Buffered response type
// Author: kelexine (https://github.com/kelexine)

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A response whose body has been read into memory.
///
/// Network bodies can only be consumed once. Buffering them into `Bytes`
/// lets the fetch path hand one copy to the caller and store another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

/// On-disk metadata for a cached response; the body is stored separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl CachedResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Independent readable copy of this response.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// 2xx status.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Partial responses cannot be stored.
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn head(&self) -> ResponseHead {
        ResponseHead {
            status: self.status,
            headers: self.headers.clone(),
        }
    }

    pub fn from_parts(head: ResponseHead, body: Bytes) -> Self {
        Self {
            status: head.status,
            headers: head.headers,
            body,
        }
    }
}
