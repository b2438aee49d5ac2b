//! The single-request seam
//!
//! Everything above this module issues requests through [`Transport`], so
//! pagers can be driven by the real client or by a scripted one in tests.

use super::response::ApiResponse;
use crate::error::Result;
use crate::types::Method;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Issues exactly one request and decodes its response.
///
/// Implementations must return `Error::HttpStatus` for non-2xx responses and
/// `Error::TransferInterrupted` when the body transfer is cut short, so the
/// retry layer can classify failures.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `method` to `endpoint` with the given options
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse>;
}

/// Configuration for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create new request options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
