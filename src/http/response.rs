//! Decoded responses and rate-limit telemetry

use crate::pagination::RelationSet;
use crate::types::into_batch;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::debug;

/// One decoded API response
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Relations parsed from the `Link` header
    pub links: RelationSet,
    /// Decoded JSON body, `None` when the body was empty
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Build a response from its parts, parsing the `Link` header
    pub fn new(status: u16, headers: HeaderMap, body: Option<Value>) -> Self {
        let links = RelationSet::from_headers(&headers);
        Self {
            status,
            headers,
            links,
            body,
        }
    }

    /// The decoded body
    pub fn json(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Whether the response carried a body
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Consume the response into the items of one page
    pub fn into_batch(self) -> Vec<Value> {
        into_batch(self.body)
    }
}

/// Request quota as reported by `X-RateLimit-*` headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// Requests left in the current window
    pub remaining: u64,
    /// Size of the window
    pub limit: u64,
    /// Whole minutes until the window resets
    pub minutes_to_reset: i64,
}

impl RateLimitSnapshot {
    /// Read the snapshot from response headers.
    ///
    /// Returns `None` when the reset header is absent or any value is not a
    /// number.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Self::from_headers_at(headers, Utc::now())
    }

    /// Same as [`from_headers`](Self::from_headers) with an explicit clock
    pub fn from_headers_at(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Self> {
        let reset = header_number(headers, "x-ratelimit-reset")?;
        Some(Self {
            remaining: header_number(headers, "x-ratelimit-remaining")?,
            limit: header_number(headers, "x-ratelimit-limit")?,
            minutes_to_reset: minutes_to_reset(reset as i64, now),
        })
    }

    /// Emit the snapshot at debug level
    pub fn log(&self) {
        debug!(
            "{}/{} resets in {} min",
            self.remaining, self.limit, self.minutes_to_reset
        );
    }
}

/// Whole minutes between `now` and the epoch second `reset`, truncated
pub fn minutes_to_reset(reset: i64, now: DateTime<Utc>) -> i64 {
    match DateTime::from_timestamp(reset, 0) {
        Some(reset_at) => (reset_at - now).num_minutes(),
        None => 0,
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
