//! HTTP transport module
//!
//! The pagination and GraphQL layers only see the [`Transport`] trait: one
//! request in, one decoded [`ApiResponse`] (or a classified error) out.
//! [`HttpClient`] is the reqwest-backed implementation.
//!
//! # Features
//!
//! - **Base URL joining**: endpoints are paths relative to the configured host
//! - **Query merging**: option parameters replace same-named endpoint parameters
//! - **Rate-limit telemetry**: `X-RateLimit-*` headers are logged on every response
//! - **Failure shaping**: non-2xx statuses and interrupted bodies become typed errors

mod client;
mod response;
mod transport;

pub use client::HttpClient;
pub use response::{minutes_to_reset, ApiResponse, RateLimitSnapshot};
pub use transport::{RequestOptions, Transport};
