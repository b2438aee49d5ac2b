//! reqwest-backed transport
//!
//! Provides the concrete single-request primitive:
//! - Base URL joining and query merging
//! - GitHub `Accept` media type and bearer authentication
//! - Rate-limit telemetry on every response
//! - Error shaping for retry classification

use super::response::{ApiResponse, RateLimitSnapshot};
use super::transport::{RequestOptions, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::Method;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::Client;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// HTTP client issuing one request per call
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// The client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the full URL for an endpoint.
    ///
    /// Absolute URLs are used as is. Option query parameters replace any
    /// same-named parameter already present on the endpoint.
    pub fn build_url(&self, endpoint: &str, query: &HashMap<String, String>) -> Result<Url> {
        let full = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            let base = self.config.base_url.trim_end_matches('/');
            let path = endpoint.trim_start_matches('/');
            format!("{base}/{path}")
        };

        let mut url = Url::parse(&full)?;
        if !query.is_empty() {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(key, _)| !query.contains_key(key.as_ref()))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();

            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            pairs.extend_pairs(kept);
            pairs.extend_pairs(query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse> {
        let url = self.build_url(endpoint, &options.query)?;
        debug!("{} {}", method, url);

        let mut req = self
            .client
            .request(method.into(), url.clone())
            .header(ACCEPT, self.config.accept_header());

        if let Some(ref token) = self.config.token {
            req = req.bearer_auth(token);
        }

        for (key, value) in &options.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(ref body) = options.body {
            req = req.json(body);
        }

        if let Some(timeout) = options.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();

        if let Some(snapshot) = RateLimitSnapshot::from_headers(&headers) {
            snapshot.log();
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_body() || e.is_decode() {
                Error::interrupted(e.to_string())
            } else {
                Error::Http(e)
            }
        })?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
                quota_exhausted: quota_exhausted(&headers),
            });
        }

        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(serde_json::from_slice(&bytes)?)
        };

        debug!("Request succeeded: {} {} ({})", method, url, status.as_u16());
        Ok(ApiResponse::new(status.as_u16(), headers, body))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("has_token", &self.config.token.is_some())
            .finish_non_exhaustive()
    }
}

/// Check if the response reported zero remaining requests
fn quota_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}
