//! Client configuration
//!
//! `ClientConfig` can be deserialized from YAML, overridden from the
//! environment (`GH_BASE_URL`, `GH_TOKEN_PSW`) and adjusted with a builder.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Public GitHub API host
pub const DEFAULT_HOSTNAME: &str = "api.github.com";

/// Page size GitHub applies when a request carries no `per_page`
pub const DEFAULT_PAGE_SIZE: u64 = 30;

/// Environment variable holding the API host or base URL
pub const BASE_URL_ENV: &str = "GH_BASE_URL";

/// Environment variable holding the bearer token
pub const TOKEN_ENV: &str = "GH_TOKEN_PSW";

/// Configuration for a [`GithubApi`](crate::GithubApi) client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint is joined to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Media type version sent in the `Accept` header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Endpoint receiving GraphQL queries
    #[serde(default = "default_graphql_endpoint")]
    pub graphql_endpoint: String,

    /// Edges requested per GraphQL page
    #[serde(default = "default_graphql_page_size")]
    pub graphql_page_size: u32,

    /// Retry bounds
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Wait and attempt bounds for each retry rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Wait after a quota-exhausted 403, in milliseconds
    #[serde(default = "default_rate_limit_wait_ms")]
    pub rate_limit_wait_ms: u64,

    /// Attempts allowed while rate limited
    #[serde(default = "default_rate_limit_attempts")]
    pub rate_limit_max_attempts: u32,

    /// Wait after an interrupted transfer, in milliseconds
    #[serde(default = "default_transfer_wait_ms")]
    pub transfer_wait_ms: u64,

    /// Attempts allowed for interrupted transfers
    #[serde(default = "default_transfer_attempts")]
    pub transfer_max_attempts: u32,

    /// Wait after a GraphQL `RATE_LIMITED` error, in milliseconds
    #[serde(default = "default_rate_limit_wait_ms")]
    pub graphql_wait_ms: u64,

    /// Attempts allowed for GraphQL rate limiting
    #[serde(default = "default_rate_limit_attempts")]
    pub graphql_max_attempts: u32,
}

fn default_base_url() -> String {
    format!("https://{DEFAULT_HOSTNAME}")
}

fn default_api_version() -> String {
    "v3".to_string()
}

fn default_user_agent() -> String {
    format!("github-api-core/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

fn default_graphql_endpoint() -> String {
    "/graphql".to_string()
}

fn default_graphql_page_size() -> u32 {
    100
}

fn default_rate_limit_wait_ms() -> u64 {
    60_000
}

fn default_rate_limit_attempts() -> u32 {
    60
}

fn default_transfer_wait_ms() -> u64 {
    10_000
}

fn default_transfer_attempts() -> u32 {
    120
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            rate_limit_wait_ms: default_rate_limit_wait_ms(),
            rate_limit_max_attempts: default_rate_limit_attempts(),
            transfer_wait_ms: default_transfer_wait_ms(),
            transfer_max_attempts: default_transfer_attempts(),
            graphql_wait_ms: default_rate_limit_wait_ms(),
            graphql_max_attempts: default_rate_limit_attempts(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            api_version: default_api_version(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            graphql_endpoint: default_graphql_endpoint(),
            graphql_page_size: default_graphql_page_size(),
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default config with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML config document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `GH_BASE_URL` and `GH_TOKEN_PSW`
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = normalize_base_url(&base);
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
    }

    /// Check the config for values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::invalid_value("base_url", "must not be empty"));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(Error::invalid_value(
                "base_url",
                format!("'{}' is not an absolute URL", self.base_url),
            ));
        }
        if self.graphql_page_size == 0 {
            return Err(Error::invalid_value("graphql_page_size", "must be positive"));
        }
        let caps = [
            ("retry.rate_limit_max_attempts", self.retry.rate_limit_max_attempts),
            ("retry.transfer_max_attempts", self.retry.transfer_max_attempts),
            ("retry.graphql_max_attempts", self.retry.graphql_max_attempts),
        ];
        for (field, value) in caps {
            if value == 0 {
                return Err(Error::invalid_value(field, "must allow at least one attempt"));
            }
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Value of the `Accept` header
    pub fn accept_header(&self) -> String {
        format!("application/vnd.github.{}+json", self.api_version)
    }
}

/// Accept either a bare host (`api.github.com`) or a full URL.
pub fn normalize_base_url(value: &str) -> String {
    let value = value.trim().trim_end_matches('/');
    if value.starts_with("http://") || value.starts_with("https://") {
        value.to_string()
    } else {
        format!("https://{value}")
    }
}

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL (bare hosts get `https://`)
    pub fn base_url(mut self, url: impl AsRef<str>) -> Self {
        self.config.base_url = normalize_base_url(url.as_ref());
        self
    }

    /// Set the bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Set the API media type version
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs();
        self
    }

    /// Set the GraphQL endpoint
    pub fn graphql_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.graphql_endpoint = endpoint.into();
        self
    }

    /// Set the GraphQL page size
    pub fn graphql_page_size(mut self, size: u32) -> Self {
        self.config.graphql_page_size = size;
        self
    }

    /// Set wait and cap for quota-exhausted 403 responses
    pub fn rate_limit_retry(mut self, wait: Duration, max_attempts: u32) -> Self {
        self.config.retry.rate_limit_wait_ms = wait.as_millis() as u64;
        self.config.retry.rate_limit_max_attempts = max_attempts;
        self
    }

    /// Set wait and cap for interrupted transfers
    pub fn transfer_retry(mut self, wait: Duration, max_attempts: u32) -> Self {
        self.config.retry.transfer_wait_ms = wait.as_millis() as u64;
        self.config.retry.transfer_max_attempts = max_attempts;
        self
    }

    /// Set wait and cap for GraphQL rate limiting
    pub fn graphql_retry(mut self, wait: Duration, max_attempts: u32) -> Self {
        self.config.retry.graphql_wait_ms = wait.as_millis() as u64;
        self.config.retry.graphql_max_attempts = max_attempts;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
