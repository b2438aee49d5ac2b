//! Error types for github-api-core
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for github-api-core
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Unusable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// A single configuration value was rejected
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue {
        /// Name of the offending field
        field: String,
        /// Why it was rejected
        message: String,
    },

    /// Config file is not valid YAML
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Local file access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Caller Errors
    // ============================================================================
    /// The caller passed an endpoint the operation cannot accept
    #[error("Invalid endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// Endpoint as given
        endpoint: String,
        /// Why it was rejected
        message: String,
    },

    /// A GraphQL response lacks a key on the requested result path
    #[error("Result path '{path}' has no key '{key}'")]
    ResultPath {
        /// Dot path below `data`
        path: String,
        /// First key that was missing
        key: String,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    /// Request could not be sent or answered
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Response body as text
        body: String,
        /// Set when the response reported no remaining request quota
        quota_exhausted: bool,
    },

    /// The response body transfer was cut short
    #[error("Transfer interrupted: {message}")]
    TransferInterrupted {
        /// Underlying transport message
        message: String,
    },

    /// Response body is not valid JSON
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Endpoint and base URL do not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // GraphQL Errors
    // ============================================================================
    /// GraphQL response carried a `RATE_LIMITED` error
    #[error("GraphQL rate limited: {message}")]
    GraphqlRateLimited {
        /// Message reported by the server
        message: String,
    },

    /// GraphQL response carried any other error
    #[error("GraphQL error: {message}")]
    Graphql {
        /// Message of the first reported error
        message: String,
        /// Its `type`, when present
        error_type: Option<String>,
    },

    // ============================================================================
    // Pagination Contract Errors
    // ============================================================================
    /// A relation link points away from the configured base URL
    #[error("Link '{url}' points outside of '{base_url}'")]
    CrossHostLink {
        /// Link target
        url: String,
        /// Configured base URL
        base_url: String,
    },

    /// The `last` link has no usable page number
    #[error("Cannot read a page number from last link '{link}'")]
    UnparsableLastPage {
        /// Endpoint taken from the link
        link: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Anything else, usually an error with added context
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input from the caller
    Caller,
    /// Transfer aborted mid-response
    TransientNetwork,
    /// Request quota exhausted (REST 403 or GraphQL `RATE_LIMITED`)
    RateLimit,
    /// Any other failure reported by the server or its payload
    Upstream,
    /// The server broke an assumption of the pagination contract
    ProtocolAddressing,
    /// Local failures unrelated to the API
    Internal,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid endpoint error
    pub fn invalid_endpoint(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
            quota_exhausted: false,
        }
    }

    /// Create an interrupted transfer error
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::TransferInterrupted {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::InvalidConfigValue { .. }
            | Error::InvalidEndpoint { .. }
            | Error::ResultPath { .. } => ErrorKind::Caller,
            Error::TransferInterrupted { .. } => ErrorKind::TransientNetwork,
            Error::GraphqlRateLimited { .. } => ErrorKind::RateLimit,
            Error::HttpStatus { .. } if self.is_rate_limit_status() => ErrorKind::RateLimit,
            Error::HttpStatus { .. }
            | Error::Http(_)
            | Error::JsonParse(_)
            | Error::Graphql { .. } => ErrorKind::Upstream,
            Error::CrossHostLink { .. } | Error::UnparsableLastPage { .. } => {
                ErrorKind::ProtocolAddressing
            }
            Error::YamlParse(_) | Error::Io(_) | Error::InvalidUrl(_) | Error::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if this is a 403 caused by an exhausted request quota rather
    /// than by missing permissions
    pub fn is_rate_limit_status(&self) -> bool {
        match self {
            Error::HttpStatus {
                status: 403,
                body,
                quota_exhausted,
            } => *quota_exhausted || body.to_lowercase().contains("rate limit"),
            _ => false,
        }
    }
}

/// Result type alias for github-api-core
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
