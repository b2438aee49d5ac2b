//! Common types used throughout github-api-core
//!
//! This module contains shared type definitions and type aliases
//! used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read a resource
    #[default]
    GET,
    /// Submit a body (GraphQL queries)
    POST,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::GET => write!(f, "GET"),
            Method::POST => write!(f, "POST"),
        }
    }
}

// ============================================================================
// Paging Directive
// ============================================================================

/// How a `get` call walks the collection behind an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageMode {
    /// One request, raw response
    #[default]
    Single,
    /// Follow every `next` link and return one flattened list
    All,
    /// Lazily produce one batch per page
    Page,
}

// ============================================================================
// Page Batches
// ============================================================================

/// Turn a decoded response body into the items of one page.
///
/// Lists are flattened, a single object becomes a one-item batch and an
/// absent or `null` body is the empty batch.
pub fn into_batch(body: Option<JsonValue>) -> Vec<JsonValue> {
    match body {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => items,
        Some(other) => vec![other],
    }
}
