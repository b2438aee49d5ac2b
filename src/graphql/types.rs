//! GraphQL wire types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error type GitHub reports when the GraphQL quota is exhausted
pub const RATE_LIMITED: &str = "RATE_LIMITED";

/// Request body of a GraphQL call
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlPayload<'a> {
    /// Query text
    pub query: &'a str,
    /// Variables object
    pub variables: &'a Value,
}

/// One entry of a response's `errors` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Machine-readable kind, e.g. `RATE_LIMITED`
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Response path the error refers to
    #[serde(default)]
    pub path: Vec<Value>,
    /// Query locations the error refers to
    #[serde(default)]
    pub locations: Vec<Value>,
}

impl GraphqlErrorEntry {
    /// Whether this entry reports an exhausted quota
    pub fn is_rate_limited(&self) -> bool {
        self.error_type.as_deref() == Some(RATE_LIMITED)
    }
}

/// Turn an `errors` array in a response body into an error.
///
/// A `RATE_LIMITED` entry anywhere in the array wins over other entries;
/// otherwise the first entry's message is reported.
pub fn check_errors(body: Option<&Value>) -> Result<()> {
    let Some(errors) = body
        .and_then(|b| b.get("errors"))
        .filter(|e| !e.is_null())
    else {
        return Ok(());
    };

    let entries: Vec<GraphqlErrorEntry> = serde_json::from_value(errors.clone())?;
    let Some(first) = entries.first() else {
        return Ok(());
    };

    if let Some(limited) = entries.iter().find(|e| e.is_rate_limited()) {
        return Err(Error::GraphqlRateLimited {
            message: limited.message.clone(),
        });
    }

    Err(Error::Graphql {
        message: first.message.clone(),
        error_type: first.error_type.clone(),
    })
}
