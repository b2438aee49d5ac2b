//! Relation links (RFC 8288)
//!
//! Format: `Link: <https://api.github.com/...?page=2>; rel="next", <...>; rel="last"`

use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, LINK};
use std::collections::HashMap;
use tracing::debug;

/// Relation name → target URL, parsed from one `Link` header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationSet {
    relations: HashMap<String, String>,
}

impl RelationSet {
    /// Parse a `Link` header value.
    ///
    /// Malformed entries are skipped. When a relation appears twice the first
    /// target wins.
    pub fn parse(header: &str) -> Self {
        let mut relations = HashMap::new();

        for part in split_entries(header) {
            let mut url = None;
            let mut rels = Vec::new();

            for segment in part.split(';') {
                let segment = segment.trim();
                if segment.starts_with('<') && segment.ends_with('>') {
                    url = Some(&segment[1..segment.len() - 1]);
                } else if let Some(stripped) = segment.strip_prefix("rel=") {
                    let value = stripped.trim_matches('"').trim_matches('\'');
                    rels.extend(value.split_whitespace());
                }
            }

            if let Some(u) = url {
                for rel in rels {
                    relations
                        .entry(rel.to_string())
                        .or_insert_with(|| u.to_string());
                }
            }
        }

        Self { relations }
    }

    /// Parse the `Link` header of a response, empty when absent
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// Target URL of a relation
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.relations.get(rel).map(String::as_str)
    }

    /// Whether the relation is present
    pub fn contains(&self, rel: &str) -> bool {
        self.relations.contains_key(rel)
    }

    /// Number of relations
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Whether no relation was advertised
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RelationSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            relations: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Split on commas that are not inside `<...>`
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(header[start..].trim());
    entries.retain(|e| !e.is_empty());
    entries
}

/// Turns relation targets into endpoints relative to the API base URL
#[derive(Debug, Clone)]
pub struct LinkResolver {
    base_url: String,
}

impl LinkResolver {
    /// Create a resolver for links under `base_url`
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    /// The base URL prefix stripped from link targets
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint of the `next` page, `None` on the last page
    pub fn resolve_next(&self, relations: &RelationSet) -> Result<Option<String>> {
        self.resolve(relations, "next")
    }

    /// Endpoint of the `last` page, `None` when the collection fits one page
    pub fn resolve_last(&self, relations: &RelationSet) -> Result<Option<String>> {
        self.resolve(relations, "last")
    }

    /// Endpoint of any relation
    pub fn resolve(&self, relations: &RelationSet, rel: &str) -> Result<Option<String>> {
        match relations.get(rel) {
            Some(url) => {
                let endpoint = self.endpoint_from_url(url)?;
                debug!("found {rel} endpoint in link header: {endpoint}");
                Ok(Some(endpoint))
            }
            None => {
                debug!("{rel} endpoint not found in link header");
                Ok(None)
            }
        }
    }

    /// Strip the base URL from an absolute link target.
    ///
    /// Targets already relative (`/path`) pass through; targets on another
    /// host are rejected.
    pub fn endpoint_from_url(&self, url: &str) -> Result<String> {
        if url.starts_with('/') {
            return Ok(url.to_string());
        }

        match url.strip_prefix(&self.base_url) {
            Some("") => Ok("/".to_string()),
            Some(rest) if rest.starts_with('/') => Ok(rest.to_string()),
            Some(rest) if rest.starts_with('?') => Ok(format!("/{rest}")),
            _ => Err(Error::CrossHostLink {
                url: url.to_string(),
                base_url: self.base_url.clone(),
            }),
        }
    }
}

/// First value of a query parameter of an endpoint or URL
pub fn query_value(endpoint: &str, key: &str) -> Option<String> {
    let (_, query) = endpoint.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// `page` query value, `None` when absent or not a number
pub fn page_from_endpoint(endpoint: &str) -> Option<u64> {
    query_value(endpoint, "page").and_then(|v| v.parse().ok())
}

/// `per_page` query value, [`DEFAULT_PAGE_SIZE`] when absent or not a number
pub fn per_page_from_endpoint(endpoint: &str) -> u64 {
    query_value(endpoint, "per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
}
