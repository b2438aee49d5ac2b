//! REST traversal over `next` relation links

use super::links::LinkResolver;
use crate::error::{Error, Result};
use crate::http::{ApiResponse, RequestOptions, Transport};
use crate::retry::RetryPolicy;
use crate::types::Method;
use futures::Stream;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Drives one collection traversal through a transport.
///
/// Every request is guarded individually by the REST retry policy.
#[derive(Clone, Copy)]
pub struct RestPager<'a> {
    transport: &'a dyn Transport,
    retry: &'a RetryPolicy,
    links: &'a LinkResolver,
}

impl<'a> RestPager<'a> {
    /// Create a pager over a transport
    pub fn new(
        transport: &'a dyn Transport,
        retry: &'a RetryPolicy,
        links: &'a LinkResolver,
    ) -> Self {
        Self {
            transport,
            retry,
            links,
        }
    }

    /// The link resolver in use
    pub fn links(&self) -> &'a LinkResolver {
        self.links
    }

    /// One retried GET
    pub async fn get(&self, endpoint: &str, options: &RequestOptions) -> Result<ApiResponse> {
        let transport = self.transport;
        self.retry
            .run(move || transport.request(Method::GET, endpoint, options))
            .await
    }

    /// Follow `next` links from `endpoint` and return every item in order.
    ///
    /// A response without a body ends the traversal with what was collected
    /// so far. The same options are sent with every page.
    pub async fn fetch_all(&self, endpoint: &str, options: &RequestOptions) -> Result<Vec<Value>> {
        debug!("get items from: {endpoint}");
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(endpoint.to_string());

        while let Some(current) = next.take() {
            let response = self.get(&current, options).await?;
            if !response.has_body() {
                debug!("empty response from {current}");
                break;
            }

            next = self.links.resolve_next(&response.links)?;
            visited.insert(current);
            items.extend(response.into_batch());

            if let Some(ref endpoint) = next {
                if visited.contains(endpoint) {
                    warn!("next link {endpoint} was already fetched, stopping");
                    next = None;
                }
            }
        }

        debug!("no more pages to retrieve, {} items", items.len());
        Ok(items)
    }

    /// Lazily walk the collection one page at a time
    pub fn stream_pages(&self, endpoint: &str, options: RequestOptions) -> PageStream<'a> {
        PageStream {
            pager: *self,
            next: Some(endpoint.to_string()),
            options,
            visited: HashSet::new(),
        }
    }
}

/// Pull-based page sequence.
///
/// The request for a page is only issued when [`next_page`](Self::next_page)
/// is called. Dropping the stream abandons the traversal. It cannot be
/// restarted; call [`RestPager::stream_pages`] again instead.
pub struct PageStream<'a> {
    pager: RestPager<'a>,
    next: Option<String>,
    options: RequestOptions,
    visited: HashSet<String>,
}

impl<'a> PageStream<'a> {
    /// Fetch the next page, `None` once the collection is exhausted.
    ///
    /// An error ends the stream.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(current) = self.next.take() else {
            return Ok(None);
        };

        let response = self.pager.get(&current, &self.options).await?;
        if !response.has_body() {
            debug!("empty response from {current}");
            return Ok(None);
        }

        let next = self.pager.links.resolve_next(&response.links)?;
        self.visited.insert(current);
        self.next = match next {
            Some(endpoint) if self.visited.contains(&endpoint) => {
                warn!("next link {endpoint} was already fetched, stopping");
                None
            }
            Some(endpoint) => Some(endpoint),
            None => {
                debug!("no more pages");
                None
            }
        };

        Ok(Some(response.into_batch()))
    }

    /// Whether another page may follow
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Number of pages produced so far
    pub fn pages_fetched(&self) -> usize {
        self.visited.len()
    }

    /// Adapt into a [`Stream`] of batches
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Value>>> + 'a {
        futures::stream::try_unfold(self, |mut pages| async move {
            let batch = pages.next_page().await?;
            Ok::<_, Error>(batch.map(|batch| (batch, pages)))
        })
    }
}

/// Keep only the listed keys of each object item.
///
/// Keys an item lacks are skipped. Without a key list the items are returned
/// unchanged.
pub fn filter_keys<S: AsRef<str>>(items: Vec<Value>, keys: Option<&[S]>) -> Vec<Value> {
    let Some(keys) = keys else {
        return items;
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(object) => {
                let filtered: Map<String, Value> = keys
                    .iter()
                    .filter_map(|key| {
                        let key = key.as_ref();
                        object.get(key).map(|v| (key.to_string(), v.clone()))
                    })
                    .collect();
                Value::Object(filtered)
            }
            other => other,
        })
        .collect()
}
