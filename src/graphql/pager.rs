//! Single and cursor-paged GraphQL calls

use super::query::prepare_query;
use super::types::{check_errors, GraphqlPayload};
use crate::error::{Error, Result};
use crate::http::{ApiResponse, RequestOptions, Transport};
use crate::retry::RetryPolicy;
use crate::types::Method;
use futures::Stream;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Position within a GraphQL connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    /// Server-issued cursor, `None` before the first page
    pub cursor: Option<String>,
    /// Edges requested per page
    pub page_size: u32,
}

impl CursorState {
    /// State before the first page
    pub fn new(page_size: u32) -> Self {
        Self {
            cursor: None,
            page_size,
        }
    }

    /// State after adopting `cursor`
    #[must_use]
    pub fn advance(&self, cursor: impl Into<String>) -> Self {
        Self {
            cursor: Some(cursor.into()),
            page_size: self.page_size,
        }
    }

    /// Variables for the next request: `page_size` unless the caller set
    /// one, and `cursor` once a cursor is known
    pub fn variables(&self, base: &Value) -> Value {
        let mut variables = base.as_object().cloned().unwrap_or_else(Map::new);
        variables
            .entry("page_size")
            .or_insert_with(|| Value::from(self.page_size));
        match &self.cursor {
            Some(cursor) => {
                variables.insert("cursor".to_string(), Value::String(cursor.clone()));
            }
            None => {
                variables.remove("cursor");
            }
        }
        Value::Object(variables)
    }
}

/// Issues GraphQL queries through a transport.
///
/// The POST itself is guarded by the REST retry rules; `retry` holds the
/// rules that guard a whole call.
#[derive(Clone, Copy)]
pub struct GraphqlPager<'a> {
    transport: &'a dyn Transport,
    rest_retry: &'a RetryPolicy,
    retry: &'a RetryPolicy,
    endpoint: &'a str,
    page_size: u32,
}

impl<'a> GraphqlPager<'a> {
    /// Create a pager posting to `endpoint`
    pub fn new(
        transport: &'a dyn Transport,
        rest_retry: &'a RetryPolicy,
        retry: &'a RetryPolicy,
        endpoint: &'a str,
        page_size: u32,
    ) -> Self {
        Self {
            transport,
            rest_retry,
            retry,
            endpoint,
            page_size,
        }
    }

    /// Send one query.
    ///
    /// The cursor fragments are stripped while `variables` has no cursor.
    /// An `errors` array in the response becomes `GraphqlRateLimited` or
    /// `Graphql`.
    pub async fn run_once(&self, query: &str, variables: &Value) -> Result<ApiResponse> {
        let has_cursor = variables.get("cursor").is_some_and(|c| !c.is_null());
        let query = prepare_query(query, has_cursor);

        let mut variables = variables.clone();
        if !has_cursor {
            if let Some(map) = variables.as_object_mut() {
                map.remove("cursor");
            }
        }

        let payload = GraphqlPayload {
            query: &query,
            variables: &variables,
        };
        let options = RequestOptions::new().json(serde_json::to_value(payload)?);

        let transport = self.transport;
        let endpoint = self.endpoint;
        let options = &options;
        let response = self
            .rest_retry
            .run(move || transport.request(Method::POST, endpoint, options))
            .await?;

        check_errors(response.json())?;
        Ok(response)
    }

    /// [`run_once`](Self::run_once) retried as a whole on GraphQL rate limits
    pub async fn call(&self, query: &str, variables: &Value) -> Result<ApiResponse> {
        let pager = self;
        self.retry
            .run(move || pager.run_once(query, variables))
            .await
    }

    /// Lazily walk the connection at `result_path` (dot separated, relative
    /// to `data`), one list of edges per page.
    ///
    /// A string `cursor` in `variables` is used as the starting position.
    pub fn run_paged(&self, query: &str, variables: Value, result_path: &str) -> GraphqlPages<'a> {
        let mut initial = CursorState::new(self.page_size);
        if let Some(cursor) = variables.get("cursor").and_then(Value::as_str) {
            initial = initial.advance(cursor);
        }

        GraphqlPages {
            pager: *self,
            query: query.to_string(),
            variables,
            result_path: result_path.to_string(),
            state: Some(initial.clone()),
            initial,
            attempt: 1,
        }
    }
}

/// Pull-based sequence of edge lists.
///
/// A GraphQL rate-limit failure at any page restarts the traversal from its
/// initial cursor, so edges already produced may be produced again. The
/// attempt count spans the whole traversal.
pub struct GraphqlPages<'a> {
    pager: GraphqlPager<'a>,
    query: String,
    variables: Value,
    result_path: String,
    initial: CursorState,
    state: Option<CursorState>,
    attempt: u32,
}

impl<'a> GraphqlPages<'a> {
    /// Fetch the next page of edges, `None` once `hasNextPage` was false
    pub async fn next_edges(&mut self) -> Result<Option<Vec<Value>>> {
        loop {
            let Some(state) = self.state.clone() else {
                return Ok(None);
            };

            match self.step(&state).await {
                Ok((edges, end_cursor)) => {
                    self.state = match end_cursor {
                        Some(cursor) if state.cursor.as_deref() == Some(cursor.as_str()) => {
                            warn!("endCursor {cursor} did not advance, stopping");
                            None
                        }
                        Some(cursor) => Some(state.advance(cursor)),
                        None => {
                            debug!("no more pages for {}", self.result_path);
                            None
                        }
                    };
                    return Ok(Some(edges));
                }
                Err(err) => {
                    let retry = self.pager.retry;
                    let decision = retry.classify(&err);
                    if !decision.allows(self.attempt) {
                        self.state = None;
                        return Err(err);
                    }
                    retry.pause(&decision, self.attempt).await;
                    self.attempt += 1;
                    debug!("restarting paged query for {} from its first page", self.result_path);
                    self.state = Some(self.initial.clone());
                }
            }
        }
    }

    /// Current cursor state, `None` once the traversal ended
    pub fn cursor(&self) -> Option<&CursorState> {
        self.state.as_ref()
    }

    /// Adapt into a [`Stream`] of edge lists
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Value>>> + 'a {
        futures::stream::try_unfold(self, |mut pages| async move {
            let edges = pages.next_edges().await?;
            Ok::<_, Error>(edges.map(|edges| (edges, pages)))
        })
    }

    /// Fetch one page: its edges and the cursor of the following page
    async fn step(&self, state: &CursorState) -> Result<(Vec<Value>, Option<String>)> {
        let variables = state.variables(&self.variables);
        let response = self.pager.run_once(&self.query, &variables).await?;

        let segments: Vec<&str> = self
            .result_path
            .split('.')
            .filter(|s| !s.is_empty())
            .collect();
        let Some((last, parent)) = segments.split_last() else {
            return Err(self.missing(""));
        };

        let data = response
            .json()
            .and_then(|body| body.get("data"))
            .ok_or_else(|| self.missing("data"))?;

        let edges = self
            .lookup(data, &segments)?
            .as_array()
            .cloned()
            .ok_or_else(|| self.missing(last))?;

        let page_info = self
            .lookup(data, parent)?
            .get("pageInfo")
            .ok_or_else(|| self.missing("pageInfo"))?;

        let has_next = page_info
            .get("hasNextPage")
            .and_then(Value::as_bool)
            .ok_or_else(|| self.missing("hasNextPage"))?;

        let end_cursor = if has_next {
            let cursor = page_info
                .get("endCursor")
                .and_then(Value::as_str)
                .ok_or_else(|| self.missing("endCursor"))?;
            Some(cursor.to_string())
        } else {
            None
        };

        Ok((edges, end_cursor))
    }

    fn lookup<'v>(&self, root: &'v Value, segments: &[&str]) -> Result<&'v Value> {
        segments.iter().try_fold(root, |node, key| {
            node.get(*key).ok_or_else(|| self.missing(key))
        })
    }

    fn missing(&self, key: &str) -> Error {
        Error::ResultPath {
            path: self.result_path.clone(),
            key: key.to_string(),
        }
    }
}
