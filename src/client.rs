//! `GithubApi` - entry point composing the transport, pagers and retry rules

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::graphql::{GraphqlPager, GraphqlPages};
use crate::http::{ApiResponse, HttpClient, RequestOptions, Transport};
use crate::pagination::{filter_keys, LinkResolver, PageStream, RestPager, TotalEstimator};
use crate::retry::{RetryPolicy, RetryRule};
use crate::types::{Method, PageMode};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Result of [`GithubApi::get`]
pub enum GetOutput<'a> {
    /// Raw response of a single request
    Response(ApiResponse),
    /// Every item of every page, in order
    Items(Vec<Value>),
    /// Lazy page-by-page traversal
    Pages(PageStream<'a>),
}

impl<'a> GetOutput<'a> {
    /// The raw response, if this was a single request
    pub fn into_response(self) -> Option<ApiResponse> {
        match self {
            GetOutput::Response(response) => Some(response),
            _ => None,
        }
    }

    /// The collected items, if every page was fetched
    pub fn into_items(self) -> Option<Vec<Value>> {
        match self {
            GetOutput::Items(items) => Some(items),
            _ => None,
        }
    }

    /// The page stream, if paging lazily
    pub fn into_pages(self) -> Option<PageStream<'a>> {
        match self {
            GetOutput::Pages(pages) => Some(pages),
            _ => None,
        }
    }
}

/// Result of [`GithubApi::graphql`]
pub enum GraphqlOutput<'a> {
    /// Response of a single query
    Response(ApiResponse),
    /// Lazy edge-list traversal
    Pages(GraphqlPages<'a>),
}

impl<'a> GraphqlOutput<'a> {
    /// The response, if the query was not paged
    pub fn into_response(self) -> Option<ApiResponse> {
        match self {
            GraphqlOutput::Response(response) => Some(response),
            GraphqlOutput::Pages(_) => None,
        }
    }

    /// The edge pages, if the query was paged
    pub fn into_pages(self) -> Option<GraphqlPages<'a>> {
        match self {
            GraphqlOutput::Pages(pages) => Some(pages),
            GraphqlOutput::Response(_) => None,
        }
    }
}

/// GitHub API client.
///
/// Cheap to share behind an `Arc`; every call keeps its own retry and
/// traversal state.
pub struct GithubApi {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    rest_retry: RetryPolicy,
    graphql_retry: RetryPolicy,
    links: LinkResolver,
}

impl GithubApi {
    /// Create a client speaking HTTP through reqwest
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = HttpClient::new(config.clone())?;
        Self::with_transport(config, Arc::new(http))
    }

    /// Create a client from `GH_BASE_URL` and `GH_TOKEN_PSW`
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Create a client over any transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        debug!("github client for {}", config.base_url);

        Ok(Self {
            rest_retry: RetryPolicy::rest(&config.retry),
            graphql_retry: RetryPolicy::graphql(&config.retry),
            links: LinkResolver::new(&config.base_url),
            transport,
            config,
        })
    }

    /// Add a rule guarding every REST request, after the built-in ones
    #[must_use]
    pub fn with_rest_rule(mut self, rule: RetryRule) -> Self {
        self.rest_retry = self.rest_retry.with_rule(rule);
        self
    }

    /// Add a rule guarding whole GraphQL calls, after the built-in one
    #[must_use]
    pub fn with_graphql_rule(mut self, rule: RetryRule) -> Self {
        self.graphql_retry = self.graphql_retry.with_rule(rule);
        self
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// REST pager bound to this client
    pub fn rest(&self) -> RestPager<'_> {
        RestPager::new(self.transport.as_ref(), &self.rest_retry, &self.links)
    }

    /// GraphQL pager bound to this client
    pub fn graphql_pager(&self) -> GraphqlPager<'_> {
        GraphqlPager::new(
            self.transport.as_ref(),
            &self.rest_retry,
            &self.graphql_retry,
            &self.config.graphql_endpoint,
            self.config.graphql_page_size,
        )
    }

    /// One request guarded by the REST retry rules
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<ApiResponse> {
        let transport = self.transport.as_ref();
        self.rest_retry
            .run(move || transport.request(method, endpoint, options))
            .await
    }

    /// GET `endpoint` according to `mode`.
    ///
    /// `attributes` only applies to [`PageMode::All`].
    pub async fn get(
        &self,
        endpoint: &str,
        mode: PageMode,
        attributes: Option<&[&str]>,
    ) -> Result<GetOutput<'_>> {
        self.get_with_options(endpoint, mode, attributes, RequestOptions::new())
            .await
    }

    /// [`get`](Self::get) with extra query parameters, headers or timeout
    pub async fn get_with_options(
        &self,
        endpoint: &str,
        mode: PageMode,
        attributes: Option<&[&str]>,
        options: RequestOptions,
    ) -> Result<GetOutput<'_>> {
        let pager = self.rest();
        match mode {
            PageMode::Single => Ok(GetOutput::Response(pager.get(endpoint, &options).await?)),
            PageMode::All => {
                let items = pager.fetch_all(endpoint, &options).await?;
                Ok(GetOutput::Items(filter_keys(items, attributes)))
            }
            PageMode::Page => Ok(GetOutput::Pages(pager.stream_pages(endpoint, options))),
        }
    }

    /// Number of items behind `endpoint`, see [`TotalEstimator`]
    pub async fn total(&self, endpoint: &str) -> Result<u64> {
        TotalEstimator::new(self.rest()).estimate(endpoint).await
    }

    /// Run a GraphQL query.
    ///
    /// With `paged`, `result_path` names the connection's edge list relative
    /// to `data` (for example `repository.issues.edges`) and the result is a
    /// lazy traversal.
    pub async fn graphql(
        &self,
        query: &str,
        variables: Value,
        paged: bool,
        result_path: Option<&str>,
    ) -> Result<GraphqlOutput<'_>> {
        let pager = self.graphql_pager();
        if !paged {
            return Ok(GraphqlOutput::Response(pager.call(query, &variables).await?));
        }

        let path = result_path
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::invalid_value("result_path", "required for paged queries"))?;
        Ok(GraphqlOutput::Pages(pager.run_paged(query, variables, path)))
    }
}

impl std::fmt::Debug for GithubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubApi")
            .field("base_url", &self.config.base_url)
            .field("rest_rules", &self.rest_retry.rules().len())
            .field("graphql_rules", &self.graphql_retry.rules().len())
            .finish_non_exhaustive()
    }
}
