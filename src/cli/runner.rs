//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::{GetOutput, GithubApi, GraphqlOutput};
use crate::config::{normalize_base_url, ClientConfig};
use crate::error::{Result, ResultExt};
use crate::types::PageMode;
use serde_json::{json, Value};
use std::fs;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let api = GithubApi::new(self.client_config()?)?;
        debug!("{api:?}");

        match &self.cli.command {
            Commands::Get {
                endpoint,
                all,
                page,
                attributes,
            } => {
                let mode = Commands::page_mode(*all, *page);
                self.get(&api, endpoint, mode, attributes.as_deref()).await
            }
            Commands::Total { endpoint } => {
                let total = api.total(endpoint).await?;
                self.output(&json!({ "endpoint": endpoint, "total": total }));
                Ok(())
            }
            Commands::Graphql {
                query,
                variables,
                paged,
                result_path,
            } => {
                self.graphql(&api, query, variables.as_deref(), *paged, result_path.as_deref())
                    .await
            }
        }
    }

    /// Config file, then `GH_BASE_URL`/`GH_TOKEN_PSW`, then `--base-url`
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ClientConfig::default(),
        };
        config.apply_env();
        if let Some(base_url) = &self.cli.base_url {
            config.base_url = normalize_base_url(base_url);
        }
        config.validate()?;
        Ok(config)
    }

    async fn get(
        &self,
        api: &GithubApi,
        endpoint: &str,
        mode: PageMode,
        attributes: Option<&[String]>,
    ) -> Result<()> {
        let attributes: Option<Vec<&str>> =
            attributes.map(|keys| keys.iter().map(String::as_str).collect());

        match api.get(endpoint, mode, attributes.as_deref()).await? {
            GetOutput::Response(response) => {
                self.output(&response.body.unwrap_or(Value::Null));
            }
            GetOutput::Items(items) => self.output(&Value::Array(items)),
            GetOutput::Pages(mut pages) => {
                while let Some(batch) = pages.next_page().await? {
                    self.output(&Value::Array(batch));
                }
                debug!("{} pages", pages.pages_fetched());
            }
        }
        Ok(())
    }

    async fn graphql(
        &self,
        api: &GithubApi,
        query: &str,
        variables: Option<&str>,
        paged: bool,
        result_path: Option<&str>,
    ) -> Result<()> {
        let query = load_query(query)?;
        let variables = match variables {
            Some(raw) => serde_json::from_str(raw).context("Invalid --variables JSON")?,
            None => json!({}),
        };

        match api.graphql(&query, variables, paged, result_path).await? {
            GraphqlOutput::Response(response) => {
                self.output(&response.body.unwrap_or(Value::Null));
            }
            GraphqlOutput::Pages(mut pages) => {
                while let Some(edges) = pages.next_edges().await? {
                    self.output(&Value::Array(edges));
                }
            }
        }
        Ok(())
    }

    /// Output a value
    fn output(&self, value: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(value).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
            }
        }
    }
}

/// Query text as given, or the contents of the file named after `@`
fn load_query(query: &str) -> Result<String> {
    match query.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read query {path}")),
        None => Ok(query.to_string()),
    }
}
