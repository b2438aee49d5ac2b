//! CLI commands and argument parsing

use crate::types::PageMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GitHub API pagination and retry client
#[derive(Parser, Debug)]
#[command(name = "github-api-core")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL or bare hostname (overrides config and GH_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// GET an endpoint, optionally following every page
    Get {
        /// Endpoint path, e.g. /orgs/rust-lang/repos
        endpoint: String,

        /// Collect items from every page into one list
        #[arg(long, conflicts_with = "page")]
        all: bool,

        /// Print one batch per page as pages arrive
        #[arg(long)]
        page: bool,

        /// Keys to keep on each item (comma-separated, with --all)
        #[arg(long, value_delimiter = ',')]
        attributes: Option<Vec<String>>,
    },

    /// Count the items behind a paginated endpoint
    Total {
        /// Endpoint path (without per_page)
        endpoint: String,
    },

    /// Run a GraphQL query
    Graphql {
        /// Query text, or @file to read it from a file
        query: String,

        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,

        /// Follow endCursor through the connection at --result-path
        #[arg(long, requires = "result_path")]
        paged: bool,

        /// Dot path of the edge list below `data`, e.g. repository.issues.edges
        #[arg(long)]
        result_path: Option<String>,
    },
}

impl Commands {
    /// Paging directive of a `get` invocation
    pub fn page_mode(all: bool, page: bool) -> PageMode {
        if all {
            PageMode::All
        } else if page {
            PageMode::Page
        } else {
            PageMode::Single
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    Json,
    /// Human-readable output
    Pretty,
}
