// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # github-api-core
//!
//! Pagination and retry engine for the GitHub REST and GraphQL APIs.
//!
//! ## Features
//!
//! - **Link-header pagination**: follow `next` relations, collect everything
//!   or walk lazily page by page
//! - **Totals in two requests**: size a collection from its `last` relation
//! - **GraphQL cursors**: thread `endCursor` through connection queries
//! - **Retries**: fixed-wait rules for exhausted quotas, interrupted
//!   transfers and GraphQL `RATE_LIMITED` errors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use github_api_core::{ClientConfig, GithubApi, PageMode, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let api = GithubApi::new(ClientConfig::from_env())?;
//!
//!     let repos = api
//!         .get("/orgs/rust-lang/repos", PageMode::All, Some(&["name"][..]))
//!         .await?
//!         .into_items();
//!
//!     let count = api.total("/orgs/rust-lang/repos").await?;
//!     println!("{count} repositories");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         GithubApi                           │
//! │   get(endpoint, mode)     total(endpoint)     graphql(..)   │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴─────┬───────────────────────┐
//! │  RestPager   │  TotalEstimator    │  GraphqlPager         │
//! │  LinkResolver│  (per_page=1,last) │  CursorState          │
//! └──────────────┴────────────────────┴───────────────────────┘
//!                               │
//! ┌─────────────────────────────┴───────────────────────────────┐
//! │        RetryPolicy  →  Transport (HttpClient / reqwest)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// HTTP transport and responses
pub mod http;

/// Retry rules
pub mod retry;

/// REST pagination and totals
pub mod pagination;

/// GraphQL queries and cursor paging
pub mod graphql;

/// The `GithubApi` client
pub mod client;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{GetOutput, GithubApi, GraphqlOutput};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use http::{ApiResponse, HttpClient, RequestOptions, Transport};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
