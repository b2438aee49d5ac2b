//! CLI module
//!
//! Command-line interface over [`GithubApi`](crate::GithubApi).
//!
//! # Commands
//!
//! - `get` - GET an endpoint, one page, every page, or page by page
//! - `total` - Count the items behind an endpoint
//! - `graphql` - Run a GraphQL query, optionally following its cursor

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
