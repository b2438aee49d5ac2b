//! GraphQL module
//!
//! Queries are POSTed to the GraphQL endpoint as `{query, variables}`.
//! Connections are walked with a `$cursor` variable threaded through the
//! query: the first page is sent without the cursor argument, each later page
//! adopts the server's `pageInfo.endCursor`.

mod pager;
mod query;
mod types;

pub use pager::{CursorState, GraphqlPager, GraphqlPages};
pub use query::{prepare_query, sanitize_query, strip_cursor};
pub use types::{check_errors, GraphqlErrorEntry, GraphqlPayload, RATE_LIMITED};
