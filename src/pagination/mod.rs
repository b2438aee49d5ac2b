//! Pagination module
//!
//! Supports: REST link-header traversal (eager and lazy) and total estimation
//!
//! # Overview
//!
//! GitHub REST collections advertise their neighbours in the `Link` header.
//! [`LinkResolver`] turns the `next`/`last` relations into endpoints,
//! [`RestPager`] follows `next` until it disappears, and [`TotalEstimator`]
//! uses `last` to size a collection with two requests.

mod links;
mod rest;
mod total;

pub use links::{
    page_from_endpoint, per_page_from_endpoint, query_value, LinkResolver, RelationSet,
};
pub use rest::{filter_keys, PageStream, RestPager};
pub use total::TotalEstimator;
