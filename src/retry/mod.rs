//! Retry module
//!
//! Failures are matched against an ordered list of [`RetryRule`]s. The first
//! rule whose classifier accepts the failure decides how long to wait and how
//! many attempts the call may make; unmatched failures surface immediately.
//!
//! # Default rules
//!
//! - **rate_limit**: 403 with an exhausted quota, 60s wait, 60 attempts
//! - **transfer_interrupted**: body transfer cut short, 10s wait, 120 attempts
//! - **graphql_rate_limit**: GraphQL `RATE_LIMITED` payload, 60s wait, 60 attempts

mod policy;

pub use policy::{
    is_graphql_rate_limit, is_rate_limit_error, is_transfer_interrupted, RetryDecision,
    RetryPolicy, RetryRule,
};
