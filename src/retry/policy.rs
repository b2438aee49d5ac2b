//! Classifier-driven retry policy

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// A classifier paired with the wait and attempt cap it imposes
#[derive(Debug, Clone)]
pub struct RetryRule {
    /// Name used in log output
    pub name: &'static str,
    /// Returns true when the failure is transient for this rule
    pub classifier: fn(&Error) -> bool,
    /// Fixed wait before the next attempt
    pub wait: Duration,
    /// Total attempts allowed, the first one included
    pub max_attempts: u32,
}

impl RetryRule {
    /// Create a rule from a classifier
    pub fn new(
        name: &'static str,
        classifier: fn(&Error) -> bool,
        wait: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            name,
            classifier,
            wait,
            max_attempts,
        }
    }

    /// 403 responses caused by an exhausted request quota
    pub fn rate_limit(wait: Duration, max_attempts: u32) -> Self {
        Self::new("rate_limit", is_rate_limit_error, wait, max_attempts)
    }

    /// Responses whose body transfer was cut short
    pub fn transfer_interrupted(wait: Duration, max_attempts: u32) -> Self {
        Self::new(
            "transfer_interrupted",
            is_transfer_interrupted,
            wait,
            max_attempts,
        )
    }

    /// GraphQL payloads carrying a `RATE_LIMITED` error
    pub fn graphql_rate_limit(wait: Duration, max_attempts: u32) -> Self {
        Self::new(
            "graphql_rate_limit",
            is_graphql_rate_limit,
            wait,
            max_attempts,
        )
    }

    /// Check whether this rule accepts the failure
    pub fn matches(&self, err: &Error) -> bool {
        (self.classifier)(err)
    }
}

/// What to do about one failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryDecision {
    /// Whether the failure is transient
    pub should_retry: bool,
    /// Wait before the next attempt
    pub wait: Duration,
    /// Attempt cap of the governing rule
    pub max_attempts: u32,
    /// Name of the governing rule
    pub rule: Option<&'static str>,
}

impl RetryDecision {
    /// Decision for a failure no rule accepts
    pub fn give_up() -> Self {
        Self {
            should_retry: false,
            wait: Duration::ZERO,
            max_attempts: 0,
            rule: None,
        }
    }

    /// Whether another attempt may follow attempt number `attempt` (1-based)
    pub fn allows(&self, attempt: u32) -> bool {
        self.should_retry && attempt < self.max_attempts
    }
}

/// Ordered list of retry rules
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    rules: Vec<RetryRule>,
}

impl RetryPolicy {
    /// Create a policy from rules, evaluated in order
    pub fn new(rules: Vec<RetryRule>) -> Self {
        Self { rules }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::default()
    }

    /// Rules guarding each REST request
    pub fn rest(config: &RetryConfig) -> Self {
        Self::new(vec![
            RetryRule::rate_limit(
                Duration::from_millis(config.rate_limit_wait_ms),
                config.rate_limit_max_attempts,
            ),
            RetryRule::transfer_interrupted(
                Duration::from_millis(config.transfer_wait_ms),
                config.transfer_max_attempts,
            ),
        ])
    }

    /// Rules guarding a whole GraphQL call
    pub fn graphql(config: &RetryConfig) -> Self {
        Self::new(vec![RetryRule::graphql_rate_limit(
            Duration::from_millis(config.graphql_wait_ms),
            config.graphql_max_attempts,
        )])
    }

    /// Append a rule after the existing ones
    #[must_use]
    pub fn with_rule(mut self, rule: RetryRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The rules in evaluation order
    pub fn rules(&self) -> &[RetryRule] {
        &self.rules
    }

    /// Decide what to do about a failure
    pub fn classify(&self, err: &Error) -> RetryDecision {
        self.rules
            .iter()
            .find(|rule| rule.matches(err))
            .map_or_else(RetryDecision::give_up, |rule| RetryDecision {
                should_retry: true,
                wait: rule.wait,
                max_attempts: rule.max_attempts,
                rule: Some(rule.name),
            })
    }

    /// Run `op` until it succeeds, fails with an unmatched error, or the
    /// governing rule runs out of attempts. The last failure is returned
    /// unchanged.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let decision = self.classify(&err);
            if !decision.allows(attempt) {
                if decision.should_retry {
                    warn!(
                        "{} - giving up after {} attempts: {}",
                        decision.rule.unwrap_or("retry"),
                        attempt,
                        err
                    );
                }
                return Err(err);
            }

            self.pause(&decision, attempt).await;
            attempt += 1;
        }
    }

    /// Log and sleep for one retry
    pub(crate) async fn pause(&self, decision: &RetryDecision, attempt: u32) {
        info!(
            "{} - attempt {}/{} failed, retrying in {:?}",
            decision.rule.unwrap_or("retry"),
            attempt,
            decision.max_attempts,
            decision.wait
        );
        tokio::time::sleep(decision.wait).await;
    }
}

/// 403 caused by an exhausted quota, not by missing permissions
pub fn is_rate_limit_error(err: &Error) -> bool {
    err.is_rate_limit_status()
}

/// Body transfer aborted mid-response
pub fn is_transfer_interrupted(err: &Error) -> bool {
    matches!(err, Error::TransferInterrupted { .. })
}

/// GraphQL `RATE_LIMITED` payload
pub fn is_graphql_rate_limit(err: &Error) -> bool {
    matches!(err, Error::GraphqlRateLimited { .. })
}
