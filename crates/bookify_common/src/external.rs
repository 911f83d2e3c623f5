// --- File: crates/bookify_common/src/external.rs ---
//! Bounded execution of external collaborator calls.
//!
//! Every suspension point in the booking flow (customer lookup, address
//! validation, calendar reads and writes) goes through [`call_bounded`],
//! so a hung dependency surfaces as a distinguishable timeout instead of
//! degrading silently.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Timeout and retry budget for one logical external call.
#[derive(Debug, Clone, Copy)]
pub struct ExternalCallPolicy {
    pub timeout: Duration,
    /// Additional attempts after the first (0 = single attempt).
    pub retries: u32,
}

impl Default for ExternalCallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 1,
        }
    }
}

impl ExternalCallPolicy {
    pub fn new(timeout_secs: u64, retries: u32) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
            retries,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExternalCallError<E> {
    #[error("{operation} timed out after {attempts} attempt(s)")]
    TimedOut { operation: String, attempts: u32 },
    #[error("{operation} failed: {source}")]
    Failed {
        operation: String,
        #[source]
        source: E,
    },
}

/// Runs `make_call` under the policy's timeout, retrying up to the budget.
///
/// Retries cover both timeouts and call errors; the last failure wins.
pub async fn call_bounded<T, E, F, Fut>(
    policy: ExternalCallPolicy,
    operation: &str,
    make_call: F,
) -> Result<T, ExternalCallError<E>>
where
    E: std::error::Error,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.retries + 1;
    let mut last_error: Option<ExternalCallError<E>> = None;

    for attempt in 1..=attempts {
        match tokio::time::timeout(policy.timeout, make_call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => {
                warn!(operation, attempt, error = %e, "external call failed");
                last_error = Some(ExternalCallError::Failed {
                    operation: operation.to_string(),
                    source: e,
                });
            }
            Err(_) => {
                warn!(operation, attempt, timeout_ms = policy.timeout.as_millis() as u64, "external call timed out");
                last_error = Some(ExternalCallError::TimedOut {
                    operation: operation.to_string(),
                    attempts: attempt,
                });
            }
        }
    }

    Err(last_error.expect("at least one attempt was made"))
}
