//! Retry logic.
//!
//! # Responsibilities
//! - Execute an operation up to `max_attempts` times
//! - Wait `2^a` backoff units between attempts
//! - Stop immediately on success or cancellation
//!
//! # Design Decisions
//! - Attempts are strictly sequential; the next one starts only after the
//!   previous one has finished or been dropped
//! - Every failure class the operation reports is retried; the caller
//!   decides what counts as an attempt failure
//! - The last failure is kept and handed back with the attempt count

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::RetryConfig;
use crate::resilience::backoff::{backoff_delay, cancellable_sleep};
use crate::resilience::timeouts::until_cancelled;

/// Attempt budget and backoff unit for a retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_unit: Duration,
}

/// A successful value plus the number of attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Terminal outcome of a retried operation that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed; `last` is the final attempt's failure.
    Exhausted { attempts: u32, last: E },
    /// The caller cancelled during an attempt or a backoff wait.
    Cancelled { attempts: u32 },
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_unit())
    }

    /// Same backoff unit, different attempt budget.
    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self::new(max_attempts, self.backoff_unit)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_unit(&self) -> Duration {
        self.backoff_unit
    }

    /// Delays inserted between attempts: `1, 2, 4, … 2^(n-2)` units.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts - 1).map(|a| backoff_delay(a, self.backoff_unit))
    }

    /// Upper bound on the latency of one retried call when each attempt is
    /// bounded by `per_attempt`.
    pub fn worst_case_latency(&self, per_attempt: Duration) -> Duration {
        let waiting: Duration = self.delays().sum();
        per_attempt.saturating_mul(self.max_attempts) + waiting
    }

    /// Run `attempt` until it succeeds, the budget is spent, or `cancel`
    /// fires. The closure receives the zero-based attempt index.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        cancel: Option<&CancellationToken>,
        mut attempt: F,
    ) -> Result<Retried<T>, RetryError<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut index = 0;
        loop {
            let outcome = match until_cancelled(cancel, attempt(index)).await {
                Some(outcome) => outcome,
                None => {
                    tracing::info!(operation, attempt = index + 1, "Call cancelled during attempt");
                    return Err(RetryError::Cancelled { attempts: index + 1 });
                }
            };

            let err = match outcome {
                Ok(value) => {
                    return Ok(Retried {
                        value,
                        attempts: index + 1,
                    })
                }
                Err(e) => e,
            };

            if index + 1 >= self.max_attempts {
                tracing::error!(
                    operation,
                    attempts = self.max_attempts,
                    error = %err,
                    "All attempts failed"
                );
                return Err(RetryError::Exhausted {
                    attempts: index + 1,
                    last: err,
                });
            }

            let delay = backoff_delay(index, self.backoff_unit);
            tracing::warn!(
                operation,
                attempt = index + 1,
                max_attempts = self.max_attempts,
                delay = ?delay,
                error = %err,
                "Attempt failed, retrying"
            );

            if cancellable_sleep(delay, cancel).await.is_err() {
                tracing::info!(operation, attempt = index + 1, "Call cancelled during backoff");
                return Err(RetryError::Cancelled { attempts: index + 1 });
            }
            index += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
