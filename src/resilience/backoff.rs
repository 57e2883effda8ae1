//! Exponential backoff.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::resilience::timeouts::until_cancelled;

/// Delay to wait after failed attempt `attempt` (zero-based): `unit * 2^attempt`.
///
/// Saturates instead of overflowing for absurd attempt counts.
pub fn backoff_delay(attempt: u32, unit: Duration) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    unit.saturating_mul(factor)
}

/// The caller cancelled while a wait was pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitCancelled;

/// Sleep for `delay`, returning early if `token` is cancelled.
///
/// Dropping the returned future also releases the timer.
pub async fn cancellable_sleep(
    delay: Duration,
    token: Option<&CancellationToken>,
) -> Result<(), WaitCancelled> {
    until_cancelled(token, tokio::time::sleep(delay))
        .await
        .ok_or(WaitCancelled)
}
