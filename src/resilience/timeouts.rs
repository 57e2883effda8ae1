//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a single backend attempt with a hard deadline
//! - Cancel the in-flight operation cleanly on timeout
//! - Stop waiting early when the caller cancels
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the wrapped future is dropped on
//!   expiry, which releases the underlying connection
//! - Timeout errors are distinct from other errors

use std::future::Future;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

/// The deadline of an attempt elapsed before it completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineElapsed(pub Duration);

impl std::fmt::Display for DeadlineElapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deadline of {}ms elapsed", self.0.as_millis())
    }
}

impl std::error::Error for DeadlineElapsed {}

/// Run `fut` with a deadline measured from now.
pub async fn with_deadline<F: Future>(
    deadline: Duration,
    fut: F,
) -> Result<F::Output, DeadlineElapsed> {
    time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineElapsed(deadline))
}

/// Resolve once `token` is cancelled; never resolves without a token.
pub async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

/// Drive `fut` to completion unless `token` is cancelled first, in which
/// case `fut` is dropped and `None` is returned.
pub async fn until_cancelled<F: Future>(
    token: Option<&CancellationToken>,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancelled(token) => None,
        output = fut => Some(output),
    }
}
