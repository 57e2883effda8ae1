//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to backend:
//!     → retries.rs (attempt loop, budget, last-failure bookkeeping)
//!     → timeouts.rs (hard deadline per attempt, caller cancellation)
//!     → On failure: backoff.rs (wait 2^a units, cancellable)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend attempt has a deadline
//! - One cancellable wait primitive serves both the attempt and the backoff
//! - No state survives a call; counters and timers are call-local

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::{backoff_delay, cancellable_sleep, WaitCancelled};
pub use retries::{Retried, RetryError, RetryPolicy};
pub use timeouts::{until_cancelled, with_deadline, DeadlineElapsed};
