//! Document-analysis backend subsystem.
//!
//! # Data Flow
//! ```text
//! gateway procedure
//!     → client.rs (build request, attach x-request-id)
//!     → resilience (deadline per attempt, backoff between attempts)
//!     → backend over HTTP
//!     → types.rs (contract validation of the body)
//!     → error.rs (classify every failure)
//! ```
//!
//! # Design Decisions
//! - health and stats are single-shot: they back liveness probes and
//!   polling, and must fail fast
//! - query and extract are retried; a malformed body counts as a failed
//!   attempt like a timeout or a 5xx
//! - Failures are always classified and returned, never swallowed here

pub mod client;
pub mod error;
pub mod types;

pub use client::{CallOptions, Operation, RagClient};
pub use error::{CallError, ClientInitError};
pub use types::{HealthStatus, OperationResult, StatsStatus, SystemStats};
