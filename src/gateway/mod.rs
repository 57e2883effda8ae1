//! Gateway procedure layer.
//!
//! # Data Flow
//! ```text
//! presentation layer (HTTP handler, CLI)
//!     → procedures.rs (Idle → Validating → Calling)
//!     → backend::RagClient
//!     → procedures.rs (success | surfaced error | masked fallback)
//!     → types.rs / error.rs shapes back to the caller
//! ```

pub mod error;
pub mod procedures;
pub mod types;

pub use error::GatewayError;
pub use procedures::Gateway;
pub use types::{GatewayAnswer, GatewayHealth, GatewayStats};
