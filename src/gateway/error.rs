//! Errors surfaced to the presentation layer.

use thiserror::Error;

/// A procedure failed in a way the end user should see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The caller's input was rejected before any backend call.
    #[error("{0}")]
    InvalidInput(String),

    /// The backend could not produce a result.
    #[error("{message}")]
    Upstream {
        message: String,
        detail: Option<String>,
    },
}

impl GatewayError {
    /// Stable error code for the consumer.
    ///
    /// `Upstream` keeps the `INTERNAL_SERVER_ERROR` code existing consumers
    /// match on, even though the HTTP status for it is 502.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::InvalidInput(_) => "BAD_REQUEST",
            GatewayError::Upstream { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            GatewayError::InvalidInput(_) => None,
            GatewayError::Upstream { detail, .. } => detail.as_deref(),
        }
    }
}
