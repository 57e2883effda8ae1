//! Failure taxonomy of backend calls.

use thiserror::Error;

use crate::backend::types::ShapeError;

/// Maximum number of body bytes kept from a non-success response.
const BODY_SNIPPET_LEN: usize = 256;

/// Why a backend call failed.
///
/// `Timeout`, `NetworkError`, `BackendError` and `MalformedResponse`
/// describe a single attempt. `RetriesExhausted` and `Unavailable` are the
/// terminal wrappers the retried and the single-shot operations report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The attempt did not finish within its deadline.
    #[error("backend did not respond within {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Connecting, sending or reading the body failed.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}{}", fmt_body(.body))]
    BackendError { status: u16, body: String },

    /// A success status with a body that does not match its contract.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] ShapeError),

    /// Every attempt of a retried call failed.
    #[error("giving up after {attempts} attempt(s): {last}")]
    RetriesExhausted { attempts: u32, last: Box<CallError> },

    /// A single-shot liveness or polling call failed.
    #[error("backend unavailable: {0}")]
    Unavailable(Box<CallError>),

    /// The caller abandoned the call.
    #[error("call cancelled")]
    Cancelled,
}

fn fmt_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

impl CallError {
    pub(crate) fn backend(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let body = match trimmed.char_indices().nth(BODY_SNIPPET_LEN) {
            Some((idx, _)) => format!("{}…", &trimmed[..idx]),
            None => trimmed.to_string(),
        };
        CallError::BackendError { status, body }
    }

    /// The concrete attempt failure behind any wrapping.
    pub fn root_cause(&self) -> &CallError {
        match self {
            CallError::RetriesExhausted { last, .. } => last.root_cause(),
            CallError::Unavailable(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::Timeout { .. } => "timeout",
            CallError::NetworkError(_) => "network_error",
            CallError::BackendError { .. } => "backend_error",
            CallError::MalformedResponse(_) => "malformed_response",
            CallError::RetriesExhausted { .. } => "retries_exhausted",
            CallError::Unavailable(_) => "unavailable",
            CallError::Cancelled => "cancelled",
        }
    }
}

impl From<reqwest::Error> for CallError {
    fn from(err: reqwest::Error) -> Self {
        CallError::NetworkError(err.to_string())
    }
}

/// The client could not be constructed.
#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("invalid backend base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
