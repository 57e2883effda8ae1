//! Wire contracts of the document-analysis backend.
//!
//! Response bodies are checked against their contract before anything
//! else sees them: every required field must be present with the right
//! type. A mismatch is a [`ShapeError`], never a panic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryRequest<'a> {
    pub question: &'a str,
}

/// Body of `POST /extract`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtractRequest<'a> {
    #[serde(rename = "class_name")]
    pub class_identifier: &'a str,
}

/// Outcome of a query or extraction as reported by the backend.
///
/// When `succeeded` is false, `error_detail` usually explains why, but
/// callers must cope with it being absent.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OperationResult {
    #[serde(rename = "result")]
    pub text: String,
    #[serde(rename = "success")]
    pub succeeded: bool,
    #[serde(rename = "error", default)]
    pub error_detail: Option<String>,
}

/// Indexing state reported by `GET /stats`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatsStatus {
    Ready,
    Indexing,
    Error,
}

/// Index and model statistics from `GET /stats`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SystemStats {
    #[serde(rename = "documents")]
    pub document_count: u64,
    #[serde(rename = "vectors")]
    pub vector_count: u64,
    #[serde(rename = "embedding_model")]
    pub embedding_model_name: String,
    #[serde(rename = "device")]
    pub compute_device: String,
    pub status: StatsStatus,
}

/// Liveness report from `GET /health`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

/// A response body did not match its contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{contract} response {kind}: {reason}")]
pub struct ShapeError {
    pub contract: &'static str,
    pub kind: ShapeErrorKind,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeErrorKind {
    /// Body is not JSON at all.
    NotJson,
    /// JSON, but fields are missing or have the wrong type.
    Mismatch,
}

impl std::fmt::Display for ShapeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeErrorKind::NotJson => write!(f, "is not valid JSON"),
            ShapeErrorKind::Mismatch => write!(f, "does not match the expected shape"),
        }
    }
}

/// A response type with a validated wire shape.
pub trait Contract: DeserializeOwned {
    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Parse and validate a raw body.
    fn validate(body: &[u8]) -> Result<Self, ShapeError> {
        serde_json::from_slice(body).map_err(|e| {
            let kind = if e.is_data() {
                ShapeErrorKind::Mismatch
            } else {
                ShapeErrorKind::NotJson
            };
            ShapeError {
                contract: Self::NAME,
                kind,
                reason: e.to_string(),
            }
        })
    }
}

impl Contract for OperationResult {
    const NAME: &'static str = "operation";
}

impl Contract for SystemStats {
    const NAME: &'static str = "stats";
}

impl Contract for HealthStatus {
    const NAME: &'static str = "health";
}
