//! Response shaping.
//!
//! # Responsibilities
//! - Map gateway errors to HTTP status codes
//! - Render one structured error body: `{"error": {code, message, detail?}}`
//!
//! # Design Decisions
//! - Invalid input is 400; any backend-side failure is 502
//! - Diagnostics detail is included so operators can see the root cause

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;

/// Error envelope returned to consumers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl From<&GatewayError> for ErrorBody {
    fn from(err: &GatewayError) -> Self {
        Self {
            error: ErrorPayload {
                code: err.code().to_string(),
                message: err.to_string(),
                detail: err.detail().map(str::to_string),
            },
        }
    }
}

pub fn status_for(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        GatewayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (status_for(&self), Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = GatewayError::InvalidInput("Question cannot be empty".into());
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);

        let body = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": { "code": "BAD_REQUEST", "message": "Question cannot be empty" }
            })
        );
    }

    #[test]
    fn test_upstream_is_bad_gateway_with_internal_code() {
        let err = GatewayError::Upstream {
            message: "Failed to query documents".into(),
            detail: Some("backend did not respond within 60000ms".into()),
        };
        assert_eq!(err.code(), "INTERNAL_SERVER_ERROR");
        assert_eq!(
            ErrorBody::from(&err).error.detail.as_deref(),
            Some("backend did not respond within 60000ms")
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
