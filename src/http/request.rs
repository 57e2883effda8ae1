//! Request correlation.
//!
//! # Responsibilities
//! - Name the request ID header shared by inbound and outbound requests
//! - Turn an inbound request's headers into per-call backend options
//!
//! # Design Decisions
//! - The ID is generated by `SetRequestIdLayer` as early as possible and
//!   echoed back by `PropagateRequestIdLayer`
//! - The same ID is forwarded to the backend so both logs line up

use axum::http::HeaderMap;

use crate::backend::CallOptions;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID of an inbound request, if any.
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
}

/// Backend call options derived from an inbound request.
pub fn call_options(headers: &HeaderMap) -> CallOptions {
    match request_id(headers) {
        Some(id) => CallOptions::default().request_id(id),
        None => CallOptions::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_call_options_carry_request_id() {
        let mut headers = HeaderMap::new();
        assert!(call_options(&headers).request_id.is_none());

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(call_options(&headers).request_id.as_deref(), Some("abc-123"));
    }
}
