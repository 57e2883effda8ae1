use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayAnswer, GatewayError, GatewayHealth, GatewayStats};
use crate::http::request::call_options;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Input of the query procedure. A missing field is treated as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryInput {
    pub question: String,
}

/// Input of the extract procedure.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractInput {
    pub class_name: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn get_stats(State(state): State<AppState>, headers: HeaderMap) -> Json<GatewayStats> {
    Json(state.gateway.get_stats(&call_options(&headers)).await)
}

pub async fn query(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<QueryInput>, JsonRejection>,
) -> Result<Json<GatewayAnswer>, GatewayError> {
    let input = read_input("query", payload)?;
    state
        .gateway
        .query(&input.question, &call_options(&headers))
        .await
        .map(Json)
}

pub async fn extract(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ExtractInput>, JsonRejection>,
) -> Result<Json<GatewayAnswer>, GatewayError> {
    let input = read_input("extract", payload)?;
    state
        .gateway
        .extract(&input.class_name, &call_options(&headers))
        .await
        .map(Json)
}

/// Unwrap a JSON body, turning any extractor rejection (bad syntax, wrong
/// content type, wrong field types, oversized body) into `InvalidInput`.
fn read_input<T>(procedure: &'static str, payload: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    match payload {
        Ok(Json(input)) => Ok(input),
        Err(rejection) => {
            tracing::debug!(
                procedure,
                status = rejection.status().as_u16(),
                reason = %rejection.body_text(),
                "Rejected request body"
            );
            metrics::record_gateway_request(procedure, "invalid_input");
            Err(GatewayError::InvalidInput(rejection.body_text()))
        }
    }
}

pub async fn health_check(State(state): State<AppState>, headers: HeaderMap) -> Json<GatewayHealth> {
    Json(state.gateway.health_check(&call_options(&headers)).await)
}

/// Liveness of the gateway process itself; does not touch the backend.
pub async fn liveness() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
