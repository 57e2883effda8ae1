//! Gateway procedures: getStats, query, extract, healthCheck.
//!
//! # Responsibilities
//! - Validate caller input before anything goes over the wire
//! - Translate client outcomes into the gateway's result/error shapes
//! - Apply each procedure's fallback policy
//!
//! # Design Decisions
//! - Stats failures are masked behind a fixed placeholder and logged;
//!   stats are advisory and must not block rendering
//! - Query and extract failures always surface; a result that did not
//!   succeed is never passed off as an answer
//! - Health never fails; an unreachable backend is reported as unhealthy

use std::sync::Arc;

use crate::backend::{CallOptions, OperationResult, RagClient};
use crate::gateway::error::GatewayError;
use crate::gateway::types::{GatewayAnswer, GatewayHealth, GatewayStats};
use crate::observability::metrics;

/// Messages for one text-producing procedure.
struct TextProcedure {
    name: &'static str,
    empty_input: &'static str,
    call_failed: &'static str,
    not_succeeded: &'static str,
}

const QUERY: TextProcedure = TextProcedure {
    name: "query",
    empty_input: "Question cannot be empty",
    call_failed: "Failed to query documents",
    not_succeeded: "Query failed",
};

const EXTRACT: TextProcedure = TextProcedure {
    name: "extract",
    empty_input: "Class name cannot be empty",
    call_failed: "Failed to extract class information",
    not_succeeded: "Extraction failed",
};

/// The procedure layer in front of [`RagClient`].
#[derive(Clone, Debug)]
pub struct Gateway {
    client: Arc<RagClient>,
}

impl Gateway {
    pub fn new(client: RagClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Current index statistics, or the placeholder if the backend cannot
    /// provide them.
    pub async fn get_stats(&self, opts: &CallOptions) -> GatewayStats {
        match self.client.get_stats_with(opts).await {
            Ok(stats) => {
                metrics::record_gateway_request("getStats", "success");
                stats.into()
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    request_id = opts.request_id.as_deref().unwrap_or("-"),
                    "Failed to get stats from backend, serving fallback"
                );
                metrics::record_gateway_request("getStats", "fallback");
                metrics::record_stats_fallback();
                GatewayStats::fallback()
            }
        }
    }

    /// Answer a free-form question over the indexed documents.
    pub async fn query(&self, question: &str, opts: &CallOptions) -> Result<GatewayAnswer, GatewayError> {
        let question = require_text(question, &QUERY)?;
        let outcome = self.client.query_with(question, opts).await;
        into_answer(&QUERY, outcome.map_err(|e| e.to_string()), opts)
    }

    /// Extract the information recorded for one class identifier.
    pub async fn extract(
        &self,
        class_identifier: &str,
        opts: &CallOptions,
    ) -> Result<GatewayAnswer, GatewayError> {
        let class_identifier = require_text(class_identifier, &EXTRACT)?;
        let outcome = self.client.extract_with(class_identifier, opts).await;
        into_answer(&EXTRACT, outcome.map_err(|e| e.to_string()), opts)
    }

    /// Backend health; never fails.
    pub async fn health_check(&self, opts: &CallOptions) -> GatewayHealth {
        match self.client.health_check_with(opts).await {
            Ok(health) => {
                let healthy = health.status == "healthy";
                let outcome = if healthy { "healthy" } else { "unhealthy" };
                metrics::record_gateway_request("healthCheck", outcome);
                GatewayHealth {
                    status: health.status,
                    message: health.message,
                    healthy,
                }
            }
            Err(e) => {
                metrics::record_gateway_request("healthCheck", "error");
                GatewayHealth {
                    status: "error".to_string(),
                    message: e.to_string(),
                    healthy: false,
                }
            }
        }
    }
}

fn require_text<'a>(input: &'a str, procedure: &TextProcedure) -> Result<&'a str, GatewayError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        metrics::record_gateway_request(procedure.name, "invalid_input");
        return Err(GatewayError::InvalidInput(procedure.empty_input.to_string()));
    }
    Ok(trimmed)
}

fn into_answer(
    procedure: &TextProcedure,
    outcome: Result<OperationResult, String>,
    opts: &CallOptions,
) -> Result<GatewayAnswer, GatewayError> {
    let request_id = opts.request_id.as_deref().unwrap_or("-");
    let err = match outcome {
        Ok(result) if result.succeeded => {
            metrics::record_gateway_request(procedure.name, "success");
            return Ok(GatewayAnswer { result: result.text });
        }
        Ok(result) => {
            let message = result
                .error_detail
                .clone()
                .unwrap_or_else(|| procedure.not_succeeded.to_string());
            GatewayError::Upstream {
                message,
                detail: result.error_detail,
            }
        }
        Err(detail) => GatewayError::Upstream {
            message: procedure.call_failed.to_string(),
            detail: Some(detail),
        },
    };

    tracing::error!(
        procedure = procedure.name,
        request_id,
        error = %err,
        detail = err.detail().unwrap_or("-"),
        "Procedure failed"
    );
    metrics::record_gateway_request(procedure.name, "error");
    Err(err)
}
