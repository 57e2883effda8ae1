//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rag_backend_calls_total` (counter): backend calls by operation, outcome
//! - `rag_backend_call_duration_seconds` (histogram): whole-call latency, retries included
//! - `rag_backend_attempts` (histogram): attempts spent per call
//! - `gateway_requests_total` (counter): procedure invocations by outcome
//! - `gateway_stats_fallback_total` (counter): stats placeholders served
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one logical backend call.
pub fn record_backend_call(operation: &'static str, outcome: &'static str, attempts: u32, start: Instant) {
    counter!("rag_backend_calls_total", "operation" => operation, "outcome" => outcome).increment(1);
    histogram!("rag_backend_call_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
    histogram!("rag_backend_attempts", "operation" => operation).record(attempts as f64);
}

/// Record one gateway procedure invocation.
pub fn record_gateway_request(procedure: &'static str, outcome: &'static str) {
    counter!("gateway_requests_total", "procedure" => procedure, "outcome" => outcome).increment(1);
}

pub fn record_stats_fallback() {
    counter!("gateway_stats_fallback_total").increment(1);
}
