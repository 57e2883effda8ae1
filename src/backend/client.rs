//! Resilient client for the document-analysis backend.
//!
//! # Responsibilities
//! - Issue health/stats/query/extract calls against the configured base URL
//! - Bound every attempt by the endpoint deadline
//! - Retry query/extract with exponential backoff
//! - Hand back only responses that passed contract validation

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::backend::error::{CallError, ClientInitError};
use crate::backend::types::{
    Contract, ExtractRequest, HealthStatus, OperationResult, QueryRequest, SystemStats,
};
use crate::config::BackendEndpointConfig;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;
use crate::resilience::{until_cancelled, with_deadline, RetryError, RetryPolicy};

/// Named remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Health,
    Stats,
    Query,
    Extract,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Health => "health",
            Operation::Stats => "stats",
            Operation::Query => "query",
            Operation::Extract => "extract",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Operation::Health => "/health",
            Operation::Stats => "/stats",
            Operation::Query => "/query",
            Operation::Extract => "/extract",
        }
    }

    fn method(&self) -> Method {
        match self {
            Operation::Health | Operation::Stats => Method::GET,
            Operation::Query | Operation::Extract => Method::POST,
        }
    }
}

/// Per-call options. Everything here lives only as long as the call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Attempt budget for retried calls; `None` uses the client's policy.
    pub max_attempts: Option<u32>,
    /// Correlation id forwarded as `x-request-id`.
    pub request_id: Option<String>,
    /// Abandons the call (pending attempt or backoff) when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = Some(n);
        self
    }

    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// HTTP client bound to one backend endpoint.
///
/// Cheap to clone; holds only the immutable endpoint configuration, the
/// retry policy and a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct RagClient {
    http: Client,
    base_url: Arc<str>,
    endpoint: Arc<BackendEndpointConfig>,
    retry: RetryPolicy,
}

impl RagClient {
    /// Create a client for `endpoint` using `retry` for query/extract.
    pub fn new(endpoint: BackendEndpointConfig, retry: RetryPolicy) -> Result<Self, ClientInitError> {
        url::Url::parse(&endpoint.base_url).map_err(|source| ClientInitError::InvalidBaseUrl {
            url: endpoint.base_url.clone(),
            source,
        })?;

        let http = Client::builder()
            .user_agent(concat!("rag-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::from(endpoint.base_url.trim_end_matches('/')),
            endpoint: Arc::new(endpoint),
            retry,
        })
    }

    /// `GET /health`, single attempt.
    pub async fn health_check(&self) -> Result<HealthStatus, CallError> {
        self.health_check_with(&CallOptions::default()).await
    }

    pub async fn health_check_with(&self, opts: &CallOptions) -> Result<HealthStatus, CallError> {
        self.single(Operation::Health, opts).await
    }

    /// `GET /stats`, single attempt.
    pub async fn get_stats(&self) -> Result<SystemStats, CallError> {
        self.get_stats_with(&CallOptions::default()).await
    }

    pub async fn get_stats_with(&self, opts: &CallOptions) -> Result<SystemStats, CallError> {
        self.single(Operation::Stats, opts).await
    }

    /// `POST /query` with up to `max_attempts` attempts.
    pub async fn query(&self, question: &str, max_attempts: u32) -> Result<OperationResult, CallError> {
        self.query_with(question, &CallOptions::default().max_attempts(max_attempts))
            .await
    }

    /// `POST /query` with the configured attempt budget.
    pub async fn query_default(&self, question: &str) -> Result<OperationResult, CallError> {
        self.query_with(question, &CallOptions::default()).await
    }

    pub async fn query_with(&self, question: &str, opts: &CallOptions) -> Result<OperationResult, CallError> {
        self.retried(Operation::Query, &QueryRequest { question }, opts)
            .await
    }

    /// `POST /extract` with up to `max_attempts` attempts.
    pub async fn extract(
        &self,
        class_identifier: &str,
        max_attempts: u32,
    ) -> Result<OperationResult, CallError> {
        self.extract_with(class_identifier, &CallOptions::default().max_attempts(max_attempts))
            .await
    }

    pub async fn extract_default(&self, class_identifier: &str) -> Result<OperationResult, CallError> {
        self.extract_with(class_identifier, &CallOptions::default()).await
    }

    pub async fn extract_with(
        &self,
        class_identifier: &str,
        opts: &CallOptions,
    ) -> Result<OperationResult, CallError> {
        self.retried(Operation::Extract, &ExtractRequest { class_identifier }, opts)
            .await
    }

    /// One bounded attempt; any failure is reported as `Unavailable`.
    async fn single<T: Contract>(&self, op: Operation, opts: &CallOptions) -> Result<T, CallError> {
        let start = Instant::now();
        let request = self.request(op, opts.request_id.as_deref());

        let result = match until_cancelled(opts.cancel.as_ref(), self.attempt::<T>(request)).await {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => {
                tracing::warn!(operation = op.as_str(), error = %e, "Backend call failed");
                Err(CallError::Unavailable(Box::new(e)))
            }
            None => Err(CallError::Cancelled),
        };

        metrics::record_backend_call(op.as_str(), outcome_label(&result), 1, start);
        result
    }

    /// Attempt loop for query/extract.
    async fn retried<B, T>(&self, op: Operation, body: &B, opts: &CallOptions) -> Result<T, CallError>
    where
        B: Serialize,
        T: Contract,
    {
        let start = Instant::now();
        let policy = match opts.max_attempts {
            Some(n) => self.retry.with_max_attempts(n),
            None => self.retry,
        };
        let request_id = opts.request_id.as_deref();

        let outcome = policy
            .run(op.as_str(), opts.cancel.as_ref(), |attempt| {
                tracing::debug!(
                    operation = op.as_str(),
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts(),
                    "Calling backend"
                );
                self.attempt::<T>(self.request(op, request_id).json(body))
            })
            .await;

        let (result, attempts) = match outcome {
            Ok(done) => (Ok(done.value), done.attempts),
            Err(RetryError::Exhausted { attempts, last }) => (
                Err(CallError::RetriesExhausted {
                    attempts,
                    last: Box::new(last),
                }),
                attempts,
            ),
            Err(RetryError::Cancelled { attempts }) => (Err(CallError::Cancelled), attempts),
        };

        metrics::record_backend_call(op.as_str(), outcome_label(&result), attempts, start);
        result
    }

    fn request(&self, op: Operation, request_id: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, op.path());
        let builder = self
            .http
            .request(op.method(), url)
            .header(CONTENT_TYPE, "application/json");
        match request_id {
            Some(id) => builder.header(X_REQUEST_ID, id),
            None => builder,
        }
    }

    /// Send `request` under the endpoint deadline and validate the body.
    async fn attempt<T: Contract>(&self, request: RequestBuilder) -> Result<T, CallError> {
        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CallError::backend(status.as_u16(), &body));
            }
            let bytes = response.bytes().await?;
            T::validate(&bytes).map_err(CallError::from)
        };

        match with_deadline(self.endpoint.timeout(), exchange).await {
            Ok(result) => result,
            Err(_) => Err(CallError::Timeout {
                after_ms: self.endpoint.timeout_ms,
            }),
        }
    }
}

fn outcome_label<T>(result: &Result<T, CallError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.root_cause().kind(),
    }
}

impl std::fmt::Debug for RagClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagClient")
            .field("base_url", &self.endpoint.base_url)
            .field("timeout_ms", &self.endpoint.timeout_ms)
            .field("max_attempts", &self.retry.max_attempts())
            .finish()
    }
}
