//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway procedures
//! - Wire up middleware (request ID, tracing, CORS, limits, timeout)
//! - Bind server to listener and drain on shutdown

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::backend::{ClientInitError, RagClient};
use crate::config::{GatewayConfig, HttpConfig};
use crate::gateway::Gateway;
use crate::http::handlers;
use crate::http::request::X_REQUEST_ID;
use crate::lifecycle::shutdown::wait as wait_for_shutdown;
use crate::resilience::RetryPolicy;

/// Headroom on top of the worst-case backend latency before the inbound
/// request itself is timed out.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

/// HTTP server exposing the gateway procedures.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ClientInitError> {
        let retry = RetryPolicy::from_config(&config.retries);
        let client = RagClient::new(config.backend.clone(), retry)?;
        let worst_case = retry.worst_case_latency(config.backend.timeout());

        tracing::info!(
            base_url = %config.backend.base_url,
            timeout_ms = config.backend.timeout_ms,
            max_attempts = retry.max_attempts(),
            backoff_unit_ms = retry.backoff_unit().as_millis() as u64,
            worst_case_ms = worst_case.as_millis() as u64,
            "Backend client ready"
        );

        let state = AppState {
            gateway: Gateway::new(client),
        };
        let router = Self::build_router(&config, state, worst_case + REQUEST_TIMEOUT_MARGIN);

        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/api/rag/stats", get(handlers::get_stats))
            .route("/api/rag/query", post(handlers::query))
            .route("/api/rag/extract", post(handlers::extract))
            .route("/api/rag/health", get(handlers::health_check))
            .route("/healthz", get(handlers::liveness))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(DefaultBodyLimit::max(config.http.max_body_bytes))
            .layer(cors_layer(&config.http))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors_layer(config: &HttpConfig) -> CorsLayer {
    let request_id = HeaderName::from_static(X_REQUEST_ID);
    if config.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive().expose_headers([request_id]);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
}
