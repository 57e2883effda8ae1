//! RAG gateway.
//!
//! Exposes four procedures (stats, query, extract, health) over HTTP and
//! forwards them to the document-analysis backend with per-attempt
//! deadlines, exponential backoff and response validation.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────┐
//!                      │                    GATEWAY                        │
//!   Presentation       │  ┌─────────┐    ┌────────────┐    ┌────────────┐  │
//!   ───────────────────┼─▶│  http   │───▶│  gateway   │───▶│  backend   │──┼──▶ Backend
//!                      │  │ server  │    │ procedures │    │ RagClient  │  │    (HTTP)
//!   ◀──────────────────┼──│         │◀───│ + fallback │◀───│ + validate │◀─┼───
//!                      │  └─────────┘    └────────────┘    └─────┬──────┘  │
//!                      │                                         │         │
//!                      │  ┌──────────┐ ┌──────────────┐ ┌────────▼──────┐  │
//!                      │  │  config  │ │observability │ │  resilience   │  │
//!                      │  │          │ │ logs+metrics │ │deadline/retry │  │
//!                      │  └──────────┘ └──────────────┘ └───────────────┘  │
//!                      └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rag_gateway::config;
use rag_gateway::http::HttpServer;
use rag_gateway::lifecycle::{signals, Shutdown};
use rag_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rag-gateway")]
#[command(about = "Resilient API gateway for the document-analysis backend", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (mut config, override_warnings) = config::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level)?;

    tracing::info!("rag-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    for warning in &override_warnings {
        tracing::warn!(var = warning.var, value = %warning.value, "Ignoring unparseable override");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        timeout_ms = config.backend.timeout_ms,
        max_attempts = config.retries.max_attempts,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    let server_task = tokio::spawn(server.run(listener, server_shutdown));

    signals::forward_to(&shutdown).await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
