//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID → backend call options)
//!     → handlers.rs (decode input, invoke gateway procedure)
//!     → response.rs (errors → status + JSON envelope)
//!     → Send to client
//! ```
//!
//! # Routes
//! - `GET  /api/rag/stats`   getStats
//! - `POST /api/rag/query`   query
//! - `POST /api/rag/extract` extract
//! - `GET  /api/rag/health`  healthCheck
//! - `GET  /healthz`         gateway liveness

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;
