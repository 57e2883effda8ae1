//! Consumer-facing result shapes.
//!
//! Field names here are the gateway's own; backend names such as
//! `embedding_model` never cross this boundary.

use serde::{Deserialize, Serialize};

use crate::backend::{StatsStatus, SystemStats};

/// Index statistics as shown to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStats {
    pub document_count: u64,
    pub vector_count: u64,
    pub embedding_model_name: String,
    pub compute_device: String,
    pub status: StatsStatus,
}

impl GatewayStats {
    /// Placeholder returned when the backend cannot report stats.
    pub fn fallback() -> Self {
        Self {
            document_count: 0,
            vector_count: 0,
            embedding_model_name: "unknown".to_string(),
            compute_device: "unknown".to_string(),
            status: StatsStatus::Error,
        }
    }
}

impl From<SystemStats> for GatewayStats {
    fn from(stats: SystemStats) -> Self {
        Self {
            document_count: stats.document_count,
            vector_count: stats.vector_count,
            embedding_model_name: stats.embedding_model_name,
            compute_device: stats.compute_device,
            status: stats.status,
        }
    }
}

/// Backend health as shown to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayHealth {
    pub status: String,
    pub message: String,
    pub healthy: bool,
}

/// Text produced by a successful query or extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayAnswer {
    pub result: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_serialize_camel_case() {
        let json = serde_json::to_value(GatewayStats::fallback()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "documentCount": 0,
                "vectorCount": 0,
                "embeddingModelName": "unknown",
                "computeDevice": "unknown",
                "status": "error",
            })
        );
    }

    #[test]
    fn test_stats_map_one_to_one() {
        let stats = SystemStats {
            document_count: 4,
            vector_count: 120,
            embedding_model_name: "bge-m3".to_string(),
            compute_device: "cuda:0".to_string(),
            status: StatsStatus::Ready,
        };
        let mapped = GatewayStats::from(stats);
        assert_eq!(mapped.document_count, 4);
        assert_eq!(mapped.vector_count, 120);
        assert_eq!(mapped.embedding_model_name, "bge-m3");
        assert_eq!(mapped.compute_device, "cuda:0");
        assert_eq!(mapped.status, StatsStatus::Ready);
    }
}
