//! Behaviour of the resilient backend client against a live mock backend.

use std::time::{Duration, Instant};

use rag_gateway::backend::{CallError, CallOptions, RagClient, StatsStatus};
use rag_gateway::config::BackendEndpointConfig;
use rag_gateway::resilience::RetryPolicy;
use tokio_util::sync::CancellationToken;

mod common;

use common::{SUCCESS_BODY, STATS_BODY};

const UNIT_MS: u64 = 50;

fn client(base_url: String, timeout_ms: u64) -> RagClient {
    RagClient::new(
        BackendEndpointConfig::new(base_url, timeout_ms),
        RetryPolicy::new(3, Duration::from_millis(UNIT_MS)),
    )
    .unwrap()
}

#[tokio::test]
async fn test_first_attempt_success_makes_one_call() {
    let backend = common::start_fixed_backend(200, SUCCESS_BODY).await;
    let client = client(backend.url(), 2_000);

    let result = client.query("What is B500?", 3).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(result.text, "Class B500 has yield strength 500 MPa");
    assert_eq!(backend.hits(), 1);

    let request = &backend.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/query");
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.json(), serde_json::json!({ "question": "What is B500?" }));
}

#[tokio::test]
async fn test_extract_sends_class_name() {
    let backend = common::start_fixed_backend(200, SUCCESS_BODY).await;
    let client = client(backend.url(), 2_000);

    client.extract("B500", 1).await.unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/extract");
    assert_eq!(request.json(), serde_json::json!({ "class_name": "B500" }));
}

#[tokio::test]
async fn test_always_timing_out_exhausts_attempts() {
    let backend = common::start_silent_backend().await;
    let client = client(backend.url(), 200);

    let start = Instant::now();
    let err = client.query("slow question", 3).await.unwrap_err();
    let elapsed = start.elapsed();

    match &err {
        CallError::RetriesExhausted { attempts, last } => {
            assert_eq!(*attempts, 3);
            assert_eq!(**last, CallError::Timeout { after_ms: 200 });
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(backend.hits(), 3);

    // 3 deadlines plus waits of 1 and 2 units.
    let floor = Duration::from_millis(3 * 200 + (1 + 2) * UNIT_MS);
    assert!(elapsed >= floor, "finished too early: {elapsed:?}");
}

#[tokio::test]
async fn test_recovers_after_server_error() {
    let backend = common::start_programmable_backend(|index, _| async move {
        if index == 0 {
            (503, r#"{"detail":"warming up"}"#.to_string())
        } else {
            (200, SUCCESS_BODY.to_string())
        }
    })
    .await;
    let client = client(backend.url(), 2_000);

    let result = client.extract("B500", 3).await.unwrap();

    assert!(result.succeeded);
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn test_default_calls_use_configured_budget() {
    let backend = common::start_fixed_backend(500, r#"{"detail":"down"}"#).await;
    let client = client(backend.url(), 2_000);

    let err = client.query_default("q").await.unwrap_err();
    assert!(matches!(err, CallError::RetriesExhausted { attempts: 3, .. }));
    assert_eq!(backend.hits(), 3);

    client.extract_default("B500").await.unwrap_err();
    assert_eq!(backend.hits(), 6);
}

#[tokio::test]
async fn test_missing_success_field_consumes_an_attempt() {
    let backend = common::start_programmable_backend(|index, _| async move {
        if index == 0 {
            (200, r#"{"result":"looks fine"}"#.to_string())
        } else {
            (200, SUCCESS_BODY.to_string())
        }
    })
    .await;
    let client = client(backend.url(), 2_000);

    let result = client.query("q", 3).await.unwrap();

    assert_eq!(result.text, "Class B500 has yield strength 500 MPa");
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn test_persistently_malformed_reports_last_cause() {
    let backend = common::start_fixed_backend(200, r#"{"result":"no flag"}"#).await;
    let client = client(backend.url(), 2_000);

    let err = client.query("q", 2).await.unwrap_err();

    assert!(matches!(
        err,
        CallError::RetriesExhausted { attempts: 2, ref last } if matches!(**last, CallError::MalformedResponse(_))
    ));
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn test_unsuccessful_result_is_returned_not_retried() {
    let backend =
        common::start_fixed_backend(200, r#"{"result":"","success":false,"error":"index empty"}"#).await;
    let client = client(backend.url(), 2_000);

    let result = client.query("q", 3).await.unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.error_detail.as_deref(), Some("index empty"));
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_stats_single_attempt_and_mapping() {
    let backend = common::start_fixed_backend(200, STATS_BODY).await;
    let client = client(backend.url(), 2_000);

    let stats = client.get_stats().await.unwrap();

    assert_eq!(stats.document_count, 7);
    assert_eq!(stats.vector_count, 1840);
    assert_eq!(stats.embedding_model_name, "text-embedding-3-small");
    assert_eq!(stats.compute_device, "cuda");
    assert_eq!(stats.status, StatsStatus::Ready);
    let request = &backend.requests()[0];
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/stats");
    assert_eq!(request.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn test_liveness_calls_do_not_retry() {
    let backend = common::start_fixed_backend(503, r#"{"detail":"not initialised"}"#).await;
    let client = client(backend.url(), 2_000);

    let err = client.health_check().await.unwrap_err();
    match err {
        CallError::Unavailable(inner) => {
            assert!(matches!(*inner, CallError::BackendError { status: 503, .. }))
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }

    let err = client.get_stats().await.unwrap_err();
    assert!(matches!(err, CallError::Unavailable(_)));
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let client = client(common::unreachable_url(), 2_000);

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err.root_cause(), CallError::NetworkError(_)));

    let err = client.query("q", 2).await.unwrap_err();
    assert!(matches!(err, CallError::RetriesExhausted { attempts: 2, .. }));
    assert!(matches!(err.root_cause(), CallError::NetworkError(_)));
}

#[tokio::test]
async fn test_request_id_forwarded() {
    let backend = common::start_fixed_backend(200, SUCCESS_BODY).await;
    let client = client(backend.url(), 2_000);

    let opts = CallOptions::default().request_id("trace-42");
    client.query_with("q", &opts).await.unwrap();

    assert_eq!(backend.requests()[0].header("x-request-id"), Some("trace-42"));
}

#[tokio::test]
async fn test_abandoned_call_during_backoff_sends_nothing_more() {
    let backend = common::start_fixed_backend(500, "{}").await;
    let client = RagClient::new(
        BackendEndpointConfig::new(backend.url(), 2_000),
        RetryPolicy::new(3, Duration::from_millis(500)),
    )
    .unwrap();

    let task = tokio::spawn(async move { client.query("q", 3).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(backend.hits(), 1);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_cancel_token_during_backoff() {
    let backend = common::start_fixed_backend(500, "{}").await;
    let client = RagClient::new(
        BackendEndpointConfig::new(backend.url(), 2_000),
        RetryPolicy::new(3, Duration::from_millis(500)),
    )
    .unwrap();

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let opts = CallOptions::default().cancel_on(token);
    let start = Instant::now();
    let err = client.query_with("q", &opts).await.unwrap_err();

    assert_eq!(err, CallError::Cancelled);
    assert!(start.elapsed() < Duration::from_millis(500));

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(backend.hits(), 1);
}
