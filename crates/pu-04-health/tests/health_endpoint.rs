//! # Health Endpoint Tests
//!
//! Requests go straight into the router with `tower::ServiceExt::oneshot`,
//! except for the graceful shutdown test which binds a real listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use pu_04_health::{HealthEndpoint, HealthMonitor, DEFAULT_THRESHOLD};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn monitors() -> (Arc<HealthMonitor>, Arc<HealthMonitor>) {
    (
        Arc::new(HealthMonitor::new("Indexer", DEFAULT_THRESHOLD)),
        Arc::new(HealthMonitor::new("Pathfinder", DEFAULT_THRESHOLD)),
    )
}

fn endpoint(indexer: &Arc<HealthMonitor>, pathfinder: &Arc<HealthMonitor>) -> HealthEndpoint {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    HealthEndpoint::new(addr, vec![indexer.clone(), pathfinder.clone()])
}

async fn get(endpoint: &HealthEndpoint, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = endpoint
        .router()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test(start_paused = true)]
async fn test_unhealthy_until_every_monitor_signals() {
    let (indexer, pathfinder) = monitors();
    let endpoint = endpoint(&indexer, &pathfinder);

    let (status, _) = get(&endpoint, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    indexer.keep_alive();
    let (status, _) = get(&endpoint, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    pathfinder.keep_alive();
    let (status, body) = get(&endpoint, "/").await;
    assert_eq!(status, StatusCode::OK);

    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["status"], "healthy");
    assert_eq!(report["monitors"][0]["name"], "Indexer");
    assert_eq!(report["monitors"][1]["name"], "Pathfinder");
    assert_eq!(report["monitors"][1]["threshold_secs"], 30);
}

#[tokio::test(start_paused = true)]
async fn test_stale_monitor_turns_endpoint_unhealthy() {
    let (indexer, pathfinder) = monitors();
    let endpoint = endpoint(&indexer, &pathfinder);
    indexer.keep_alive();
    pathfinder.keep_alive();

    tokio::time::advance(Duration::from_secs(20)).await;
    indexer.keep_alive();
    tokio::time::advance(Duration::from_secs(15)).await;

    let (status, body) = get(&endpoint, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["monitors"][0]["healthy"], true);
    assert_eq!(report["monitors"][1]["healthy"], false);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let _ = updater_telemetry::register_metrics();
    updater_telemetry::REORGS_OBSERVED.inc();

    let (indexer, pathfinder) = monitors();
    let (status, body) = get(&endpoint(&indexer, &pathfinder), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("pu_updater_reorgs_observed_total"));
}

#[tokio::test]
async fn test_serve_stops_on_cancel() {
    let (indexer, pathfinder) = monitors();
    let shutdown = CancellationToken::new();
    let server = tokio::spawn(endpoint(&indexer, &pathfinder).serve(shutdown.clone()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
