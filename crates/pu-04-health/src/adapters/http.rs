//! axum listener for liveness probes and Prometheus scrapes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::{HealthMonitor, MonitorStatus};
use crate::error::HealthError;

/// Default listen address of the health endpoint.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8794";

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    monitors: Vec<MonitorStatus>,
}

#[derive(Clone)]
struct EndpointState {
    monitors: Arc<[Arc<HealthMonitor>]>,
}

/// Aggregates monitors behind `GET /health`.
///
/// Answers 200 only when every monitor is healthy, 503 otherwise.
pub struct HealthEndpoint {
    bind_address: SocketAddr,
    monitors: Vec<Arc<HealthMonitor>>,
}

impl HealthEndpoint {
    pub fn new(bind_address: SocketAddr, monitors: Vec<Arc<HealthMonitor>>) -> Self {
        Self {
            bind_address,
            monitors,
        }
    }

    pub fn router(&self) -> Router {
        let state = EndpointState {
            monitors: self.monitors.clone().into(),
        };
        Router::new()
            .route("/", get(health_check))
            .route("/health", get(health_check))
            .route("/metrics", get(metrics))
            .with_state(state)
    }

    /// Serve until `shutdown` is cancelled.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), HealthError> {
        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .map_err(|source| HealthError::Bind {
                addr: self.bind_address,
                source,
            })?;
        info!(addr = %self.bind_address, "Health endpoint listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        info!("Health endpoint stopped");
        Ok(())
    }
}

async fn health_check(State(state): State<EndpointState>) -> impl IntoResponse {
    let monitors: Vec<MonitorStatus> = state.monitors.iter().map(|m| m.status()).collect();
    let healthy = monitors.iter().all(|m| m.healthy);

    let (code, status) = if healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };
    (code, Json(HealthReport { status, monitors }))
}

async fn metrics() -> Response {
    match updater_telemetry::encode_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
