//! # Updater Telemetry
//!
//! Logging, tracing and metrics for the pathfinder updater.
//!
//! ## Components
//!
//! - Structured logs through `tracing-subscriber` (pretty or JSON)
//! - Optional span export over OTLP when an endpoint is configured
//! - Prometheus metrics, served by the health listener at `/metrics`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use updater_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PU_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `PU_JSON_LOGS` | `true` in containers | JSON log output |
//! | `OTEL_SERVICE_NAME` | `pathfinder-updater` | Service name in traces |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | OTLP span export endpoint |

mod config;
mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, BLOCK_EVENTS_RECEIVED,
    CHANGED_EDGES, CURRENT_BLOCK, CYCLES_COMPLETED, CYCLE_DURATION, EMPTY_EVENTS_IGNORED,
    LAST_FULL_UPDATE_BLOCK, REORGS_OBSERVED, TRIGGERS_DROPPED,
};
pub use tracing_setup::{init_tracing, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize OpenTelemetry tracer: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize metrics and the global tracing subscriber.
///
/// Returns a guard that must be held for the lifetime of the application.
/// When dropped, pending spans are flushed.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first (synchronous, no subscriber needed)
    register_metrics()?;

    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shutdown.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::Config("bad filter".into());
        assert_eq!(err.to_string(), "Invalid configuration: bad filter");
    }
}
