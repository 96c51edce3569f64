//! # PU-04 Health
//!
//! Liveness for the external process supervisor.
//!
//! - [`HealthMonitor`]: one named keep-alive signal with a staleness threshold
//! - [`HealthEndpoint`]: axum listener answering `GET /` and `GET /health`
//!   (200 when all monitors are healthy, 503 otherwise) and `GET /metrics`
//!
//! The updater registers two monitors, `Indexer` and `Pathfinder`, both with
//! a 30 second threshold.

pub mod adapters;
pub mod domain;
pub mod error;

pub use adapters::{HealthEndpoint, DEFAULT_BIND_ADDRESS};
pub use domain::{HealthMonitor, MonitorStatus, DEFAULT_THRESHOLD};
pub use error::HealthError;

/// Monitor fed by processed block update events.
pub const INDEXER_MONITOR: &str = "Indexer";

/// Monitor fed by successful pathfinder reloads.
pub const PATHFINDER_MONITOR: &str = "Pathfinder";
