//! Keep-alive based liveness monitor.

use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;

/// Staleness threshold used for both the indexer and the pathfinder signal.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_secs(30);

/// Tracks one named liveness signal.
///
/// Healthy iff a keep-alive has been recorded and less than `threshold` has
/// passed since the most recent one.
#[derive(Debug)]
pub struct HealthMonitor {
    name: String,
    threshold: Duration,
    last_keep_alive: Mutex<Option<Instant>>,
}

/// Snapshot of a monitor, as reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub name: String,
    pub healthy: bool,
    pub threshold_secs: u64,
    /// `None` until the first keep-alive.
    pub secs_since_keep_alive: Option<f64>,
}

impl HealthMonitor {
    pub fn new(name: impl Into<String>, threshold: Duration) -> Self {
        Self {
            name: name.into(),
            threshold,
            last_keep_alive: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn keep_alive(&self) {
        *self.last_keep_alive.lock() = Some(Instant::now());
    }

    pub fn is_healthy(&self) -> bool {
        self.elapsed().is_some_and(|elapsed| elapsed < self.threshold)
    }

    pub fn status(&self) -> MonitorStatus {
        let elapsed = self.elapsed();
        MonitorStatus {
            name: self.name.clone(),
            healthy: elapsed.is_some_and(|e| e < self.threshold),
            threshold_secs: self.threshold.as_secs(),
            secs_since_keep_alive: elapsed.map(|e| e.as_secs_f64()),
        }
    }

    fn elapsed(&self) -> Option<Duration> {
        let last = *self.last_keep_alive.lock();
        last.map(|at| at.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_unhealthy_before_first_keep_alive() {
        let monitor = HealthMonitor::new("Indexer", DEFAULT_THRESHOLD);
        assert!(!monitor.is_healthy());
        assert_eq!(monitor.status().secs_since_keep_alive, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_then_stale() {
        let monitor = HealthMonitor::new("Pathfinder", DEFAULT_THRESHOLD);
        monitor.keep_alive();
        assert!(monitor.is_healthy());

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(monitor.is_healthy());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!monitor.is_healthy());
        assert!(!monitor.status().healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_alive_resets_staleness() {
        let monitor = HealthMonitor::new("Indexer", Duration::from_secs(10));
        monitor.keep_alive();
        tokio::time::advance(Duration::from_secs(8)).await;
        monitor.keep_alive();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert!(monitor.is_healthy());
        assert_eq!(monitor.status().threshold_secs, 10);
    }
}
