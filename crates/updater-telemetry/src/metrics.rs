//! Prometheus metrics for the pathfinder updater.
//!
//! All metrics follow the naming convention: `pu_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., cycles_completed_total)
//! - **Gauge**: Value that can go up or down (e.g., last_full_update_block)
//! - **Histogram**: Distribution of values (e.g., cycle_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // INDEXER FEED METRICS
    // =========================================================================

    /// Block update events decoded from the indexer feed
    pub static ref BLOCK_EVENTS_RECEIVED: Counter = Counter::new(
        "pu_indexer_block_events_received_total",
        "Total block update events decoded from the indexer feed"
    ).expect("metric creation failed");

    // =========================================================================
    // ORCHESTRATOR METRICS
    // =========================================================================

    /// Update cycles that ran to completion
    pub static ref CYCLES_COMPLETED: CounterVec = CounterVec::new(
        Opts::new("pu_updater_cycles_completed_total", "Update cycles completed"),
        &["trigger"]  // trigger: event/timer
    ).expect("metric creation failed");

    /// Triggers dropped because a cycle was already running
    pub static ref TRIGGERS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("pu_updater_triggers_dropped_total", "Triggers dropped while busy"),
        &["trigger"]
    ).expect("metric creation failed");

    /// Events ignored because they carried no transaction hashes
    pub static ref EMPTY_EVENTS_IGNORED: Counter = Counter::new(
        "pu_updater_empty_events_ignored_total",
        "Block update events without transaction hashes"
    ).expect("metric creation failed");

    /// Reorg sentinels seen on the feed
    pub static ref REORGS_OBSERVED: Counter = Counter::new(
        "pu_updater_reorgs_observed_total",
        "Block update events carrying the reorg sentinel"
    ).expect("metric creation failed");

    /// Newest block number seen in the ledger-state store
    pub static ref CURRENT_BLOCK: Gauge = Gauge::new(
        "pu_updater_current_block",
        "Latest block number observed in the ledger-state store"
    ).expect("metric creation failed");

    /// Block the pathfinder was last reloaded at
    pub static ref LAST_FULL_UPDATE_BLOCK: Gauge = Gauge::new(
        "pu_updater_last_full_update_block",
        "Block number of the last successful pathfinder reload"
    ).expect("metric creation failed");

    /// Changed edges exported by the last cycle
    pub static ref CHANGED_EDGES: Gauge = Gauge::new(
        "pu_updater_changed_edges",
        "Capacity edges exported by the most recent cycle"
    ).expect("metric creation failed");

    /// Wall time of a full update cycle
    pub static ref CYCLE_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "pu_updater_cycle_duration_seconds",
            "Time spent in one query-export-reload cycle"
        ).buckets(exponential_buckets(0.05, 2.0, 12).unwrap())
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Fails if called twice.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Feed
        Box::new(BLOCK_EVENTS_RECEIVED.clone()),
        // Orchestrator
        Box::new(CYCLES_COMPLETED.clone()),
        Box::new(TRIGGERS_DROPPED.clone()),
        Box::new(EMPTY_EVENTS_IGNORED.clone()),
        Box::new(REORGS_OBSERVED.clone()),
        Box::new(CURRENT_BLOCK.clone()),
        Box::new(LAST_FULL_UPDATE_BLOCK.clone()),
        Box::new(CHANGED_EDGES.clone()),
        Box::new(CYCLE_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics() {
        // Only the first registration in this process succeeds
        let _ = register_metrics();
        CYCLES_COMPLETED.with_label_values(&["event"]).inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("pu_updater_cycles_completed_total{trigger=\"event\"}"));
        assert!(text.contains("pu_updater_cycle_duration_seconds"));
    }

    #[test]
    fn test_counter_vec_labels() {
        TRIGGERS_DROPPED.with_label_values(&["timer"]).inc();
        assert!(TRIGGERS_DROPPED.with_label_values(&["timer"]).get() >= 1.0);
    }

    #[test]
    fn test_gauge_set() {
        CHANGED_EDGES.set(42.0);
        assert_eq!(CHANGED_EDGES.get(), 42.0);
    }

    #[test]
    fn test_histogram_timer() {
        let before = CYCLE_DURATION.get_sample_count();
        {
            let _timer = HistogramTimer::new(&CYCLE_DURATION);
        }
        assert!(CYCLE_DURATION.get_sample_count() > before);
    }
}
