//! # Update Orchestrator
//!
//! Consumes block update events and timer ticks and runs at most one
//! read, export, reload cycle at a time.
//!
//! ```text
//! event ──┬─ empty ────────────→ Ignored
//!         ├─ reorg sentinel ───→ Reorg (log only)
//!         └─ keep-alive(Indexer)
//!               │
//! tick ─────────┴─ try_acquire ─┬─ busy ─→ Busy (dropped, not queued)
//!                               └─ cycle ─┬─ ok ──→ Updated, release
//!                                         └─ err ─→ exit(99), flag stays busy
//! ```
//!
//! Each event is handled on its own task so that a running cycle never
//! blocks the feed. The timer only exists for protocol v2.

mod cursor;
mod step;
mod working_flag;

pub use cursor::AtomicCursor;
pub use working_flag::{WorkingFlag, WorkingPermit};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pu_02_capacity_graph::{GraphExporter, LedgerStore};
use pu_03_pathfinder_rpc::GraphReloader;
use pu_04_health::HealthMonitor;
use shared_types::{BlockCursor, BlockNumber, BlockUpdateEvent, ProtocolVersion};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use updater_telemetry::{
    HistogramTimer, BLOCK_EVENTS_RECEIVED, CHANGED_EDGES, CURRENT_BLOCK, CYCLES_COMPLETED,
    CYCLE_DURATION, EMPTY_EVENTS_IGNORED, LAST_FULL_UPDATE_BLOCK, REORGS_OBSERVED,
    TRIGGERS_DROPPED,
};

use crate::error::{error_chain, UpdateError};
use crate::ports::{ProcessExit, FATAL_EXIT_CODE};
use step::timed;

/// What started a cycle attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Event,
    Timer,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Event => "event",
            Trigger::Timer => "timer",
        }
    }
}

/// Result of handling one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Event without transaction hashes.
    Ignored,
    /// Event carrying the reorg sentinel.
    Reorg,
    /// Another cycle held the working flag; the trigger was dropped.
    Busy,
    /// Cycle completed; the pathfinder now reflects `block`.
    Updated { block: BlockNumber },
    /// Cycle failed and the exit hook was invoked.
    Failed,
}

/// Collaborators of the orchestrator.
pub struct OrchestratorDeps {
    pub store: Arc<dyn LedgerStore>,
    pub exporter: Arc<dyn GraphExporter>,
    pub reloader: Arc<dyn GraphReloader>,
    pub exit: Arc<dyn ProcessExit>,
    pub indexer_health: Arc<HealthMonitor>,
    pub pathfinder_health: Arc<HealthMonitor>,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub protocol: ProtocolVersion,
    /// Where the exporter writes the snapshot.
    pub internal_graph_path: PathBuf,
    /// The same snapshot as the pathfinder sees it.
    pub external_graph_path: String,
    pub periodic_interval: Duration,
}

pub struct Orchestrator {
    deps: OrchestratorDeps,
    settings: OrchestratorSettings,
    working: WorkingFlag,
    cursor: AtomicCursor,
    shutdown: CancellationToken,
    fatal: CancellationToken,
}

impl Orchestrator {
    pub fn new(deps: OrchestratorDeps, settings: OrchestratorSettings) -> Self {
        Self {
            deps,
            settings,
            working: WorkingFlag::new(),
            cursor: AtomicCursor::default(),
            shutdown: CancellationToken::new(),
            fatal: CancellationToken::new(),
        }
    }

    pub fn cursor(&self) -> BlockCursor {
        self.cursor.snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.working.is_busy()
    }

    /// True once a cycle has failed.
    pub fn has_failed(&self) -> bool {
        self.fatal.is_cancelled()
    }

    /// Stop consuming triggers. An in-flight cycle still runs to completion.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub async fn handle_event(&self, event: BlockUpdateEvent) -> TriggerOutcome {
        BLOCK_EVENTS_RECEIVED.inc();

        if event.is_empty() {
            EMPTY_EVENTS_IGNORED.inc();
            debug!("Block update without transactions, ignoring");
            return TriggerOutcome::Ignored;
        }

        if event.is_reorg() {
            REORGS_OBSERVED.inc();
            warn!(
                transactions = event.len(),
                cursor = ?self.cursor.snapshot(),
                "Reorg detected, no update cycle started"
            );
            return TriggerOutcome::Reorg;
        }

        self.deps.indexer_health.keep_alive();
        info!(transactions = event.len(), "New block");
        self.try_run_cycle(Trigger::Event).await
    }

    pub async fn handle_tick(&self) -> TriggerOutcome {
        debug!("Periodic update tick");
        self.try_run_cycle(Trigger::Timer).await
    }

    async fn try_run_cycle(&self, trigger: Trigger) -> TriggerOutcome {
        let Some(permit) = self.working.try_acquire() else {
            TRIGGERS_DROPPED.with_label_values(&[trigger.as_str()]).inc();
            info!(trigger = trigger.as_str(), "Update already in progress, dropping trigger");
            return TriggerOutcome::Busy;
        };

        let span = info_span!("update_cycle", trigger = trigger.as_str());
        match self.run_cycle(trigger).instrument(span).await {
            Ok(block) => {
                permit.release();
                TriggerOutcome::Updated { block }
            }
            Err(e) => {
                error!(
                    trigger = trigger.as_str(),
                    step = e.step(),
                    error = %error_chain(&e),
                    "Update cycle failed, exiting"
                );
                self.fatal.cancel();
                self.deps.exit.exit(FATAL_EXIT_CODE);
                permit.abandon();
                TriggerOutcome::Failed
            }
        }
    }

    async fn run_cycle(&self, trigger: Trigger) -> Result<BlockNumber, UpdateError> {
        let _timer = HistogramTimer::new(&CYCLE_DURATION);
        let since = self.cursor.last_full_update();

        let latest = timed("latest_block", self.deps.store.latest_block_number())
            .await
            .map_err(UpdateError::LatestBlock)?;
        if latest < since {
            warn!(
                block = latest,
                last_full_update = since,
                "Latest block is behind the last full update"
            );
        }
        self.cursor.set_current_block(latest);
        CURRENT_BLOCK.set(latest as f64);

        let batch = timed("read_changes", self.deps.store.changes_since(since))
            .await
            .map_err(|source| UpdateError::ReadChanges { since, source })?;
        info!(
            since_block = since,
            edges = batch.len(),
            query_ms = batch.query_duration.as_millis() as u64,
            transfer_ms = batch.transfer_duration.as_millis() as u64,
            total_ms = batch.total_duration.as_millis() as u64,
            "Read changed capacity edges"
        );

        let internal_path = &self.settings.internal_graph_path;
        let summary = timed(
            "export",
            self.deps.exporter.export(&batch.edges, internal_path),
        )
        .await
        .map_err(|source| UpdateError::Export {
            path: internal_path.clone(),
            source,
        })?;
        debug!(
            addresses = summary.address_count,
            bytes = summary.bytes_written,
            "Snapshot written"
        );

        let external_path = &self.settings.external_graph_path;
        timed("reload", self.deps.reloader.reload(external_path))
            .await
            .map_err(|source| UpdateError::Reload {
                path: external_path.clone(),
                source,
            })?;

        self.deps.pathfinder_health.keep_alive();
        self.cursor.set_last_full_update(latest);
        LAST_FULL_UPDATE_BLOCK.set(latest as f64);
        CHANGED_EDGES.set(batch.len() as f64);
        CYCLES_COMPLETED.with_label_values(&[trigger.as_str()]).inc();

        info!(
            block = latest,
            edges = batch.len(),
            trigger = trigger.as_str(),
            "Pathfinder updated"
        );
        Ok(latest)
    }

    /// Consume `events` until shutdown, a failed cycle, or the feed closing.
    ///
    /// Returns after every spawned handler and the timer have finished.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<BlockUpdateEvent>) {
        let stop_timer = self.shutdown.child_token();
        let timer = self
            .settings
            .protocol
            .has_periodic_resync()
            .then(|| tokio::spawn(self.clone().run_timer(stop_timer.clone())));

        let mut handlers = JoinSet::new();
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = self.fatal.cancelled() => break,
                Some(_) = handlers.join_next(), if !handlers.is_empty() => {}
                received = events.recv() => match received {
                    Some(event) => {
                        let this = self.clone();
                        handlers.spawn(async move { this.handle_event(event).await });
                    }
                    None => {
                        info!("Block update feed closed");
                        break;
                    }
                },
            }
        }

        stop_timer.cancel();
        if let Some(timer) = timer {
            if let Err(e) = timer.await {
                error!(error = %e, "Periodic update task failed");
            }
        }
        while let Some(joined) = handlers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Block update handler failed");
            }
        }
        info!(cursor = ?self.cursor.snapshot(), "Orchestrator stopped");
    }

    async fn run_timer(self: Arc<Self>, stop: CancellationToken) {
        let period = self.settings.periodic_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "Periodic update timer started");

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = self.fatal.cancelled() => break,
                _ = ticker.tick() => {
                    self.handle_tick().await;
                }
            }
        }
    }
}
