//! Assembles the subsystems and runs them.

use std::sync::Arc;

use pu_01_indexer_subscription::IndexerSubscription;
use pu_02_capacity_graph::{queries_for, BinaryEdgeExporter, PostgresLedgerStore};
use pu_03_pathfinder_rpc::PathfinderRpcClient;
use pu_04_health::{
    HealthEndpoint, HealthMonitor, DEFAULT_THRESHOLD, INDEXER_MONITOR, PATHFINDER_MONITOR,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::UpdaterConfig;
use crate::error::{error_chain, RuntimeError};
use crate::orchestrator::{Orchestrator, OrchestratorDeps, OrchestratorSettings};
use crate::ports::{ProcessExit, StdProcessExit, FATAL_EXIT_CODE};

/// Capacity of the subscriber to orchestrator queue. Handlers are spawned
/// per event, so the queue only buffers while a handler is being spawned.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// The wired updater: subscriber, orchestrator and health listener.
pub struct UpdaterRuntime {
    subscription: Arc<IndexerSubscription>,
    orchestrator: Arc<Orchestrator>,
    health: HealthEndpoint,
    health_shutdown: CancellationToken,
    exit: Arc<dyn ProcessExit>,
}

/// Cloneable handle that stops a running [`UpdaterRuntime`].
#[derive(Clone)]
pub struct ShutdownHandle {
    subscription: Arc<IndexerSubscription>,
    orchestrator: Arc<Orchestrator>,
    health_shutdown: CancellationToken,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        info!("Shutting down pathfinder updater");
        self.subscription.stop();
        self.orchestrator.shutdown();
        self.health_shutdown.cancel();
    }
}

impl UpdaterRuntime {
    pub fn build(config: UpdaterConfig) -> Result<Self, RuntimeError> {
        Self::with_exit(config, Arc::new(StdProcessExit))
    }

    /// Build with a custom exit hook.
    pub fn with_exit(config: UpdaterConfig, exit: Arc<dyn ProcessExit>) -> Result<Self, RuntimeError> {
        let store = PostgresLedgerStore::new(
            &config.indexer_db_connection_string,
            queries_for(config.version),
        )?;
        let reloader = PathfinderRpcClient::with_options(
            config.pathfinder_rpc_url.clone(),
            config.pathfinder_reload_method.clone(),
            config.pathfinder_rpc_timeout,
        )?;

        let indexer_health = Arc::new(HealthMonitor::new(INDEXER_MONITOR, DEFAULT_THRESHOLD));
        let pathfinder_health = Arc::new(HealthMonitor::new(PATHFINDER_MONITOR, DEFAULT_THRESHOLD));
        let health = HealthEndpoint::new(
            config.health_bind_address,
            vec![indexer_health.clone(), pathfinder_health.clone()],
        );

        let orchestrator = Orchestrator::new(
            OrchestratorDeps {
                store: Arc::new(store),
                exporter: Arc::new(BinaryEdgeExporter),
                reloader: Arc::new(reloader),
                exit: exit.clone(),
                indexer_health,
                pathfinder_health,
            },
            OrchestratorSettings {
                protocol: config.version,
                internal_graph_path: config.internal_capacity_graph_path,
                external_graph_path: config.external_capacity_graph_path,
                periodic_interval: config.periodic_update_interval,
            },
        );

        Ok(Self {
            subscription: Arc::new(IndexerSubscription::new(config.indexer_ws_url, config.version)),
            orchestrator: Arc::new(orchestrator),
            health,
            health_shutdown: CancellationToken::new(),
            exit,
        })
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            subscription: self.subscription.clone(),
            orchestrator: self.orchestrator.clone(),
            health_shutdown: self.health_shutdown.clone(),
        }
    }

    /// Run until shutdown or a fatal error.
    ///
    /// A failed subscription or health listener invokes the exit hook with
    /// code 99 before this returns.
    pub async fn run(self) -> Result<(), RuntimeError> {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

        let health_task = {
            let exit = self.exit.clone();
            let endpoint = self.health;
            let shutdown = self.health_shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = endpoint.serve(shutdown).await {
                    error!(error = %error_chain(&e), "Health endpoint failed, exiting");
                    exit.exit(FATAL_EXIT_CODE);
                }
            })
        };

        let orchestrator_task = {
            let orchestrator = self.orchestrator.clone();
            let subscription = self.subscription.clone();
            tokio::spawn(async move {
                orchestrator.run(events_rx).await;
                subscription.stop();
            })
        };

        let subscription_result = self.subscription.run(events_tx).await;
        if let Err(e) = &subscription_result {
            error!(error = %error_chain(e), "Indexer subscription failed, exiting");
            self.exit.exit(FATAL_EXIT_CODE);
        }

        self.orchestrator.shutdown();
        orchestrator_task.await?;
        self.health_shutdown.cancel();
        health_task.await?;

        subscription_result?;
        info!("Pathfinder updater stopped");
        Ok(())
    }
}
