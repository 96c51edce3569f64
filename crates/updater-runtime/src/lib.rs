//! # Pathfinder Updater Runtime
//!
//! Keeps a Circles pathfinder's capacity graph in step with the chain.
//!
//! ```text
//! Indexer ──ws──→ IndexerSubscription ──mpsc──→ Orchestrator
//!                                                 │
//!                      ┌──────────────────────────┼─────────────────────┐
//!                      ↓                          ↓                     ↓
//!               LedgerStore              BinaryEdgeExporter     PathfinderRpcClient
//!          (latest block, changes)        (snapshot file)        (reload request)
//!
//! HealthEndpoint ←── HealthMonitor("Indexer"), HealthMonitor("Pathfinder")
//! ```
//!
//! ## Failure model
//!
//! Every failure after startup is fatal: it is logged with its step and
//! source chain, then the process exits with code 99 and the supervisor
//! restarts it. The only absorbed conditions are empty events, reorg
//! sentinels and triggers arriving while a cycle is running.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod wiring;

pub use config::{CliArgs, ConfigError, UpdaterConfig};
pub use error::{error_chain, RuntimeError, UpdateError};
pub use orchestrator::{
    Orchestrator, OrchestratorDeps, OrchestratorSettings, Trigger, TriggerOutcome,
};
pub use ports::{ProcessExit, StdProcessExit, FATAL_EXIT_CODE};
pub use wiring::{ShutdownHandle, UpdaterRuntime};
