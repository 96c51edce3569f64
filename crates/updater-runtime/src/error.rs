//! Runtime error types.

use std::path::PathBuf;

use pu_01_indexer_subscription::SubscriptionError;
use pu_02_capacity_graph::CapacityGraphError;
use pu_03_pathfinder_rpc::ReloadError;
use shared_types::BlockNumber;
use thiserror::Error;

/// A failed step of an update cycle. Always fatal.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Failed to find the latest block number")]
    LatestBlock(#[source] CapacityGraphError),

    #[error("Failed to read capacity changes since block {since}")]
    ReadChanges {
        since: BlockNumber,
        #[source]
        source: CapacityGraphError,
    },

    #[error("Failed to export the capacity graph to '{}'", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: CapacityGraphError,
    },

    #[error("Failed to reload the pathfinder from '{path}'")]
    Reload {
        path: String,
        #[source]
        source: ReloadError,
    },
}

impl UpdateError {
    /// Name of the failing step, for logs.
    pub fn step(&self) -> &'static str {
        match self {
            UpdateError::LatestBlock(_) => "latest_block",
            UpdateError::ReadChanges { .. } => "read_changes",
            UpdateError::Export { .. } => "export",
            UpdateError::Reload { .. } => "reload",
        }
    }
}

/// Errors while building or running the updater.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Ledger store setup failed: {0}")]
    Store(#[from] CapacityGraphError),

    #[error("Reload client setup failed: {0}")]
    Reload(#[from] ReloadError),

    #[error("Indexer subscription failed: {0}")]
    Subscription(#[from] SubscriptionError),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Render an error with all of its sources, outermost first.
///
/// A source whose message the previous level already embeds is not
/// repeated.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut chain = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !chain.ends_with(&message) {
            chain.push_str(": ");
            chain.push_str(&message);
        }
        source = cause.source();
    }
    chain
}
