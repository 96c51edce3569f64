//! # Ports
//!
//! - `QueryProvider`: SQL text per ledger schema version, chosen once at startup
//! - `LedgerStore`: driven port to the ledger-state store
//! - `GraphExporter`: driven port that writes a snapshot artifact

use std::path::Path;

use async_trait::async_trait;
use shared_types::{BlockNumber, CapacityEdge, ProtocolVersion};

use crate::domain::{CapacityEdgeBatch, ExportSummary};
use crate::error::CapacityGraphError;

/// Version-specific queries against the ledger-state store.
pub trait QueryProvider: Send + Sync {
    fn version(&self) -> ProtocolVersion;

    /// Single-column, single-row query for the newest indexed block.
    fn latest_block_number_sql(&self) -> &'static str;

    /// Changed edges after block `$1` (bigint), as four text columns:
    /// sender, receiver, token owner, capacity.
    fn changes_since_sql(&self) -> &'static str;
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Newest block number in the store.
    async fn latest_block_number(&self) -> Result<BlockNumber, CapacityGraphError>;

    /// Every capacity edge that changed after `since`.
    async fn changes_since(&self, since: BlockNumber)
        -> Result<CapacityEdgeBatch, CapacityGraphError>;
}

#[async_trait]
pub trait GraphExporter: Send + Sync {
    /// Write `edges` as a snapshot at `path`.
    async fn export(
        &self,
        edges: &[CapacityEdge],
        path: &Path,
    ) -> Result<ExportSummary, CapacityGraphError>;
}
