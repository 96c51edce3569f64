use std::path::PathBuf;
use std::time::Duration;

use shared_types::CapacityEdge;

/// The changed edges of one incremental read, with timings.
///
/// `query_duration` covers issuing the query until the first response,
/// `transfer_duration` the remaining row transfer.
#[derive(Debug, Clone, Default)]
pub struct CapacityEdgeBatch {
    pub edges: Vec<CapacityEdge>,
    pub query_duration: Duration,
    pub transfer_duration: Duration,
    pub total_duration: Duration,
}

impl CapacityEdgeBatch {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Result of writing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub address_count: usize,
    pub edge_count: usize,
    pub bytes_written: usize,
}
