//! Error types for the capacity graph subsystem.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapacityGraphError {
    #[error("Invalid ledger store connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Failed to connect to the ledger store ({target})")]
    Connect {
        target: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Ledger store query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("The ledger store contains no blocks")]
    NoBlocks,

    /// A row that cannot be turned into a capacity edge. Never skipped.
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Snapshot encoding failed: {0}")]
    Encoding(String),

    #[error("Snapshot write to {} failed", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CapacityGraphError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
