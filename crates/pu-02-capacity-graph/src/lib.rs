//! # PU-02 Capacity Graph
//!
//! Reads the capacity edges that changed since a block from the
//! ledger-state store and writes them as a binary snapshot for the
//! pathfinder.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): capacity parsing, identifier
//!   normalisation, snapshot layout
//! - **Ports Layer** (`ports/`): `QueryProvider`, `LedgerStore`,
//!   `GraphExporter`
//! - **Adapters Layer** (`adapters/`): PostgreSQL store with a streaming
//!   `CapacityEdgeReader`, per-version SQL, `BinaryEdgeExporter`
//!
//! ## Invariants
//!
//! - A capacity that is not an integer after truncating at `.` is a
//!   `DataIntegrity` error. Rows are never skipped.
//! - Identifiers lose exactly their first two characters.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

pub use adapters::{
    describe_connection_string, queries_for, BinaryEdgeExporter, CapacityEdgeReader,
    PostgresLedgerStore,
};
pub use domain::{parse_capacity, CapacityEdgeBatch, ExportSummary};
pub use error::CapacityGraphError;
pub use ports::{GraphExporter, LedgerStore, QueryProvider};
