pub mod binary_exporter;
pub mod postgres;
pub mod queries;

pub use binary_exporter::BinaryEdgeExporter;
pub use postgres::{describe_connection_string, CapacityEdgeReader, EdgeStream, PostgresLedgerStore};
pub use queries::{queries_for, V1Queries, V2Queries};
