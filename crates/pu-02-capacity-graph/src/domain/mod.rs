//! Pure capacity graph rules: row conversion, batches, snapshot layout.

pub mod batch;
pub mod edge;
pub mod snapshot;

pub use batch::{CapacityEdgeBatch, ExportSummary};
pub use edge::{edge_from_columns, normalize_identifier, parse_capacity};
pub use snapshot::{encode_edges, EncodedSnapshot};
