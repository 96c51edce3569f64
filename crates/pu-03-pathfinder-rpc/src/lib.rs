//! # PU-03 Pathfinder RPC
//!
//! Reload client. Tells the pathfinder to load a freshly exported snapshot
//! from the path it can see, which may differ from where the exporter wrote
//! it (different mount points).
//!
//! Transport failures, non-2xx answers and JSON-RPC errors are all
//! [`ReloadError`]s. There is no retry here.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;

pub use adapters::PathfinderRpcClient;
pub use domain::{ReloadResponse, DEFAULT_RELOAD_METHOD};
pub use error::ReloadError;
pub use ports::GraphReloader;
