//! # Shared Types Crate
//!
//! Value types exchanged between the updater's subsystems.
//!
//! ## Design Principles
//!
//! - **Values, not handles**: everything here is plain data. Connections,
//!   sockets and timers live in the subsystem crates.
//! - **One source of truth** for the reorg sentinel and for account
//!   identifier normalisation, so the subscriber, the edge reader and the
//!   orchestrator cannot disagree about them.

pub mod entities;
pub mod errors;
pub mod protocol;

pub use entities::*;
pub use errors::*;
pub use protocol::ProtocolVersion;
