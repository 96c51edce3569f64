//! Indexer protocol versions.

use std::fmt;
use std::str::FromStr;

use crate::errors::UnsupportedProtocolVersion;

/// Wire protocol spoken by the indexer feed, which also decides the schema
/// of the ledger-state store.
///
/// - `V1`: the blockchain-indexer, which pushes a bare JSON array of
///   transaction hashes per block.
/// - `V2`: the nethermind plugin, which speaks JSON-RPC `eth_subscribe`
///   notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolVersion {
    V1,
    V2,
}

impl ProtocolVersion {
    /// Numeric form, as used in logs.
    pub fn number(self) -> u8 {
        match self {
            ProtocolVersion::V1 => 1,
            ProtocolVersion::V2 => 2,
        }
    }

    /// Only the v2 feed gets the periodic resync timer.
    pub fn has_periodic_resync(self) -> bool {
        matches!(self, ProtocolVersion::V2)
    }
}

impl FromStr for ProtocolVersion {
    type Err = UnsupportedProtocolVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(ProtocolVersion::V1),
            "v2" => Ok(ProtocolVersion::V2),
            other => Err(UnsupportedProtocolVersion(other.to_string())),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}
