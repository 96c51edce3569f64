//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Feed**: `BlockUpdateEvent`, the reorg sentinel
//! - **Graph**: `CapacityEdge`, account identifier normalisation
//! - **Progress**: `BlockNumber`, `BlockCursor`

use serde::{Deserialize, Serialize};

// Re-export U256 from primitive-types so every subsystem agrees on the capacity type
pub use primitive_types::U256;

use crate::errors::AddressError;

// =============================================================================
// CLUSTER A: THE FEED
// =============================================================================

/// Block height in the ledger-state store.
pub type BlockNumber = u64;

/// Transaction hash the indexer sends when it rolled back blocks.
pub const REORG_SENTINEL_TX_HASH: &str =
    "0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

/// One "new block" notification from the indexer, normalised across
/// protocol versions.
///
/// An empty hash list means the block carried nothing relevant. The list is
/// kept in arrival order; protocol v2 decoding deduplicates before building
/// the event, protocol v1 passes the indexer's list through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockUpdateEvent {
    transaction_hashes: Vec<String>,
}

impl BlockUpdateEvent {
    pub fn new(transaction_hashes: Vec<String>) -> Self {
        Self { transaction_hashes }
    }

    pub fn transaction_hashes(&self) -> &[String] {
        &self.transaction_hashes
    }

    pub fn len(&self) -> usize {
        self.transaction_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_hashes.is_empty()
    }

    /// True if the sentinel hash appears anywhere in the event, regardless of
    /// what else was delivered alongside it.
    pub fn is_reorg(&self) -> bool {
        self.transaction_hashes
            .iter()
            .any(|hash| hash.eq_ignore_ascii_case(REORG_SENTINEL_TX_HASH))
    }
}

impl FromIterator<String> for BlockUpdateEvent {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// =============================================================================
// CLUSTER B: THE GRAPH
// =============================================================================

/// A directed capacity edge of the trust graph: `sender` can move up to
/// `capacity` units of `token_owner`'s token to `receiver`.
///
/// Identifiers are hex strings without the `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityEdge {
    pub sender: String,
    pub receiver: String,
    pub token_owner: String,
    pub capacity: U256,
}

/// Strip the two-character `0x` prefix from an account identifier.
///
/// The remainder is returned untouched; no case folding and no check that
/// the prefix actually was `0x`.
pub fn strip_hex_prefix(identifier: &str) -> Result<&str, AddressError> {
    let mut chars = identifier.chars();
    match (chars.next(), chars.next()) {
        (Some(_), Some(_)) => Ok(chars.as_str()),
        _ => Err(AddressError::TooShort(identifier.to_string())),
    }
}

// =============================================================================
// CLUSTER C: PROGRESS
// =============================================================================

/// How far the pathfinder has been brought up to date.
///
/// `current_block` is the newest block seen in the ledger-state store,
/// `last_full_update` the block the pathfinder was last successfully
/// reloaded at. Neither is guarded against regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockCursor {
    pub current_block: BlockNumber,
    pub last_full_update: BlockNumber,
}

impl BlockCursor {
    /// Blocks observed but not yet applied to the pathfinder.
    pub fn lag(&self) -> u64 {
        self.current_block.saturating_sub(self.last_full_update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(hashes: &[&str]) -> BlockUpdateEvent {
        hashes.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_empty_event() {
        let e = BlockUpdateEvent::default();
        assert!(e.is_empty());
        assert!(!e.is_reorg());
    }

    #[test]
    fn test_reorg_detected_among_ordinary_hashes() {
        let e = event(&["0x01", REORG_SENTINEL_TX_HASH, "0x02"]);
        assert!(e.is_reorg());
        assert_eq!(e.len(), 3);
    }

    #[test]
    fn test_reorg_sentinel_case_insensitive() {
        let upper = format!("0x{}", REORG_SENTINEL_TX_HASH[2..].to_uppercase());
        assert!(event(&[&upper]).is_reorg());
    }

    #[test]
    fn test_ordinary_event_is_not_reorg() {
        assert!(!event(&["0xabc", "0xdef"]).is_reorg());
    }

    #[test]
    fn test_v1_order_and_duplicates_kept() {
        let e = event(&["0x2", "0x1", "0x2"]);
        assert_eq!(e.transaction_hashes(), &["0x2", "0x1", "0x2"]);
    }

    #[test]
    fn test_strip_hex_prefix_keeps_case() {
        assert_eq!(strip_hex_prefix("0xABCDEF0123"), Ok("ABCDEF0123"));
        assert_eq!(strip_hex_prefix("0xabcdef"), Ok("abcdef"));
        assert_eq!(strip_hex_prefix("0x"), Ok(""));
    }

    #[test]
    fn test_strip_hex_prefix_too_short() {
        assert!(strip_hex_prefix("0").is_err());
        assert!(strip_hex_prefix("").is_err());
    }

    #[test]
    fn test_cursor_lag() {
        let cursor = BlockCursor {
            current_block: 120,
            last_full_update: 100,
        };
        assert_eq!(cursor.lag(), 20);
        assert_eq!(BlockCursor::default().lag(), 0);
    }

    #[test]
    fn test_capacity_edge_serde() {
        let edge = CapacityEdge {
            sender: "aa".into(),
            receiver: "bb".into(),
            token_owner: "cc".into(),
            capacity: U256::from(42u64),
        };
        let json = serde_json::to_string(&edge).unwrap();
        let back: CapacityEdge = serde_json::from_str(&json).unwrap();
        assert_eq!(back, edge);
    }
}
