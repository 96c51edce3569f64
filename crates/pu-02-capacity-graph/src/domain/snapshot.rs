//! Binary edge-list snapshot layout read by the pathfinder.
//!
//! ```text
//! u32 BE    address count
//! [u8; 20]  addresses, in first-seen order
//! u32 BE    edge count
//! per edge:
//!   u32 BE  sender index
//!   u32 BE  receiver index
//!   u32 BE  token owner index
//!   u8      capacity byte length n
//!   [u8; n] capacity, big-endian, no leading zeros
//! ```

use std::collections::HashMap;

use shared_types::{CapacityEdge, U256};

use crate::error::CapacityGraphError;

const ADDRESS_BYTES: usize = 20;

/// An encoded snapshot and what went into it.
#[derive(Debug, Clone)]
pub struct EncodedSnapshot {
    pub bytes: Vec<u8>,
    pub address_count: usize,
    pub edge_count: usize,
}

#[derive(Default)]
struct AddressIndex<'a> {
    positions: HashMap<&'a str, u32>,
    order: Vec<&'a str>,
}

impl<'a> AddressIndex<'a> {
    fn index_of(&mut self, address: &'a str) -> Result<u32, CapacityGraphError> {
        if let Some(position) = self.positions.get(address) {
            return Ok(*position);
        }
        let position = u32::try_from(self.order.len())
            .map_err(|_| CapacityGraphError::Encoding("too many addresses".to_string()))?;
        self.positions.insert(address, position);
        self.order.push(address);
        Ok(position)
    }
}

fn decode_address(address: &str) -> Result<[u8; ADDRESS_BYTES], CapacityGraphError> {
    let bytes = hex::decode(address)
        .map_err(|e| CapacityGraphError::Encoding(format!("address '{address}': {e}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        CapacityGraphError::Encoding(format!(
            "address '{address}' is {} bytes, expected {ADDRESS_BYTES}",
            bytes.len()
        ))
    })
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn push_capacity(out: &mut Vec<u8>, capacity: &U256) {
    let mut buf = [0u8; 32];
    capacity.to_big_endian(&mut buf);
    let start = buf.iter().position(|b| *b != 0).unwrap_or(buf.len());
    let significant = &buf[start..];
    // At most 32 bytes, always fits
    out.push(significant.len() as u8);
    out.extend_from_slice(significant);
}

/// Encode `edges` into the snapshot layout.
pub fn encode_edges(edges: &[CapacityEdge]) -> Result<EncodedSnapshot, CapacityGraphError> {
    let mut index = AddressIndex::default();
    let mut triples = Vec::with_capacity(edges.len());
    for edge in edges {
        triples.push((
            index.index_of(&edge.sender)?,
            index.index_of(&edge.receiver)?,
            index.index_of(&edge.token_owner)?,
        ));
    }

    let edge_count = u32::try_from(edges.len())
        .map_err(|_| CapacityGraphError::Encoding("too many edges".to_string()))?;

    let mut bytes = Vec::with_capacity(
        8 + index.order.len() * ADDRESS_BYTES + edges.len() * (12 + 1 + 32),
    );

    push_u32(&mut bytes, index.order.len() as u32);
    for address in &index.order {
        bytes.extend_from_slice(&decode_address(address)?);
    }

    push_u32(&mut bytes, edge_count);
    for (edge, (sender, receiver, token_owner)) in edges.iter().zip(triples) {
        push_u32(&mut bytes, sender);
        push_u32(&mut bytes, receiver);
        push_u32(&mut bytes, token_owner);
        push_capacity(&mut bytes, &edge.capacity);
    }

    Ok(EncodedSnapshot {
        bytes,
        address_count: index.order.len(),
        edge_count: edges.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> String {
        hex::encode([byte; ADDRESS_BYTES])
    }

    fn edge(sender: u8, receiver: u8, token_owner: u8, capacity: u64) -> CapacityEdge {
        CapacityEdge {
            sender: address(sender),
            receiver: address(receiver),
            token_owner: address(token_owner),
            capacity: U256::from(capacity),
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = encode_edges(&[]).unwrap();
        assert_eq!(snapshot.bytes, vec![0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(snapshot.edge_count, 0);
    }

    #[test]
    fn test_layout_of_single_edge() {
        let snapshot = encode_edges(&[edge(1, 2, 1, 0x0102)]).unwrap();
        let b = &snapshot.bytes;

        assert_eq!(&b[0..4], &[0, 0, 0, 2]);
        assert_eq!(&b[4..24], &[1u8; 20]);
        assert_eq!(&b[24..44], &[2u8; 20]);
        assert_eq!(&b[44..48], &[0, 0, 0, 1]);
        // sender 0, receiver 1, token owner 0
        assert_eq!(&b[48..60], &[0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(&b[60..], &[2, 0x01, 0x02]);
        assert_eq!(snapshot.address_count, 2);
    }

    #[test]
    fn test_addresses_are_shared_across_edges() {
        let snapshot = encode_edges(&[edge(1, 2, 3, 5), edge(3, 1, 2, 6)]).unwrap();
        assert_eq!(snapshot.address_count, 3);
        assert_eq!(snapshot.edge_count, 2);
    }

    #[test]
    fn test_zero_capacity_has_empty_length() {
        let snapshot = encode_edges(&[edge(1, 2, 1, 0)]).unwrap();
        assert_eq!(*snapshot.bytes.last().unwrap(), 0);
    }

    #[test]
    fn test_max_capacity_uses_32_bytes() {
        let mut e = edge(1, 2, 1, 0);
        e.capacity = U256::MAX;
        let snapshot = encode_edges(&[e]).unwrap();
        let tail = &snapshot.bytes[snapshot.bytes.len() - 33..];
        assert_eq!(tail[0], 32);
        assert!(tail[1..].iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let mut e = edge(1, 2, 1, 1);
        e.sender = "abcd".to_string();
        assert!(matches!(
            encode_edges(&[e]),
            Err(CapacityGraphError::Encoding(_))
        ));
    }
}
