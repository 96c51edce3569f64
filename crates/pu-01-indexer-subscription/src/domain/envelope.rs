//! Message decoding for both indexer protocol versions.
//!
//! - v1 (blockchain-indexer): the whole message is a JSON array of
//!   transaction hashes.
//! - v2 (nethermind plugin): a JSON-RPC envelope; notifications carry the
//!   block's circles events under `params.result`, each optionally bearing
//!   `values.transactionHash`.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use shared_types::{BlockUpdateEvent, ProtocolVersion};

use crate::error::SubscriptionError;

/// A decoded v2 message.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// The envelope carried a non-null `error` member.
    Error(Value),
    /// A block notification, hashes already deduplicated.
    Notification(BlockUpdateEvent),
    /// Anything else: subscription acknowledgements, heartbeats, `null`.
    Unrecognized,
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    params: Option<Value>,
}

/// `values.transactionHash` of one circles event record, if it is a string.
fn record_hash(record: &Value) -> Option<&str> {
    record
        .get("values")
        .and_then(|values| values.get("transactionHash"))
        .and_then(Value::as_str)
}

/// Decode a v1 message. The hash list is passed through verbatim.
pub fn decode_v1(text: &str) -> Result<BlockUpdateEvent, SubscriptionError> {
    serde_json::from_str::<Vec<String>>(text)
        .map(BlockUpdateEvent::new)
        .map_err(|e| SubscriptionError::malformed(text, e))
}

/// Decode a v2 message into an [`Envelope`].
///
/// Only text that is not JSON at all, or JSON that is neither an object nor
/// `null`, is an error here. A `params.result` that is not a list is
/// `Unrecognized`; a malformed record inside it is skipped on its own.
pub fn decode_v2(text: &str) -> Result<Envelope, SubscriptionError> {
    let value: Value = serde_json::from_str(text).map_err(|e| SubscriptionError::malformed(text, e))?;
    if value.is_null() {
        return Ok(Envelope::Unrecognized);
    }
    if !value.is_object() {
        return Err(SubscriptionError::malformed(text, "expected a JSON-RPC envelope object"));
    }

    let raw: RawEnvelope =
        serde_json::from_value(value).map_err(|e| SubscriptionError::malformed(text, e))?;

    if let Some(error) = raw.error.filter(|e| !e.is_null()) {
        return Ok(Envelope::Error(error));
    }

    let Some(records) = raw
        .params
        .as_ref()
        .and_then(|params| params.get("result"))
        .and_then(Value::as_array)
    else {
        return Ok(Envelope::Unrecognized);
    };

    let mut seen = HashSet::new();
    let hashes = records
        .iter()
        .filter_map(record_hash)
        .filter(|hash| seen.insert(*hash))
        .map(str::to_owned)
        .collect();

    Ok(Envelope::Notification(hashes))
}

/// Decode one complete message for the given protocol version.
///
/// `Ok(None)` means the message is skipped; an error envelope becomes
/// [`SubscriptionError::Indexer`].
pub fn decode_message(
    version: ProtocolVersion,
    text: &str,
) -> Result<Option<BlockUpdateEvent>, SubscriptionError> {
    match version {
        ProtocolVersion::V1 => decode_v1(text).map(Some),
        ProtocolVersion::V2 => match decode_v2(text)? {
            Envelope::Notification(event) => Ok(Some(event)),
            Envelope::Unrecognized => Ok(None),
            Envelope::Error(error) => Err(SubscriptionError::Indexer(error.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use shared_types::REORG_SENTINEL_TX_HASH;

    fn notification(hashes: &[&str]) -> String {
        let records: Vec<Value> = hashes
            .iter()
            .map(|h| json!({ "event": "CrcV2_Transfer", "values": { "transactionHash": h } }))
            .collect();
        json!({
            "jsonrpc": "2.0",
            "method": "eth_subscription",
            "params": { "subscription": "0x1", "result": records }
        })
        .to_string()
    }

    #[test]
    fn test_v1_list_passes_through() {
        let event = decode_v1(r#"["0xb", "0xa", "0xb"]"#).unwrap();
        assert_eq!(event.transaction_hashes(), &["0xb", "0xa", "0xb"]);
    }

    #[test]
    fn test_v1_empty_list_is_empty_event() {
        assert!(decode_v1("[]").unwrap().is_empty());
    }

    #[test]
    fn test_v1_non_list_is_fatal() {
        assert!(matches!(
            decode_v1(r#"{"hashes": []}"#),
            Err(SubscriptionError::Malformed { .. })
        ));
        assert!(decode_v1("null").is_err());
        assert!(decode_v1("not json").is_err());
    }

    #[test]
    fn test_v2_notification_deduplicates() {
        let envelope = decode_v2(&notification(&["0x1", "0x2", "0x1", "0x1"])).unwrap();
        let Envelope::Notification(event) = envelope else {
            panic!("expected notification, got {envelope:?}");
        };
        assert_eq!(event.transaction_hashes(), &["0x1", "0x2"]);
    }

    #[test]
    fn test_v2_records_without_hash_are_skipped() {
        let text = json!({
            "method": "eth_subscription",
            "params": { "result": [
                { "values": { "transactionHash": "0xaa" } },
                { "values": {} },
                { "event": "CrcV2_Trust" }
            ]}
        })
        .to_string();
        assert_eq!(
            decode_v2(&text).unwrap(),
            Envelope::Notification(BlockUpdateEvent::new(vec!["0xaa".into()]))
        );
    }

    #[test]
    fn test_v2_malformed_record_keeps_the_rest() {
        let text = json!({
            "method": "eth_subscription",
            "params": { "result": [
                { "values": { "transactionHash": "0xaa" } },
                { "values": { "transactionHash": 123 } },
                "CrcV2_Trust",
                { "values": ["0xcc"] },
                { "values": { "transactionHash": "0xbb" } }
            ]}
        })
        .to_string();
        assert_eq!(
            decode_v2(&text).unwrap(),
            Envelope::Notification(BlockUpdateEvent::new(vec!["0xaa".into(), "0xbb".into()]))
        );
    }

    #[test]
    fn test_v2_error_envelope() {
        let text = r#"{"jsonrpc":"2.0","error":{"code":-32700,"message":"Incorrect message"},"id":null}"#;
        assert!(matches!(decode_v2(text).unwrap(), Envelope::Error(_)));
        assert!(matches!(
            decode_message(ProtocolVersion::V2, text),
            Err(SubscriptionError::Indexer(_))
        ));
    }

    #[test]
    fn test_v2_null_error_is_not_an_error() {
        let text = r#"{"jsonrpc":"2.0","error":null,"params":{"result":[]}}"#;
        assert_eq!(
            decode_v2(text).unwrap(),
            Envelope::Notification(BlockUpdateEvent::default())
        );
    }

    #[test]
    fn test_v2_subscription_ack_is_unrecognized() {
        let text = r#"{"jsonrpc":"2.0","result":"0x9cef478923ff08bf67fde6c64013158d","id":1}"#;
        assert_eq!(decode_v2(text).unwrap(), Envelope::Unrecognized);
        assert_eq!(decode_message(ProtocolVersion::V2, text).unwrap(), None);
    }

    #[test]
    fn test_v2_shape_mismatch_is_unrecognized() {
        assert_eq!(decode_v2("null").unwrap(), Envelope::Unrecognized);
        assert_eq!(
            decode_v2(r#"{"params":{"result":"nope"}}"#).unwrap(),
            Envelope::Unrecognized
        );
        assert_eq!(decode_v2(r#"{"params":[1,2]}"#).unwrap(), Envelope::Unrecognized);
    }

    #[test]
    fn test_v2_invalid_json_is_fatal() {
        assert!(decode_v2("{oops").is_err());
        assert!(decode_v2("[1,2,3]").is_err());
    }

    #[test]
    fn test_sentinel_passes_through_decoding() {
        let event = decode_message(
            ProtocolVersion::V2,
            &notification(&[REORG_SENTINEL_TX_HASH]),
        )
        .unwrap()
        .unwrap();
        assert!(event.is_reorg());
    }

    proptest! {
        #[test]
        fn prop_v1_event_equals_list(hashes in prop::collection::vec("0x[0-9a-f]{1,64}", 0..32)) {
            let text = serde_json::to_string(&hashes).unwrap();
            let event = decode_v1(&text).unwrap();
            prop_assert_eq!(event.transaction_hashes(), hashes.as_slice());
        }

        #[test]
        fn prop_v2_event_has_distinct_hashes(
            distinct in prop::collection::hash_set("0x[0-9a-f]{8}", 1..16),
            repeats in prop::collection::vec(1usize..4, 16),
        ) {
            let distinct: Vec<String> = distinct.into_iter().collect();
            let mut delivered = Vec::new();
            for (hash, n) in distinct.iter().zip(repeats.iter()) {
                for _ in 0..*n {
                    delivered.push(hash.as_str());
                }
            }
            let Envelope::Notification(event) = decode_v2(&notification(&delivered)).unwrap() else {
                panic!("expected notification");
            };
            let got: HashSet<&String> = event.transaction_hashes().iter().collect();
            let want: HashSet<&String> = distinct.iter().collect();
            prop_assert_eq!(event.len(), distinct.len());
            prop_assert_eq!(got, want);
        }
    }
}
