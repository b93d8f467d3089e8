//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical preimages and the SHA-256 digests
//! computed over them. Any change to field order, absent-value spelling or
//! hash formatting shows up here first.

use easychain_core::{ContentHash, Message};

use crate::fixtures::FROZEN;

/// A golden message vector.
#[derive(Debug, Clone)]
pub struct MessageVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Message timestamp (Unix ms).
    pub timestamp: i64,
    /// Payload.
    pub data: &'static str,
    /// Sender label.
    pub sender: Option<&'static str>,
    /// Receiver label.
    pub receiver: Option<&'static str>,
    /// Back-reference (hex).
    pub prev_hash: Option<&'static str>,
    /// Expected payload hash (hex).
    pub expected_payload_hash: &'static str,
    /// Expected message hash (hex).
    pub expected_hash: &'static str,
}

/// Get all golden message vectors.
pub fn all_vectors() -> Vec<MessageVector> {
    vec![
        MessageVector {
            name: "unlabelled first message",
            timestamp: FROZEN,
            data: "This is the first message",
            sender: None,
            receiver: None,
            prev_hash: None,
            expected_payload_hash: "cde14ed8effd21c4ad5ba3e424e49321fd6a411c3fdae9fa5824d7c2c6796512",
            expected_hash: "10663fabccf23774adfab8973e5d1abf387bfbdbeb8a0192f6c1fd0461ee8261",
        },
        MessageVector {
            name: "labelled message linked to the first",
            timestamp: FROZEN,
            data: "Second message",
            sender: Some("Alice"),
            receiver: Some("Bob"),
            prev_hash: Some("10663fabccf23774adfab8973e5d1abf387bfbdbeb8a0192f6c1fd0461ee8261"),
            expected_payload_hash: "c90096310f0570935c909cd8d27e09969b940daf3e2947af3fbc1c4b5b2768af",
            expected_hash: "627c347fce5dd084d3743047f129917c32a6deddd54eb48af9ee26cd9316e846",
        },
        MessageVector {
            name: "epoch timestamp with sender only",
            timestamp: 0,
            data: "hello",
            sender: Some("alice"),
            receiver: None,
            prev_hash: None,
            expected_payload_hash: "d653294acaeda97ccc3726b2dfddd0d7034c515bca62ae943bc477cc13df089f",
            expected_hash: "73175e9667714ed692d856715ce266e933d971c7195aeaf106f966252704034e",
        },
    ]
}

/// Sealed block hashes of [`crate::fixtures::example_chain`], in order.
pub const EXAMPLE_CHAIN_BLOCK_HASHES: [&str; 4] = [
    "fee918fd97cf724604345002c59a4679a2db8e1ca31b635d5cb1736b475c5585",
    "ccf32af5a166b4e8c177e5ed052e0fc90ce54cac5ded399294a0fcdc4f7b3c6b",
    "b58ed6f271ffc6d5512b0a1b773c4e664cb09692c95672c196dcd4f40d525637",
    "ac69d030dbc7f7d6ece14bd32eb9c8269de2f15c9866f156e8a355183f813d28",
];

/// Build the (unsealed) message a vector describes.
pub fn message_from_vector(vector: &MessageVector) -> Message {
    let mut msg = Message::new(vector.data).at(vector.timestamp);
    msg.sender = vector.sender.map(String::from);
    msg.receiver = vector.receiver.map(String::from);
    msg.prev_hash = vector
        .prev_hash
        .and_then(|hex| ContentHash::from_hex(hex).ok());
    msg
}

/// Check every vector against the SHA-256 encoder.
///
/// Returns `(name, matches, actual message hash hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let msg = message_from_vector(v);
            let payload_hex = msg.payload_hash().to_hex();
            let hash_hex = msg.hash().map(|h| h.to_hex()).unwrap_or_default();

            let matches = payload_hex == v.expected_payload_hash && hash_hex == v.expected_hash;
            (v.name.to_string(), matches, hash_hex)
        })
        .collect()
}
