//! Canonical hash preimages.
//!
//! Every digest in a chain is computed over a fixed, order-preserving
//! concatenation of stringified fields with no separators:
//!
//! - payload: `timestamp || data || sender || receiver`
//! - message: `prev_hash || payload_hash`
//! - block:   `prev_hash || timestamp || last_message_hash`
//!
//! Hashes enter a preimage as 64 lowercase hex characters, timestamps as
//! decimal integers. Absent values are written as [`ABSENT`].

use crate::types::{ContentHash, Timestamp};

/// Stand-in for an absent sender, receiver or previous hash.
pub const ABSENT: &str = "None";

/// Preimage of a message's payload hash.
pub fn payload_preimage(
    timestamp: Timestamp,
    data: &[u8],
    sender: Option<&str>,
    receiver: Option<&str>,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 + data.len());
    buf.extend_from_slice(timestamp.to_string().as_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(sender.unwrap_or(ABSENT).as_bytes());
    buf.extend_from_slice(receiver.unwrap_or(ABSENT).as_bytes());
    buf
}

/// Preimage of a message hash.
pub fn message_preimage(prev_hash: Option<&ContentHash>, payload_hash: &ContentHash) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    push_hash(&mut buf, prev_hash);
    push_hash(&mut buf, Some(payload_hash));
    buf
}

/// Preimage of a block hash.
pub fn block_preimage(
    prev_hash: Option<&ContentHash>,
    timestamp: Timestamp,
    last_message_hash: &ContentHash,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(160);
    push_hash(&mut buf, prev_hash);
    buf.extend_from_slice(timestamp.to_string().as_bytes());
    push_hash(&mut buf, Some(last_message_hash));
    buf
}

fn push_hash(buf: &mut Vec<u8>, hash: Option<&ContentHash>) {
    match hash {
        Some(h) => buf.extend_from_slice(h.to_hex().as_bytes()),
        None => buf.extend_from_slice(ABSENT.as_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_preimage_layout() {
        let bytes = payload_preimage(Timestamp::from_millis(42), b"hello", Some("alice"), None);
        assert_eq!(bytes, b"42helloaliceNone");
    }

    #[test]
    fn test_payload_preimage_all_absent() {
        let bytes = payload_preimage(Timestamp::from_millis(0), b"", None, None);
        assert_eq!(bytes, b"0NoneNone");
    }

    #[test]
    fn test_message_preimage_without_prev() {
        let payload = ContentHash::from_bytes([0x11; 32]);
        let bytes = message_preimage(None, &payload);
        let expected = format!("None{}", "11".repeat(32));
        assert_eq!(bytes, expected.as_bytes());
    }

    #[test]
    fn test_block_preimage_layout() {
        let prev = ContentHash::from_bytes([0xaa; 32]);
        let head = ContentHash::from_bytes([0xbb; 32]);
        let bytes = block_preimage(Some(&prev), Timestamp::from_millis(7), &head);
        let expected = format!("{}7{}", "aa".repeat(32), "bb".repeat(32));
        assert_eq!(bytes, expected.as_bytes());
    }
}
