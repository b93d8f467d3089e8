//! Error types for easychain core.
//!
//! One error per level. Each level wraps only the level directly below it
//! and embeds that error's text, so the message of an [`InvalidBlockchain`]
//! carries the whole path down to the tampered field.

use thiserror::Error;

use crate::types::{hash_label, ContentHash};

/// A message no longer matches its sealed snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidMessage {
    #[error("message has not been sealed")]
    Unsealed,

    /// Timestamp, data, sender or receiver changed after sealing.
    #[error("invalid payload hash in message: expected {expected}, got {actual}")]
    PayloadHashMismatch {
        expected: ContentHash,
        actual: ContentHash,
    },

    /// The stored back-reference was altered or forged.
    #[error(
        "invalid message hash in message: expected {}, got {}",
        hash_label(.expected.as_ref()),
        hash_label(.actual.as_ref())
    )]
    HashMismatch {
        expected: Option<ContentHash>,
        actual: Option<ContentHash>,
    },
}

/// A block failed validation.
///
/// `block` is the block's identity at the time of the failure: the short
/// form of its sealed (or live) hash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBlock {
    #[error("invalid block: block has no messages")]
    Empty,

    #[error("invalid block: message #{index} failed validation: {source}. In block: {block}")]
    Message {
        index: usize,
        block: String,
        source: InvalidMessage,
    },

    #[error("invalid block: message #{index} has invalid message link in block: {block}")]
    BrokenLink { index: usize, block: String },

    #[error(
        "invalid block: hash mismatch in block {block}: expected {}, got {}",
        hash_label(.expected.as_ref()),
        hash_label(.actual.as_ref())
    )]
    HashMismatch {
        block: String,
        expected: Option<ContentHash>,
        actual: Option<ContentHash>,
    },
}

impl InvalidBlock {
    /// Index of the offending message, if the failure is message-specific.
    pub fn message_index(&self) -> Option<usize> {
        match self {
            InvalidBlock::Message { index, .. } | InvalidBlock::BrokenLink { index, .. } => {
                Some(*index)
            }
            InvalidBlock::Empty | InvalidBlock::HashMismatch { .. } => None,
        }
    }
}

/// A blockchain failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBlockchain {
    #[error("invalid blockchain at block {index} caused by: {source}")]
    Block { index: usize, source: InvalidBlock },

    #[error(
        "invalid blockchain at block {index}: previous hash {} does not match {}",
        hash_label(.actual.as_ref()),
        hash_label(.expected.as_ref())
    )]
    BrokenLink {
        index: usize,
        expected: Option<ContentHash>,
        actual: Option<ContentHash>,
    },
}

impl InvalidBlockchain {
    /// Index of the first block that failed.
    pub fn block_index(&self) -> usize {
        match self {
            InvalidBlockchain::Block { index, .. } | InvalidBlockchain::BrokenLink { index, .. } => {
                *index
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_text_cascades() {
        let message = InvalidMessage::PayloadHashMismatch {
            expected: ContentHash::from_bytes([1; 32]),
            actual: ContentHash::from_bytes([2; 32]),
        };
        let block = InvalidBlock::Message {
            index: 3,
            block: "abababababababab".into(),
            source: message.clone(),
        };
        let chain = InvalidBlockchain::Block {
            index: 1,
            source: block.clone(),
        };

        let text = chain.to_string();
        assert!(text.starts_with("invalid blockchain at block 1"));
        assert!(text.contains("message #3 failed validation"));
        assert!(text.contains("invalid payload hash"));
        assert!(text.contains("abababababababab"));

        assert_eq!(chain.block_index(), 1);
        assert_eq!(block.message_index(), Some(3));
        assert_eq!(chain.source().map(|e| e.to_string()), Some(block.to_string()));
    }

    #[test]
    fn test_absent_hash_label() {
        let err = InvalidMessage::HashMismatch {
            expected: None,
            actual: Some(ContentHash::from_bytes([0; 32])),
        };
        assert!(err.to_string().contains("expected <none>"));
    }
}
