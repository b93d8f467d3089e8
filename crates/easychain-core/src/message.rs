//! Message: the smallest chained unit.
//!
//! A message carries an opaque payload, optional sender/receiver labels, a
//! creation timestamp, and the hash of the message it was linked after.
//! Its payload hash and message hash are always recomputed from the current
//! fields. Sealing records a separate frozen snapshot of both, which is what
//! [`Message::validate`] compares against.
//!
//! Fields are public on purpose: mutation is how tampering is modeled, and
//! validation is how it is detected.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::canonical::{message_preimage, payload_preimage};
use crate::encoder::{Encoder, HashAlgorithm};
use crate::error::InvalidMessage;
use crate::linked::HashLinked;
use crate::types::{hash_label, ContentHash, Timestamp};

/// Hashes captured at seal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSeal {
    pub payload_hash: ContentHash,
    /// `None` when the message had no data at seal time.
    pub hash: Option<ContentHash>,
}

/// A single chained record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque payload.
    pub data: Bytes,

    /// Unauthenticated sender label.
    pub sender: Option<String>,

    /// Unauthenticated receiver label.
    pub receiver: Option<String>,

    /// Creation instant, fixed at construction.
    pub timestamp: Timestamp,

    /// Hash of the previous message in the block, captured by [`Message::link`].
    pub prev_hash: Option<ContentHash>,

    seal: Option<MessageSeal>,
}

impl Message {
    /// Create an unlinked, unsealed message stamped with the current time.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            sender: None,
            receiver: None,
            timestamp: Timestamp::now(),
            prev_hash: None,
            seal: None,
        }
    }

    /// Set the sender label.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Set the receiver label.
    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Override the creation timestamp.
    pub fn at(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The payload as UTF-8, if it is valid UTF-8.
    pub fn data_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Link this message after `prev`. Fluent.
    pub fn link(mut self, prev: &Message) -> Self {
        self.link_to(prev);
        self
    }

    /// Link this message after `prev` in place.
    pub fn link_to(&mut self, prev: &Message) -> &mut Self {
        self.link_to_with(prev, &HashAlgorithm::default())
    }

    /// Link this message after `prev`, hashing with `encoder`.
    pub fn link_to_with(&mut self, prev: &Message, encoder: &dyn Encoder) -> &mut Self {
        self.prev_hash = prev.hash_with(encoder);
        self
    }

    /// Digest over timestamp, data, sender and receiver.
    pub fn payload_hash(&self) -> ContentHash {
        self.payload_hash_with(&HashAlgorithm::default())
    }

    /// [`Message::payload_hash`] with an explicit encoder.
    pub fn payload_hash_with(&self, encoder: &dyn Encoder) -> ContentHash {
        encoder.encode(&payload_preimage(
            self.timestamp,
            &self.data,
            self.sender.as_deref(),
            self.receiver.as_deref(),
        ))
    }

    /// Digest over the previous hash and the payload hash.
    ///
    /// `None` when the message has no data.
    pub fn hash(&self) -> Option<ContentHash> {
        self.hash_with(&HashAlgorithm::default())
    }

    /// [`Message::hash`] with an explicit encoder.
    pub fn hash_with(&self, encoder: &dyn Encoder) -> Option<ContentHash> {
        if self.data.is_empty() {
            return None;
        }
        let payload_hash = self.payload_hash_with(encoder);
        Some(encoder.encode(&message_preimage(self.prev_hash.as_ref(), &payload_hash)))
    }

    /// Capture the current hashes as the sealed snapshot.
    pub fn seal(&mut self) -> &mut Self {
        self.seal_with(&HashAlgorithm::default())
    }

    /// [`Message::seal`] with an explicit encoder.
    pub fn seal_with(&mut self, encoder: &dyn Encoder) -> &mut Self {
        self.seal = Some(MessageSeal {
            payload_hash: self.payload_hash_with(encoder),
            hash: self.hash_with(encoder),
        });
        self
    }

    /// The sealed snapshot, if any.
    pub fn sealed(&self) -> Option<&MessageSeal> {
        self.seal.as_ref()
    }

    /// Whether a snapshot has been captured.
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    /// Check the live hashes against the sealed snapshot.
    pub fn validate(&self) -> Result<(), InvalidMessage> {
        self.validate_with(&HashAlgorithm::default())
    }

    /// [`Message::validate`] with an explicit encoder.
    ///
    /// The payload hash is checked before the message hash, so content
    /// tampering is reported as such even though it also changes the
    /// message hash.
    pub fn validate_with(&self, encoder: &dyn Encoder) -> Result<(), InvalidMessage> {
        let seal = self.seal.as_ref().ok_or(InvalidMessage::Unsealed)?;

        let payload_hash = self.payload_hash_with(encoder);
        if payload_hash != seal.payload_hash {
            return Err(InvalidMessage::PayloadHashMismatch {
                expected: seal.payload_hash,
                actual: payload_hash,
            });
        }

        let hash = self.hash_with(encoder);
        if hash != seal.hash {
            return Err(InvalidMessage::HashMismatch {
                expected: seal.hash,
                actual: hash,
            });
        }

        Ok(())
    }
}

impl HashLinked for Message {
    fn content_hash(&self, encoder: &dyn Encoder) -> Option<ContentHash> {
        self.hash_with(encoder)
    }

    fn previous_hash(&self) -> Option<ContentHash> {
        self.prev_hash
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = String::from_utf8_lossy(&self.data);
        let preview: String = data.chars().take(25).collect();
        write!(
            f,
            "Message<hash: {}, prev_hash: {}, sender: {}, receiver: {}, data: {}>",
            hash_label(self.hash().as_ref()),
            hash_label(self.prev_hash.as_ref()),
            self.sender.as_deref().unwrap_or("None"),
            self.receiver.as_deref().unwrap_or("None"),
            preview
        )
    }
}
