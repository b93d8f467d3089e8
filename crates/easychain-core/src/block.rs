//! Block: an ordered, append-only sequence of chained messages.
//!
//! Each message appended to a block is linked to the message before it and
//! sealed. The block hash folds in only the last message hash, which in turn
//! transitively commits to every earlier message in the block.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::block_preimage;
use crate::encoder::{Encoder, HashAlgorithm};
use crate::error::{InvalidBlock, InvalidMessage};
use crate::linked::HashLinked;
use crate::message::Message;
use crate::types::{hash_label, ContentHash, Timestamp};

/// Block hash captured at seal time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSeal {
    pub hash: Option<ContentHash>,
}

/// An ordered batch of messages.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    messages: Vec<Message>,

    /// Set at construction.
    pub timestamp: Timestamp,

    /// Hash of the previous block in the chain, captured by [`Block::link`].
    pub prev_hash: Option<ContentHash>,

    seal: Option<BlockSeal>,
}

impl Block {
    /// Create an empty block stamped with the current time.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            timestamp: Timestamp::now(),
            prev_hash: None,
            seal: None,
        }
    }

    /// Create a block and append `messages` in order.
    pub fn from_messages(
        messages: impl IntoIterator<Item = Message>,
    ) -> Result<Self, InvalidMessage> {
        Self::from_messages_with(messages, &HashAlgorithm::default())
    }

    /// [`Block::from_messages`] with an explicit encoder.
    pub fn from_messages_with(
        messages: impl IntoIterator<Item = Message>,
        encoder: &dyn Encoder,
    ) -> Result<Self, InvalidMessage> {
        let mut block = Self::new();
        for msg in messages {
            block.add_message_with(msg, encoder)?;
        }
        Ok(block)
    }

    /// Override the block timestamp.
    pub fn at(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Append a message, linking it to the current tail and sealing it.
    pub fn add_message(&mut self, msg: Message) -> Result<(), InvalidMessage> {
        self.add_message_with(msg, &HashAlgorithm::default())
    }

    /// [`Block::add_message`] with an explicit encoder.
    ///
    /// A message that arrives already sealed must still match its snapshot;
    /// it is then re-linked and re-sealed in its new position. The first
    /// message of a block never keeps a back-reference.
    pub fn add_message_with(
        &mut self,
        mut msg: Message,
        encoder: &dyn Encoder,
    ) -> Result<(), InvalidMessage> {
        if msg.is_sealed() {
            msg.validate_with(encoder)?;
        }
        match self.messages.last() {
            Some(tail) => {
                msg.link_to_with(tail, encoder);
            }
            None => msg.prev_hash = None,
        }
        msg.seal_with(encoder);
        self.messages.push(msg);
        Ok(())
    }

    /// Link this block after `prev`.
    pub fn link(&mut self, prev: &Block) {
        self.link_with(prev, &HashAlgorithm::default());
    }

    /// [`Block::link`] with an explicit encoder.
    pub fn link_with(&mut self, prev: &Block, encoder: &dyn Encoder) {
        self.prev_hash = prev.hash_with(encoder);
    }

    /// Digest over the previous block hash, the timestamp and the last
    /// message hash.
    ///
    /// `None` when the block is empty or its last message has no hash. Such
    /// a block's timestamp is covered by no digest, and the next block links
    /// to `None`.
    pub fn hash(&self) -> Option<ContentHash> {
        self.hash_with(&HashAlgorithm::default())
    }

    /// [`Block::hash`] with an explicit encoder.
    pub fn hash_with(&self, encoder: &dyn Encoder) -> Option<ContentHash> {
        let head = self.messages.last()?.hash_with(encoder)?;
        Some(encoder.encode(&block_preimage(
            self.prev_hash.as_ref(),
            self.timestamp,
            &head,
        )))
    }

    /// Capture the current block hash as the sealed snapshot.
    pub fn seal(&mut self) {
        self.seal_with(&HashAlgorithm::default());
    }

    /// [`Block::seal`] with an explicit encoder.
    pub fn seal_with(&mut self, encoder: &dyn Encoder) {
        self.seal = Some(BlockSeal {
            hash: self.hash_with(encoder),
        });
    }

    /// Whether a snapshot has been captured.
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    /// The sealed block hash, if sealed and hashable.
    pub fn sealed_hash(&self) -> Option<ContentHash> {
        self.seal.and_then(|s| s.hash)
    }

    /// The messages, in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Mutable access to a stored message.
    ///
    /// Changes are not prevented, only made detectable by [`Block::validate`].
    pub fn message_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }

    /// The last message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the block has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Short identity used in error context.
    pub fn label(&self, encoder: &dyn Encoder) -> String {
        match self.sealed_hash().or_else(|| self.hash_with(encoder)) {
            Some(hash) => hash.short(),
            None => "<unhashed>".to_string(),
        }
    }

    /// Validate every message, every intra-block link and the sealed hash.
    pub fn validate(&self) -> Result<(), InvalidBlock> {
        self.validate_with(&HashAlgorithm::default())
    }

    /// [`Block::validate`] with an explicit encoder.
    ///
    /// Fail-fast: the first failing message or link ends the check.
    pub fn validate_with(&self, encoder: &dyn Encoder) -> Result<(), InvalidBlock> {
        for (index, msg) in self.messages.iter().enumerate() {
            msg.validate_with(encoder)
                .map_err(|source| InvalidBlock::Message {
                    index,
                    block: self.label(encoder),
                    source,
                })?;

            if index > 0 && !msg.links_to(&self.messages[index - 1], encoder) {
                return Err(InvalidBlock::BrokenLink {
                    index,
                    block: self.label(encoder),
                });
            }
        }

        if let Some(seal) = self.seal {
            let actual = self.hash_with(encoder);
            if actual != seal.hash {
                return Err(InvalidBlock::HashMismatch {
                    block: self.label(encoder),
                    expected: seal.hash,
                    actual,
                });
            }
        }

        Ok(())
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl HashLinked for Block {
    fn content_hash(&self, encoder: &dyn Encoder) -> Option<ContentHash> {
        self.hash_with(encoder)
    }

    fn previous_hash(&self) -> Option<ContentHash> {
        self.prev_hash
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block<hash: {}, prev_hash: {}, messages: {}, time: {}>",
            hash_label(self.hash().as_ref()),
            hash_label(self.prev_hash.as_ref()),
            self.messages.len(),
            self.timestamp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    const FROZEN: i64 = -445_219_200_000;

    fn msgs(texts: &[&str]) -> Vec<Message> {
        texts.iter().map(|t| Message::new(t.to_string()).at(FROZEN)).collect()
    }

    fn block_of(texts: &[&str]) -> Block {
        Block::from_messages(msgs(texts)).unwrap().at(FROZEN)
    }

    fn expected_block_hash(block: &Block) -> ContentHash {
        let prev = block
            .prev_hash
            .map(|h| h.to_hex())
            .unwrap_or_else(|| "None".to_string());
        let head = block.last().unwrap().hash().unwrap();
        HashAlgorithm::Sha256.encode_str(&format!("{}{}{}", prev, block.timestamp, head))
    }

    #[test]
    fn test_empty_block_has_no_hash() {
        let block = Block::new();
        assert!(block.is_empty());
        assert_eq!(block.hash(), None);
    }

    #[test]
    fn test_constructor_appends_and_links_messages() {
        let block = block_of(&["a", "b", "c"]);
        assert_eq!(block.len(), 3);

        let m = block.messages();
        assert_eq!(m[0].prev_hash, None);
        assert_eq!(m[1].prev_hash, m[0].hash());
        assert_eq!(m[2].prev_hash, m[1].hash());
        assert_eq!(m[0].data_str(), Some("a"));
        assert_eq!(m[2].data_str(), Some("c"));
        assert!(m.iter().all(Message::is_sealed));

        assert_eq!(block.hash(), Some(expected_block_hash(&block)));
    }

    #[test]
    fn test_add_message_links_to_tail() {
        let mut block = Block::new();
        block.add_message(Message::new("first")).unwrap();
        let tail_hash = block.last().unwrap().hash();

        block.add_message(Message::new("second")).unwrap();
        assert_eq!(block.messages()[1].prev_hash, tail_hash);
    }

    #[test]
    fn test_first_message_drops_outside_link() {
        let outside = Message::new("a").at(FROZEN);
        let linked = Message::new("b").at(FROZEN).link(&outside);
        assert!(linked.prev_hash.is_some());

        let block = Block::from_messages([linked]).unwrap();
        assert_eq!(block.messages()[0].prev_hash, None);
        assert_eq!(
            block.messages()[0].hash(),
            Message::new("b").at(FROZEN).hash()
        );
        assert!(block.validate().is_ok());
    }

    #[test]
    fn test_add_message_rejects_tampered_sealed_message() {
        let mut msg = Message::new("original");
        msg.seal();
        msg.data = Bytes::from_static(b"forged");

        let mut block = Block::new();
        let result = block.add_message(msg);
        assert!(matches!(result, Err(InvalidMessage::PayloadHashMismatch { .. })));
        assert!(block.is_empty());
    }

    #[test]
    fn test_linked_block_hash() {
        let first = block_of(&["first", "second", "third"]);
        let mut second = block_of(&["fourth", "fifth"]);
        second.link(&first);

        assert_eq!(second.prev_hash, first.hash());
        assert_eq!(second.hash(), Some(expected_block_hash(&second)));
    }

    #[test]
    fn test_head_hash_uses_stored_links() {
        let mut block = block_of(&["a", "b", "c"]);
        let before = block.hash();

        block.message_mut(0).unwrap().data = Bytes::from_static(b"changed");
        // The head hash is unchanged because links are stored hashes,
        // but validation catches the edit.
        assert_eq!(block.hash(), before);
        assert!(block.validate().is_err());
    }

    #[test]
    fn test_valid_block() {
        let mut block = block_of(&["first", "second", "third", "fourth", "fifth"]);
        assert!(block.validate().is_ok());
        block.seal();
        assert!(block.validate().is_ok());
    }

    #[test]
    fn test_message_tampering_invalidates_block() {
        let mut block = block_of(&["first", "second", "third", "fourth", "fifth"]);
        block.message_mut(1).unwrap().data = Bytes::from_static(b"changed");

        match block.validate() {
            Err(InvalidBlock::Message { index, source, .. }) => {
                assert_eq!(index, 1);
                assert!(matches!(source, InvalidMessage::PayloadHashMismatch { .. }));
            }
            other => panic!("expected message failure, got {:?}", other),
        }
    }

    #[test]
    fn test_resealed_tampering_breaks_link() {
        let mut block = block_of(&["first", "second", "third"]);
        let msg = block.message_mut(0).unwrap();
        msg.data = Bytes::from_static(b"rewritten");
        msg.seal();

        let err = block.validate().unwrap_err();
        assert!(matches!(err, InvalidBlock::BrokenLink { index: 1, .. }));
        assert!(err.to_string().contains("message #1 has invalid message link"));
    }

    #[test]
    fn test_every_adjacent_pair_is_checked() {
        // A forged link on message #1 must be reported, even though the
        // message itself was resealed to look consistent.
        let mut block = block_of(&["a", "b"]);
        let msg = block.message_mut(1).unwrap();
        msg.prev_hash = Some(ContentHash::from_bytes([0x01; 32]));
        msg.seal();

        assert!(matches!(block.validate(), Err(InvalidBlock::BrokenLink { index: 1, .. })));
    }

    #[test]
    fn test_sealed_block_detects_timestamp_change() {
        let mut block = block_of(&["a"]);
        block.seal();
        block.timestamp = Timestamp::from_millis(0);

        assert!(matches!(block.validate(), Err(InvalidBlock::HashMismatch { .. })));
    }

    #[test]
    fn test_error_names_block_identity() {
        let mut block = block_of(&["a", "b"]);
        block.seal();
        let label = block.sealed_hash().unwrap().short();

        block.message_mut(0).unwrap().sender = Some("mallory".into());
        let err = block.validate().unwrap_err();
        assert!(err.to_string().contains(&label));
    }

    #[test]
    fn test_debug_format() {
        let block = block_of(&["a"]);
        let debug = format!("{:?}", block);
        assert!(debug.starts_with("Block<hash: "));
        assert!(debug.contains("prev_hash: <none>, messages: 1"));
    }
}
