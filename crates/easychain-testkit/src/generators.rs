//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use easychain_core::{Block, Blockchain, ContentHash, Message, Timestamp};

/// Generate a random ContentHash.
pub fn content_hash() -> impl Strategy<Value = ContentHash> {
    any::<[u8; 32]>().prop_map(ContentHash::from_bytes)
}

/// Generate a timestamp, including instants before the epoch.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (-2_000_000_000_000i64..=4_000_000_000_000i64).prop_map(Timestamp::from_millis)
}

/// Generate a non-empty payload of at most `max_len` bytes.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len.max(1))
}

/// Generate a sender or receiver label.
pub fn label() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[A-Za-z][A-Za-z0-9 ]{0,15}")
}

/// Parameters for generating a message.
#[derive(Debug, Clone)]
pub struct MessageParams {
    pub data: Vec<u8>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub timestamp: Timestamp,
}

impl Arbitrary for MessageParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (payload(256), label(), label(), timestamp())
            .prop_map(|(data, sender, receiver, timestamp)| MessageParams {
                data,
                sender,
                receiver,
                timestamp,
            })
            .boxed()
    }
}

/// Build an unsealed, unlinked message from parameters.
pub fn message_from_params(params: &MessageParams) -> Message {
    let mut msg = Message::new(Bytes::from(params.data.clone())).at(params.timestamp);
    msg.sender = params.sender.clone();
    msg.receiver = params.receiver.clone();
    msg
}

/// Generate the messages of one block.
pub fn block_params(max_messages: usize) -> impl Strategy<Value = Vec<MessageParams>> {
    prop::collection::vec(any::<MessageParams>(), 1..=max_messages.max(1))
}

/// Generate the blocks of one chain.
pub fn chain_params(
    max_blocks: usize,
    max_messages: usize,
) -> impl Strategy<Value = Vec<Vec<MessageParams>>> {
    prop::collection::vec(block_params(max_messages), 1..=max_blocks.max(1))
}

/// Build a sealed block from parameters.
pub fn block_from_params(messages: &[MessageParams], timestamp: Timestamp) -> Block {
    let mut block = Block::new().at(timestamp);
    for params in messages {
        block
            .add_message(message_from_params(params))
            .expect("generated messages are unsealed");
    }
    block
}

/// Build a chain from parameters. Each block takes its first message's timestamp.
pub fn chain_from_params(blocks: &[Vec<MessageParams>]) -> Blockchain {
    let mut chain = Blockchain::new();
    for messages in blocks {
        let timestamp = messages
            .first()
            .map_or(Timestamp::from_millis(0), |m| m.timestamp);
        chain
            .add_block(block_from_params(messages, timestamp))
            .expect("generated blocks are non-empty and valid");
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use easychain_core::{HashAlgorithm, InvalidBlockchain};

    proptest! {
        #[test]
        fn message_hash_is_deterministic(params in any::<MessageParams>()) {
            let m1 = message_from_params(&params);
            let m2 = message_from_params(&params);
            prop_assert_eq!(m1.payload_hash(), m2.payload_hash());
            prop_assert_eq!(m1.hash(), m2.hash());
            prop_assert!(m1.hash().is_some());
        }

        #[test]
        fn any_data_change_changes_payload_hash(
            params in any::<MessageParams>(),
            flip in 1u8..=u8::MAX,
        ) {
            let original = message_from_params(&params);
            let mut data = params.data.clone();
            data[0] ^= flip;
            let mut tampered = original.clone();
            tampered.data = Bytes::from(data);

            prop_assert_ne!(original.payload_hash(), tampered.payload_hash());
        }

        #[test]
        fn link_captures_predecessor_hash(a in any::<MessageParams>(), b in any::<MessageParams>()) {
            let first = message_from_params(&a);
            let second = message_from_params(&b).link(&first);
            prop_assert_eq!(second.prev_hash, first.hash());
        }

        #[test]
        fn back_reference_changes_message_hash(
            params in any::<MessageParams>(),
            prev in content_hash(),
        ) {
            let unlinked = message_from_params(&params);
            let mut linked = unlinked.clone();
            linked.prev_hash = Some(prev);
            prop_assert_eq!(unlinked.payload_hash(), linked.payload_hash());
            prop_assert_ne!(unlinked.hash(), linked.hash());
        }

        #[test]
        fn generated_chains_validate(blocks in chain_params(4, 4)) {
            let chain = chain_from_params(&blocks);
            prop_assert!(chain.validate().is_ok());
            prop_assert_eq!(chain.len(), blocks.len());
        }

        #[test]
        fn tampering_names_the_tampered_block(
            blocks in chain_params(5, 3),
            pick in any::<prop::sample::Index>(),
            replacement in payload(32),
        ) {
            let mut chain = chain_from_params(&blocks);
            let block_index = pick.index(chain.len());
            let original = chain.blocks()[block_index].messages()[0].data.clone();
            prop_assume!(original[..] != replacement[..]);

            chain.block_mut(block_index).unwrap().message_mut(0).unwrap().data =
                Bytes::from(replacement);

            match chain.validate() {
                Err(InvalidBlockchain::Block { index, .. }) => prop_assert_eq!(index, block_index),
                other => prop_assert!(false, "expected block failure, got {:?}", other),
            }
        }

        #[test]
        fn cached_and_plain_encoders_agree(blocks in chain_params(3, 3)) {
            let chain = chain_from_params(&blocks);
            let cached = easychain_core::CachedEncoder::new(HashAlgorithm::Sha256, 8);
            prop_assert_eq!(chain.head_hash(), chain.head_hash_with(&cached));
            prop_assert!(chain.validate_with(&cached).is_ok());
            prop_assert!(cached.stats().len <= 8);
        }
    }
}
