//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. Every fixture stamps its
//! messages and blocks with [`FROZEN`], so hashes are reproducible.

use easychain_core::{Block, Blockchain, Encoder, HashAlgorithm, Message};
use easychain_store::MemoryStore;

/// 1955-11-12T00:00:00Z in Unix milliseconds.
pub const FROZEN: i64 = -445_219_200_000;

/// `(data, sender, receiver)` for each message of each example block.
pub const EXAMPLE_MESSAGES: [&[(&str, Option<&str>, Option<&str>)]; 4] = [
    &[
        ("This is the first message", None, None),
        ("Second message", Some("Alice"), Some("Bob")),
        ("Third message", Some("Bob"), Some("Alice")),
    ],
    &[
        ("Fourth message", None, None),
        ("Fifth message", Some("Eve"), Some("Steve")),
    ],
    &[
        ("Sixth message", None, None),
        (
            "Seventh Son of a Seventh Son is Iron Maiden's best album",
            Some("Me"),
            Some("Everyone"),
        ),
    ],
    &[
        ("Eighth message", Some("Bob"), Some("Charlie")),
        ("Ninth message", Some("Charlie"), Some("Daniels")),
        ("Tenth message", Some("Charlie"), Some("Brown")),
    ],
];

/// A message stamped with [`FROZEN`].
pub fn frozen_message(data: &str, sender: Option<&str>, receiver: Option<&str>) -> Message {
    let mut msg = Message::new(data.to_string()).at(FROZEN);
    msg.sender = sender.map(String::from);
    msg.receiver = receiver.map(String::from);
    msg
}

/// A sealed block of single-payload messages, stamped with [`FROZEN`].
pub fn frozen_block(texts: &[&str]) -> Block {
    let mut block = Block::new().at(FROZEN);
    for text in texts {
        block
            .add_message(frozen_message(text, None, None))
            .expect("fresh messages are unsealed");
    }
    block
}

/// The four example blocks, unlinked.
pub fn example_blocks() -> Vec<Block> {
    example_blocks_with(&HashAlgorithm::default())
}

/// [`example_blocks`] sealed with an explicit encoder.
pub fn example_blocks_with(encoder: &dyn Encoder) -> Vec<Block> {
    EXAMPLE_MESSAGES
        .iter()
        .map(|messages| {
            let mut block = Block::new().at(FROZEN);
            for (data, sender, receiver) in messages.iter() {
                block
                    .add_message_with(frozen_message(data, *sender, *receiver), encoder)
                    .expect("fresh messages are unsealed");
            }
            block
        })
        .collect()
}

/// The four-block example chain.
pub fn example_chain() -> Blockchain {
    let mut chain = Blockchain::new();
    for block in example_blocks() {
        chain.add_block(block).expect("example blocks are valid");
    }
    chain
}

/// A chain with one single-message block per text.
pub fn chain_of(texts: &[&str]) -> Blockchain {
    let mut chain = Blockchain::new();
    for text in texts {
        chain
            .add_block(frozen_block(&[*text]))
            .expect("fixture blocks are valid");
    }
    chain
}

/// A test fixture with an encoder and a memory store.
pub struct TestFixture {
    pub algorithm: HashAlgorithm,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a SHA-256 fixture with an empty store.
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::Sha256)
    }

    /// Create a fixture for a specific digest algorithm.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            store: MemoryStore::new(),
        }
    }

    /// The example chain, built with this fixture's algorithm.
    pub fn example_chain(&self) -> Blockchain {
        let mut chain = Blockchain::new();
        for block in example_blocks_with(&self.algorithm) {
            chain
                .add_block_with(block, &self.algorithm)
                .expect("example blocks are valid");
        }
        chain
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
