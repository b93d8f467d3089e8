//! # easychain core
//!
//! Pure primitives for a tamper-evident, hash-linked log: messages chained
//! into blocks, blocks chained into a blockchain.
//!
//! This crate contains no I/O, no storage, no logging. It is pure
//! computation over hash-linked data structures.
//!
//! ## Key Types
//!
//! - [`Message`] - The smallest chained unit
//! - [`Block`] - An append-only sequence of linked messages
//! - [`Blockchain`] - An append-only sequence of linked blocks
//! - [`ContentHash`] - A 32-byte digest, 64 hex characters
//! - [`Encoder`] - Payload to digest; [`HashAlgorithm`] and [`CachedEncoder`]
//!
//! ## Validation
//!
//! Each level validates itself and wraps failures from the level below:
//! [`InvalidMessage`] inside [`InvalidBlock`] inside [`InvalidBlockchain`].
//!
//! ```rust
//! use easychain_core::{Block, Blockchain, Message};
//!
//! let mut chain = Blockchain::new();
//! chain
//!     .add_block(Block::from_messages([Message::new("hello").with_sender("alice")]).unwrap())
//!     .unwrap();
//! chain.validate().unwrap();
//!
//! chain.block_mut(0).unwrap().message_mut(0).unwrap().data = "tampered".into();
//! assert!(chain.validate().is_err());
//! ```

pub mod block;
pub mod canonical;
pub mod chain;
pub mod encoder;
pub mod error;
pub mod linked;
pub mod message;
pub mod types;

pub use block::{Block, BlockSeal};
pub use chain::Blockchain;
pub use encoder::{CacheStats, CachedEncoder, DigestCache, Encoder, HashAlgorithm};
pub use error::{InvalidBlock, InvalidBlockchain, InvalidMessage};
pub use linked::HashLinked;
pub use message::{Message, MessageSeal};
pub use types::{ContentHash, Timestamp, DIGEST_LEN};
