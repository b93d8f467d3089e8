//! # easychain
//!
//! A tamper-evident, hash-linked log. Messages are chained into blocks and
//! blocks into a blockchain; any later edit to a stored message, block or
//! link is caught by validation.
//!
//! ## Overview
//!
//! - **Message**: an opaque payload with optional sender/receiver labels
//! - **Block**: an append-only sequence of linked messages
//! - **Blockchain**: an append-only sequence of linked blocks
//! - **Ledger**: a named chain with an open block and a backing store
//!
//! ## Key Concepts
//!
//! - **Seal**: the hashes frozen when an entity is appended. Validation
//!   recomputes every hash from the live fields and compares it to the seal.
//! - **Link**: each entity stores the hash of its predecessor.
//! - **Cascade**: a block fails when any of its messages fails; a chain fails
//!   when any of its blocks fails. Errors name the offending index.
//!
//! This is tamper evidence, not tamper resistance: anyone able to rewrite
//! every hash consistently is not detected. There are no signatures.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use easychain::{Ledger, LedgerConfig};
//! use easychain::store::SqliteStore;
//!
//! async fn example() -> easychain::Result<()> {
//!     let store = SqliteStore::open("chain.db")?;
//!     let ledger = Ledger::new("main", store, LedgerConfig::default());
//!
//!     ledger.record("This is the first message").await?;
//!     ledger.record("Second message").await?;
//!     ledger.commit().await?;
//!
//!     ledger.validate().await?;
//!     ledger.persist().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `easychain::core` - Core primitives (Message, Block, Blockchain, ...)
//! - `easychain::store` - Storage abstraction, snapshots and SQLite

pub mod error;
pub mod ledger;

pub use easychain_core as core;
pub use easychain_store as store;

pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LedgerConfig};

pub use easychain_core::{
    Block, Blockchain, CachedEncoder, ContentHash, Encoder, HashAlgorithm, InvalidBlock,
    InvalidBlockchain, InvalidMessage, Message, Timestamp,
};
