//! # easychain store
//!
//! Storage abstraction for easychain. Provides a trait-based interface for
//! chain persistence with SQLite and in-memory implementations, plus
//! versioned CBOR snapshots.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`SaveResult`] - Outcome of saving a chain
//! - [`snapshot`] - Encoding a chain or block to bytes and back
//!
//! ## Usage
//!
//! ```rust,no_run
//! use easychain_core::{Block, Blockchain, HashAlgorithm, Message};
//! use easychain_store::{SqliteStore, Store, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("chain.db").unwrap();
//!
//!     let mut chain = Blockchain::new();
//!     chain
//!         .add_block(Block::from_messages([Message::new("hello")]).unwrap())
//!         .unwrap();
//!     store.save_chain("main", &chain).await.unwrap();
//!
//!     // Loading through StoreExt re-validates every hash and link.
//!     let chain = store.load_validated("main", &HashAlgorithm::Sha256).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: saving never rewrites stored blocks; divergence is a `Conflict`
//! - **Untrusted bytes**: stored data is only trusted after validation

pub mod error;
pub mod memory;
pub mod migration;
pub mod snapshot;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ChainHead, SaveResult, Store, StoreExt};
