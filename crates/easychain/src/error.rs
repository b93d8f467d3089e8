//! Error types for the ledger.

use easychain_core::{InvalidBlock, InvalidBlockchain, InvalidMessage};
use easychain_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A message failed validation.
    #[error(transparent)]
    Message(#[from] InvalidMessage),

    /// A block failed validation.
    #[error(transparent)]
    Block(#[from] InvalidBlock),

    /// The chain failed validation.
    #[error(transparent)]
    Chain(#[from] InvalidBlockchain),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Messages must carry data; an empty message has no hash to link to.
    #[error("refusing to record a message with no data")]
    EmptyMessage,

    /// The store holds a different history for this chain.
    #[error("conflict persisting chain {name}: stored history differs at block {at_block}")]
    Conflict { name: String, at_block: usize },
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
