//! Store trait: the abstract interface for chain persistence.
//!
//! This trait allows the ledger to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;
use easychain_core::{Blockchain, ContentHash, Encoder};

use crate::error::{Result, StoreError};

/// Result of saving a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveResult {
    /// New blocks were appended to the stored chain.
    Appended {
        /// How many blocks were written.
        blocks: usize,
    },
    /// The stored chain already holds exactly these blocks.
    Unchanged,
    /// The chain disagrees with what is stored. Nothing was written.
    Conflict {
        /// Index of the first block that differs (or is missing).
        at_block: usize,
    },
}

/// Summary of a stored chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHead {
    /// The chain name.
    pub name: String,
    /// Number of stored blocks.
    pub len: usize,
    /// Sealed hash of the last stored block.
    pub head_hash: Option<ContentHash>,
    /// When the chain was last written (Unix ms).
    pub updated_at: i64,
}

/// The Store trait: async interface for chain persistence.
///
/// # Design Notes
///
/// - **Append-only**: a save only ever adds blocks past the stored length.
///   A chain whose sealed block hashes disagree with the stored ones, or
///   which is shorter than what is stored, is a `Conflict`.
/// - **No trust in bytes**: loading returns whatever was stored. Use
///   [`StoreExt::load_validated`] to re-establish integrity.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist `chain` under `name`, appending any new blocks.
    async fn save_chain(&self, name: &str, chain: &Blockchain) -> Result<SaveResult>;

    /// Load the chain stored under `name`, without validating it.
    async fn load_chain(&self, name: &str) -> Result<Option<Blockchain>>;

    /// Check if a chain exists.
    async fn has_chain(&self, name: &str) -> Result<bool>;

    /// List the names of all stored chains, sorted.
    async fn list_chains(&self) -> Result<Vec<String>>;

    /// Summary of a stored chain.
    async fn chain_head(&self, name: &str) -> Result<Option<ChainHead>>;
}

/// A shared store is a store, so several owners can hold one backend.
#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn save_chain(&self, name: &str, chain: &Blockchain) -> Result<SaveResult> {
        (**self).save_chain(name, chain).await
    }

    async fn load_chain(&self, name: &str) -> Result<Option<Blockchain>> {
        (**self).load_chain(name).await
    }

    async fn has_chain(&self, name: &str) -> Result<bool> {
        (**self).has_chain(name).await
    }

    async fn list_chains(&self) -> Result<Vec<String>> {
        (**self).list_chains().await
    }

    async fn chain_head(&self, name: &str) -> Result<Option<ChainHead>> {
        (**self).chain_head(name).await
    }
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Load a chain and validate it with `encoder`.
    ///
    /// A chain that fails validation is returned as
    /// [`StoreError::Integrity`], never as a value.
    fn load_validated(
        &self,
        name: &str,
        encoder: &dyn Encoder,
    ) -> impl std::future::Future<Output = Result<Option<Blockchain>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn load_validated(&self, name: &str, encoder: &dyn Encoder) -> Result<Option<Blockchain>> {
        let Some(chain) = self.load_chain(name).await? else {
            return Ok(None);
        };

        if let Err(source) = chain.validate_with(encoder) {
            tracing::warn!(chain = name, error = %source, "stored chain failed validation");
            return Err(StoreError::Integrity {
                name: name.to_string(),
                source,
            });
        }

        tracing::debug!(chain = name, blocks = chain.len(), "loaded and validated chain");
        Ok(Some(chain))
    }
}

/// Decide how `chain` relates to the stored block hashes.
///
/// Shared by every backend so that they agree on what counts as a conflict.
pub(crate) fn plan_save(stored: &[Option<ContentHash>], chain: &Blockchain) -> SaveResult {
    if chain.len() < stored.len() {
        return SaveResult::Conflict {
            at_block: chain.len(),
        };
    }
    for (index, (stored_hash, block)) in stored.iter().zip(chain.blocks()).enumerate() {
        if *stored_hash != block.sealed_hash() {
            return SaveResult::Conflict { at_block: index };
        }
    }
    match chain.len() - stored.len() {
        0 => SaveResult::Unchanged,
        blocks => SaveResult::Appended { blocks },
    }
}

/// Get current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    easychain_core::Timestamp::now().as_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use easychain_core::{Block, Message};

    fn chain_of(texts: &[&str]) -> Blockchain {
        let mut chain = Blockchain::new();
        for text in texts {
            chain
                .add_block(Block::from_messages([Message::new(text.to_string())]).unwrap())
                .unwrap();
        }
        chain
    }

    fn hashes(chain: &Blockchain) -> Vec<Option<ContentHash>> {
        chain.blocks().iter().map(|b| b.sealed_hash()).collect()
    }

    #[test]
    fn test_plan_fresh_chain() {
        let chain = chain_of(&["a", "b"]);
        assert_eq!(plan_save(&[], &chain), SaveResult::Appended { blocks: 2 });
    }

    #[test]
    fn test_plan_unchanged() {
        let chain = chain_of(&["a", "b"]);
        assert_eq!(plan_save(&hashes(&chain), &chain), SaveResult::Unchanged);
    }

    #[test]
    fn test_plan_extension() {
        let mut chain = chain_of(&["a"]);
        let stored = hashes(&chain);
        chain
            .add_block(Block::from_messages([Message::new("b")]).unwrap())
            .unwrap();
        assert_eq!(plan_save(&stored, &chain), SaveResult::Appended { blocks: 1 });
    }

    #[test]
    fn test_plan_truncation_conflicts() {
        let chain = chain_of(&["a", "b", "c"]);
        let shorter = chain_of(&["a"]);
        assert_eq!(
            plan_save(&hashes(&chain), &shorter),
            SaveResult::Conflict { at_block: 1 }
        );
    }

    #[test]
    fn test_plan_divergence_conflicts() {
        let stored = hashes(&chain_of(&["a", "b"]));
        let other = chain_of(&["x", "y", "z"]);
        assert_eq!(plan_save(&stored, &other), SaveResult::Conflict { at_block: 0 });
    }
}
