//! The Ledger: a named chain with an open block and a backing store.
//!
//! Messages are recorded into the open block; `commit` closes it and appends
//! it to the chain. The chain and the open block sit behind separate async
//! locks, always taken in the order open block, then chain.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, RwLock};

use easychain_core::{Block, Blockchain, CachedEncoder, ContentHash, HashAlgorithm, Message};
use easychain_store::{SaveResult, Store, StoreExt};

use crate::error::{LedgerError, Result};

/// Configuration for the Ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Digest algorithm for every hash the ledger computes.
    pub algorithm: HashAlgorithm,
    /// Entries kept by the digest cache. Zero disables caching.
    pub cache_capacity: usize,
    /// Validate the existing chain before appending a committed block.
    pub validate_on_commit: bool,
    /// Save to the store after every commit.
    ///
    /// A failed save is logged and leaves the commit in place;
    /// [`Ledger::persist`] retries it and reports the error.
    pub persist_on_commit: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            cache_capacity: 1024,
            validate_on_commit: true,
            persist_on_commit: false,
        }
    }
}

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Recording messages into an open block
/// - Committing blocks to the chain
/// - Validating the whole history
/// - Persisting to and restoring from a [`Store`]
pub struct Ledger<S: Store> {
    /// Chain name in the store.
    name: String,
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: LedgerConfig,
    /// Shared digest function.
    encoder: CachedEncoder,
    /// Committed history.
    chain: RwLock<Blockchain>,
    /// Block collecting messages until the next commit.
    pending: Mutex<Option<Block>>,
    /// Serializes saves so that each one sees a chain at least as long as the last.
    saving: Mutex<()>,
}

impl<S: Store> Ledger<S> {
    /// Create a ledger with an empty chain.
    ///
    /// Nothing is read from the store; use [`Ledger::open`] to resume.
    pub fn new(name: impl Into<String>, store: S, config: LedgerConfig) -> Self {
        Self::with_store(name.into(), Arc::new(store), config)
    }

    /// Open a ledger, resuming the chain stored under `name` if there is one.
    ///
    /// The stored chain is validated before it is accepted.
    pub async fn open(name: impl Into<String>, store: S, config: LedgerConfig) -> Result<Self> {
        let mut ledger = Self::with_store(name.into(), Arc::new(store), config);

        let chain = ledger
            .store
            .load_validated(&ledger.name, &ledger.encoder)
            .await?
            .unwrap_or_default();
        tracing::debug!(ledger = %ledger.name, blocks = chain.len(), "opened ledger");

        *ledger.chain.get_mut() = chain;
        Ok(ledger)
    }

    fn with_store(name: String, store: Arc<S>, config: LedgerConfig) -> Self {
        Self {
            encoder: CachedEncoder::new(config.algorithm, config.cache_capacity),
            name,
            store,
            config,
            chain: RwLock::new(Blockchain::new()),
            pending: Mutex::new(None),
            saving: Mutex::new(()),
        }
    }

    /// The chain name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The encoder every hash goes through.
    pub fn encoder(&self) -> &CachedEncoder {
        &self.encoder
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recording
    // ─────────────────────────────────────────────────────────────────────────

    /// Record `data` as a new message in the open block.
    ///
    /// Returns the message hash.
    pub async fn record(&self, data: impl Into<Bytes>) -> Result<ContentHash> {
        self.record_message(Message::new(data)).await
    }

    /// Record a prepared message in the open block.
    ///
    /// The message is linked to the block's current tail and sealed. Returns
    /// the message hash.
    pub async fn record_message(&self, msg: Message) -> Result<ContentHash> {
        if msg.data.is_empty() {
            return Err(LedgerError::EmptyMessage);
        }

        let mut pending = self.pending.lock().await;
        let block = pending.get_or_insert_with(Block::new);
        block.add_message_with(msg, &self.encoder)?;

        block
            .last()
            .and_then(|m| m.sealed())
            .and_then(|seal| seal.hash)
            .ok_or(LedgerError::EmptyMessage)
    }

    /// Number of messages waiting in the open block.
    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.as_ref().map_or(0, Block::len)
    }

    /// Close the open block and append it to the chain.
    ///
    /// Returns the new head hash, or `None` if there was nothing to commit.
    /// If the block is refused, the open block is kept, so no recorded
    /// message is lost. Once the block is appended the commit stands: with
    /// `persist_on_commit`, a failed save is only logged.
    pub async fn commit(&self) -> Result<Option<ContentHash>> {
        let mut pending = self.pending.lock().await;
        let Some(block) = pending.take() else {
            return Ok(None);
        };

        let head = {
            let mut chain = self.chain.write().await;

            if self.config.validate_on_commit {
                if let Err(e) = chain.validate_with(&self.encoder) {
                    tracing::warn!(ledger = %self.name, error = %e, "chain failed validation, commit refused");
                    *pending = Some(block);
                    return Err(e.into());
                }
            }

            if let Err(e) = chain.add_block_with(block.clone(), &self.encoder) {
                tracing::warn!(ledger = %self.name, error = %e, "block rejected");
                *pending = Some(block);
                return Err(e.into());
            }

            tracing::debug!(
                ledger = %self.name,
                blocks = chain.len(),
                messages = block.len(),
                "committed block"
            );
            chain.head().and_then(Block::sealed_hash)
        };
        drop(pending);

        if self.config.persist_on_commit {
            if let Err(e) = self.persist().await {
                tracing::warn!(ledger = %self.name, error = %e, "save after commit failed");
            }
        }
        Ok(head)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate the committed chain.
    pub async fn validate(&self) -> Result<()> {
        let chain = self.chain.read().await;
        chain.validate_with(&self.encoder).map_err(|e| {
            tracing::warn!(ledger = %self.name, error = %e, "chain failed validation");
            LedgerError::from(e)
        })
    }

    /// A copy of the committed chain.
    pub async fn snapshot(&self) -> Blockchain {
        self.chain.read().await.clone()
    }

    /// Number of committed blocks.
    pub async fn len(&self) -> usize {
        self.chain.read().await.len()
    }

    /// Whether no block has been committed.
    pub async fn is_empty(&self) -> bool {
        self.chain.read().await.is_empty()
    }

    /// Live hash of the head block.
    pub async fn head_hash(&self) -> Option<ContentHash> {
        self.chain.read().await.head_hash_with(&self.encoder)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the committed chain to the store.
    ///
    /// The open block is not saved.
    pub async fn persist(&self) -> Result<SaveResult> {
        let _saving = self.saving.lock().await;
        let chain = self.snapshot().await;

        match self.store.save_chain(&self.name, &chain).await? {
            SaveResult::Conflict { at_block } => Err(LedgerError::Conflict {
                name: self.name.clone(),
                at_block,
            }),
            result => Ok(result),
        }
    }
}
