//! In-memory implementation of the Store trait.
//!
//! Used for testing and ephemeral ledgers. Blocks are kept as encoded
//! snapshots, so a load goes through the same decode path as SQLite.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use easychain_core::{Blockchain, ContentHash};

use crate::error::{Result, StoreError};
use crate::snapshot;
use crate::traits::{now_millis, plan_save, ChainHead, SaveResult, Store};

/// In-memory store implementation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<String, StoredChain>>,
}

#[derive(Default)]
struct StoredChain {
    blocks: Vec<StoredBlock>,
    updated_at: i64,
}

struct StoredBlock {
    hash: Option<ContentHash>,
    body: Vec<u8>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored blocks across all chains.
    pub fn block_count(&self) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner.values().map(|c| c.blocks.len()).sum())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, StoredChain>>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(format!("memory store: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, StoredChain>>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(format!("memory store: {}", e)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn save_chain(&self, name: &str, chain: &Blockchain) -> Result<SaveResult> {
        let mut inner = self.write()?;

        let stored: Vec<Option<ContentHash>> = inner
            .get(name)
            .map(|c| c.blocks.iter().map(|b| b.hash).collect())
            .unwrap_or_default();

        let result = plan_save(&stored, chain);
        if let SaveResult::Appended { .. } = result {
            // Encode before touching the map so a failure leaves it unchanged.
            let mut appended = Vec::with_capacity(chain.len() - stored.len());
            for block in &chain.blocks()[stored.len()..] {
                appended.push(StoredBlock {
                    hash: block.sealed_hash(),
                    body: snapshot::encode_block(block)?,
                });
            }

            let entry = inner.entry(name.to_string()).or_default();
            entry.blocks.extend(appended);
            entry.updated_at = now_millis();
        }

        Ok(result)
    }

    async fn load_chain(&self, name: &str) -> Result<Option<Blockchain>> {
        let inner = self.read()?;
        let Some(stored) = inner.get(name) else {
            return Ok(None);
        };

        let blocks = stored
            .blocks
            .iter()
            .map(|b| snapshot::decode_block(&b.body))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Blockchain::from_blocks_unchecked(blocks)))
    }

    async fn has_chain(&self, name: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(name))
    }

    async fn list_chains(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    async fn chain_head(&self, name: &str) -> Result<Option<ChainHead>> {
        let inner = self.read()?;
        Ok(inner.get(name).map(|stored| ChainHead {
            name: name.to_string(),
            len: stored.blocks.len(),
            head_hash: stored.blocks.last().and_then(|b| b.hash),
            updated_at: stored.updated_at,
        }))
    }
}
