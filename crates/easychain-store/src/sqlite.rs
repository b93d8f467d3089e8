//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use easychain_core::{Block, Blockchain, ContentHash};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::snapshot;
use crate::traits::{now_millis, plan_save, ChainHead, SaveResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(format!("sqlite connection: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn hash_from_blob(blob: Option<Vec<u8>>) -> Result<Option<ContentHash>> {
    blob.map(|b| {
        ContentHash::try_from(b.as_slice())
            .map_err(|_| StoreError::InvalidData(format!("hash column has {} bytes", b.len())))
    })
    .transpose()
}

fn stored_hashes(conn: &Connection, name: &str) -> Result<Vec<Option<ContentHash>>> {
    let mut stmt = conn.prepare("SELECT block_hash FROM blocks WHERE chain = ?1 ORDER BY idx")?;
    let blobs = stmt
        .query_map(params![name], |row| row.get::<_, Option<Vec<u8>>>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    blobs.into_iter().map(hash_from_blob).collect()
}

fn insert_block(conn: &Connection, name: &str, idx: usize, block: &Block) -> Result<()> {
    let body = snapshot::encode_block(block)?;
    conn.execute(
        "INSERT INTO blocks (chain, idx, block_hash, prev_hash, timestamp, message_count, body)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            name,
            idx as i64,
            block.sealed_hash().map(|h| h.0.to_vec()),
            block.prev_hash.map(|h| h.0.to_vec()),
            block.timestamp.as_millis(),
            block.len() as i64,
            body,
        ],
    )?;
    Ok(())
}

#[async_trait]
impl Store for SqliteStore {
    async fn save_chain(&self, name: &str, chain: &Blockchain) -> Result<SaveResult> {
        let name = name.to_string();
        let chain = chain.clone();

        self.blocking(move |conn| {
            let tx = conn.transaction()?;

            let stored = stored_hashes(&tx, &name)?;
            let result = plan_save(&stored, &chain);

            match result {
                SaveResult::Appended { blocks } => {
                    let now = now_millis();
                    tx.execute(
                        "INSERT INTO chains (name, created_at, updated_at) VALUES (?1, ?2, ?2)
                         ON CONFLICT(name) DO UPDATE SET updated_at = excluded.updated_at",
                        params![name, now],
                    )?;
                    for (idx, block) in chain.blocks().iter().enumerate().skip(stored.len()) {
                        insert_block(&tx, &name, idx, block)?;
                    }
                    tx.commit()?;
                    tracing::debug!(chain = %name, blocks, "appended blocks");
                }
                SaveResult::Conflict { at_block } => {
                    tracing::warn!(chain = %name, at_block, "refusing to overwrite stored chain");
                }
                SaveResult::Unchanged => {}
            }

            Ok(result)
        })
        .await
    }

    async fn load_chain(&self, name: &str) -> Result<Option<Blockchain>> {
        let name = name.to_string();

        self.blocking(move |conn| {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT created_at FROM chains WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Ok(None);
            }

            let mut stmt = conn.prepare("SELECT body FROM blocks WHERE chain = ?1 ORDER BY idx")?;
            let bodies = stmt
                .query_map(params![name], |row| row.get::<_, Vec<u8>>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let blocks = bodies
                .iter()
                .map(|body| snapshot::decode_block(body))
                .collect::<Result<Vec<_>>>()?;

            Ok(Some(Blockchain::from_blocks_unchecked(blocks)))
        })
        .await
    }

    async fn has_chain(&self, name: &str) -> Result<bool> {
        let name = name.to_string();

        self.blocking(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM chains WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    async fn list_chains(&self) -> Result<Vec<String>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM chains ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(names)
        })
        .await
    }

    async fn chain_head(&self, name: &str) -> Result<Option<ChainHead>> {
        let name = name.to_string();

        self.blocking(move |conn| {
            let updated_at: Option<i64> = conn
                .query_row(
                    "SELECT updated_at FROM chains WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(updated_at) = updated_at else {
                return Ok(None);
            };

            let (len, head): (i64, Option<Vec<u8>>) = conn.query_row(
                "SELECT COUNT(*),
                        (SELECT block_hash FROM blocks WHERE chain = ?1 ORDER BY idx DESC LIMIT 1)
                 FROM blocks WHERE chain = ?1",
                params![name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            Ok(Some(ChainHead {
                name,
                len: len as usize,
                head_hash: hash_from_blob(head)?,
                updated_at,
            }))
        })
        .await
    }
}
