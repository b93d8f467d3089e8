//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::traits::now_millis;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per named chain
        CREATE TABLE chains (
            name TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,      -- local time of first save (Unix ms)
            updated_at INTEGER NOT NULL       -- local time of last append
        );

        -- Blocks, in chain order
        CREATE TABLE blocks (
            chain TEXT NOT NULL REFERENCES chains(name),
            idx INTEGER NOT NULL,             -- position within the chain
            block_hash BLOB,                  -- 32 bytes, sealed hash (nullable)
            prev_hash BLOB,                   -- 32 bytes, stored back-reference
            timestamp INTEGER NOT NULL,       -- block creation time (Unix ms)
            message_count INTEGER NOT NULL,
            body BLOB NOT NULL,               -- CBOR block snapshot

            PRIMARY KEY (chain, idx)
        );

        CREATE INDEX idx_blocks_hash ON blocks(block_hash);
        "#,
    )?;

    Ok(())
}
