//! Versioned snapshots of chain state.
//!
//! A snapshot is a CBOR envelope `{ version, body }` around the serde form of
//! a [`Blockchain`] or a single [`Block`]. Decoding never validates: the
//! bytes carry no checksum of their own, and integrity after a load is
//! established only by calling `validate()` on the result.

use easychain_core::{Block, Blockchain};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u8,
    body: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u8,
    body: T,
}

fn encode<T: Serialize>(body: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(
        &EnvelopeRef {
            version: SNAPSHOT_VERSION,
            body,
        },
        &mut buf,
    )
    .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let envelope: Envelope<T> =
        ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
    if envelope.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion(envelope.version));
    }
    Ok(envelope.body)
}

/// Encode a whole chain.
pub fn encode_chain(chain: &Blockchain) -> Result<Vec<u8>> {
    encode(chain)
}

/// Decode a whole chain. The result is not validated.
pub fn decode_chain(bytes: &[u8]) -> Result<Blockchain> {
    decode(bytes)
}

/// Encode a single block.
pub fn encode_block(block: &Block) -> Result<Vec<u8>> {
    encode(block)
}

/// Decode a single block. The result is not validated.
pub fn decode_block(bytes: &[u8]) -> Result<Block> {
    decode(bytes)
}

/// Pretty JSON export of a chain, for inspection.
pub fn to_json(chain: &Blockchain) -> Result<String> {
    serde_json::to_string_pretty(chain).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Parse a JSON export. The result is not validated.
pub fn from_json(json: &str) -> Result<Blockchain> {
    serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
}
