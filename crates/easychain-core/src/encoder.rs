//! Hash encoders.
//!
//! An [`Encoder`] maps an arbitrary byte payload to a [`ContentHash`]. It is
//! pure: identical input always yields an identical digest, and there are no
//! error conditions (the empty payload is valid).
//!
//! Memoization is opt-in and owned by the caller through [`CachedEncoder`].
//! There is no process-wide table.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::ContentHash;

/// Maps a payload to a fixed-width content hash.
pub trait Encoder: Send + Sync {
    /// Hash the given payload.
    fn encode(&self, payload: &[u8]) -> ContentHash;

    /// The hash function behind this encoder.
    fn algorithm(&self) -> HashAlgorithm;

    /// Hash a string payload (its UTF-8 bytes).
    fn encode_str(&self, payload: &str) -> ContentHash {
        self.encode(payload.as_bytes())
    }
}

/// The cryptographic hash function used to derive content hashes.
///
/// Both produce 32-byte digests (64 hex characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-256. The reference algorithm.
    #[default]
    Sha256,
    /// BLAKE3.
    Blake3,
}

impl HashAlgorithm {
    /// Compute the digest of `payload` without any caching.
    pub fn digest(self, payload: &[u8]) -> ContentHash {
        match self {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(payload);
                ContentHash(hasher.finalize().into())
            }
            HashAlgorithm::Blake3 => ContentHash(*blake3::hash(payload).as_bytes()),
        }
    }

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake3 => "blake3",
        }
    }
}

impl Encoder for HashAlgorithm {
    fn encode(&self, payload: &[u8]) -> ContentHash {
        self.digest(payload)
    }

    fn algorithm(&self) -> HashAlgorithm {
        *self
    }
}

/// Hit/miss counters for a [`CachedEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded payload → digest table with FIFO eviction.
#[derive(Debug)]
pub struct DigestCache {
    capacity: usize,
    entries: HashMap<Vec<u8>, ContentHash>,
    order: VecDeque<Vec<u8>>,
    hits: u64,
    misses: u64,
}

impl DigestCache {
    /// Create a cache holding at most `capacity` digests.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.min(4096)),
            order: VecDeque::with_capacity(capacity.min(4096)),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a digest, recording a hit or a miss.
    pub fn get(&mut self, payload: &[u8]) -> Option<ContentHash> {
        match self.entries.get(payload) {
            Some(hash) => {
                self.hits += 1;
                Some(*hash)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert a digest, evicting the oldest entry when full.
    pub fn insert(&mut self, payload: &[u8], hash: ContentHash) {
        if self.capacity == 0 || self.entries.contains_key(payload) {
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(payload.to_vec());
        self.entries.insert(payload.to_vec(), hash);
    }

    /// Number of cached digests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            len: self.entries.len(),
            capacity: self.capacity,
        }
    }
}

/// An encoder that memoizes digests in a bounded, caller-owned cache.
///
/// Observable behavior is identical to the wrapped [`HashAlgorithm`]; only
/// repeated hashing of identical payloads gets cheaper.
#[derive(Debug)]
pub struct CachedEncoder {
    algorithm: HashAlgorithm,
    cache: Mutex<DigestCache>,
}

impl CachedEncoder {
    /// Create a cached encoder. A `capacity` of zero disables caching.
    pub fn new(algorithm: HashAlgorithm, capacity: usize) -> Self {
        Self {
            algorithm,
            cache: Mutex::new(DigestCache::new(capacity)),
        }
    }

    /// Current cache counters.
    pub fn stats(&self) -> CacheStats {
        match self.cache.lock() {
            Ok(cache) => cache.stats(),
            Err(poisoned) => poisoned.into_inner().stats(),
        }
    }

    /// Empty the cache.
    pub fn clear(&self) {
        match self.cache.lock() {
            Ok(mut cache) => cache.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl Encoder for CachedEncoder {
    fn encode(&self, payload: &[u8]) -> ContentHash {
        // A poisoned cache only loses memoization, never correctness.
        let Ok(mut cache) = self.cache.lock() else {
            return self.algorithm.digest(payload);
        };
        if let Some(hash) = cache.get(payload) {
            return hash;
        }
        let hash = self.algorithm.digest(payload);
        cache.insert(payload, hash);
        hash
    }

    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_digest() {
        let hash = HashAlgorithm::Sha256.encode_str("");
        assert_eq!(
            hash.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_abc() {
        let hash = HashAlgorithm::Sha256.encode_str("abc");
        assert_eq!(
            hash.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        for algorithm in [HashAlgorithm::Sha256, HashAlgorithm::Blake3] {
            let h1 = algorithm.encode(b"test data");
            let h2 = algorithm.encode(b"test data");
            assert_eq!(h1, h2);
            assert_ne!(h1, algorithm.encode(b"different data"));
            assert_eq!(h1.to_hex().len(), 64);
        }
    }

    #[test]
    fn test_algorithms_differ() {
        assert_ne!(
            HashAlgorithm::Sha256.encode(b"payload"),
            HashAlgorithm::Blake3.encode(b"payload")
        );
    }

    #[test]
    fn test_cached_matches_uncached() {
        let cached = CachedEncoder::new(HashAlgorithm::Sha256, 8);
        for payload in ["a", "b", "a", "", "a"] {
            assert_eq!(cached.encode_str(payload), HashAlgorithm::Sha256.encode_str(payload));
        }
        let stats = cached.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.len, 3);
    }

    #[test]
    fn test_cache_is_bounded() {
        let cached = CachedEncoder::new(HashAlgorithm::Blake3, 4);
        for i in 0..100u32 {
            cached.encode(&i.to_le_bytes());
        }
        assert_eq!(cached.stats().len, 4);

        // Oldest entries were evicted, newest retained.
        cached.encode(&99u32.to_le_bytes());
        cached.encode(&0u32.to_le_bytes());
        let stats = cached.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.len, 4);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cached = CachedEncoder::new(HashAlgorithm::Sha256, 0);
        cached.encode(b"x");
        cached.encode(b"x");
        let stats = cached.stats();
        assert_eq!(stats.len, 0);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_clear_resets() {
        let cached = CachedEncoder::new(HashAlgorithm::Sha256, 4);
        cached.encode(b"x");
        cached.encode(b"x");
        cached.clear();
        assert_eq!(cached.stats(), CacheStats { capacity: 4, ..CacheStats::default() });
    }
}
