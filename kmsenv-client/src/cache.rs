//! Thread-safe LRU cache of decrypted data keys.
//!
//! Maps the hex encoding of a wrapped data key to its plaintext, so that
//! decrypting many envelopes under the same data key costs one service
//! call. Entries only ever come from a successful service decrypt.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

/// Default number of cached data keys.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Bounded, least-recently-used cache of plaintext data keys.
///
/// Clones share the same underlying entries.
#[derive(Clone)]
pub struct DataKeyCache {
    entries: Arc<Mutex<LruCache<String, Zeroizing<Vec<u8>>>>>,
}

impl DataKeyCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Cache key for a wrapped data key.
    pub fn fingerprint(encrypted_key: &[u8]) -> String {
        hex::encode(encrypted_key)
    }

    /// Looks up a plaintext data key and marks it most recently used.
    pub async fn get(&self, encrypted_key: &[u8]) -> Option<Zeroizing<Vec<u8>>> {
        let fingerprint = Self::fingerprint(encrypted_key);
        self.entries.lock().await.get(&fingerprint).cloned()
    }

    /// Stores a plaintext data key, evicting the least recently used entry
    /// when full.
    pub async fn insert(&self, encrypted_key: &[u8], plaintext: Zeroizing<Vec<u8>>) {
        let fingerprint = Self::fingerprint(encrypted_key);
        self.entries.lock().await.put(fingerprint, plaintext);
    }

    /// Returns true if the key is cached, without touching its recency.
    pub async fn contains(&self, encrypted_key: &[u8]) -> bool {
        let fingerprint = Self::fingerprint(encrypted_key);
        self.entries.lock().await.contains(&fingerprint)
    }

    /// Drops one entry (e.g. after the master key was rotated).
    pub async fn remove(&self, encrypted_key: &[u8]) -> Option<Zeroizing<Vec<u8>>> {
        let fingerprint = Self::fingerprint(encrypted_key);
        self.entries.lock().await.pop(&fingerprint)
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.entries.lock().await.cap().get()
    }
}

impl Default for DataKeyCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}
