//! Signature recovery cache: bounded memoization of `signature -> public key`.
//!
//! # Semantics
//! - Lookup is by signature alone. A hit is trusted only when the entry was recorded for the
//!   transaction id and the signing digest currently being verified; otherwise the caller
//!   recovers fresh. The digest covers the chain id and context-free data, which the id does not.
//! - Inserting a signature that is already cached is a no-op (the original entry is kept).
//! - Eviction is FIFO by insertion order and runs once per batch, after all of the batch's
//!   insertions, until the cache is back at capacity.
//!
//! The cache only affects speed: dropping every entry never changes a validation outcome.
//!
//! # Invariants
//! - `order` and `entries` always hold the same set of signatures.
//! - After `insert_batch` returns, `len() <= capacity()`.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::signature::{Digest, PublicKey, Signature, TransactionId};

/// Default number of cached recoveries.
pub const DEFAULT_RECOVERY_CACHE_CAPACITY: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRecovery {
    pub trx_id: TransactionId,
    /// Digest the key was recovered from.
    pub sig_digest: Digest,
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct Inner {
    /// Insertion order, oldest first
    order: VecDeque<Signature>,
    entries: HashMap<Signature, CachedRecovery>,
    stats: CacheStats,
}

/// Thread-safe recovery cache shared by validation workers.
#[derive(Debug)]
pub struct RecoveryCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl RecoveryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cached key for `signature` if it was recovered for `trx_id` over `sig_digest`.
    pub fn lookup(&self, signature: &Signature, trx_id: &TransactionId, sig_digest: &Digest) -> Option<PublicKey> {
        let mut inner = self.inner.lock();
        let key = inner
            .entries
            .get(signature)
            .filter(|entry| entry.trx_id == *trx_id && entry.sig_digest == *sig_digest)
            .map(|entry| entry.public_key);
        if key.is_some() {
            inner.stats.hits += 1;
        } else {
            inner.stats.misses += 1;
        }
        key
    }

    /// Inserts fresh recoveries, then evicts the oldest entries while over capacity.
    pub fn insert_batch<I>(&self, recoveries: I)
    where
        I: IntoIterator<Item = CachedRecovery>,
    {
        let mut inner = self.inner.lock();
        for recovery in recoveries {
            if inner.entries.contains_key(&recovery.signature) {
                continue;
            }
            inner.order.push_back(recovery.signature);
            inner.entries.insert(recovery.signature, recovery);
        }

        let mut evicted = 0u64;
        while inner.order.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    evicted += 1;
                }
                None => break,
            }
        }
        if evicted > 0 {
            inner.stats.evictions += evicted;
            debug!(evicted, size = inner.order.len(), "evicted signature recovery cache entries");
        }
    }

    pub fn contains(&self, signature: &Signature) -> bool {
        self.inner.lock().entries.contains_key(signature)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().order.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.order.clear();
        inner.entries.clear();
    }
}

impl Default for RecoveryCache {
    fn default() -> Self {
        Self::new(DEFAULT_RECOVERY_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{PrivateKey, SIGNATURE_LEN};

    fn sig(n: u32) -> Signature {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[1..5].copy_from_slice(&n.to_be_bytes());
        Signature::from_bytes(bytes)
    }

    fn digest() -> Digest {
        Digest::hash(b"sig digest")
    }

    fn entry(n: u32, trx_id: TransactionId, key: PublicKey) -> CachedRecovery {
        CachedRecovery {
            trx_id,
            sig_digest: digest(),
            public_key: key,
            signature: sig(n),
        }
    }

    fn key() -> PublicKey {
        PrivateKey::from_slice(&[7; 32]).unwrap().public_key()
    }

    #[test]
    fn test_lookup_requires_matching_trx_id() {
        let cache = RecoveryCache::new(10);
        let a = Digest::hash(b"a");
        let b = Digest::hash(b"b");
        cache.insert_batch([entry(1, a, key())]);

        assert_eq!(cache.lookup(&sig(1), &a, &digest()), Some(key()));
        assert_eq!(cache.lookup(&sig(1), &b, &digest()), None);
        assert_eq!(cache.lookup(&sig(2), &a, &digest()), None);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2, evictions: 0 });
    }

    #[test]
    fn test_lookup_requires_matching_sig_digest() {
        let cache = RecoveryCache::new(10);
        let id = Digest::hash(b"a");
        cache.insert_batch([entry(1, id, key())]);

        assert_eq!(cache.lookup(&sig(1), &id, &Digest::hash(b"other chain")), None);
        assert_eq!(cache.lookup(&sig(1), &id, &digest()), Some(key()));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, evictions: 0 });
    }

    #[test]
    fn test_duplicate_insert_keeps_first() {
        let cache = RecoveryCache::new(10);
        let a = Digest::hash(b"a");
        let b = Digest::hash(b"b");
        cache.insert_batch([entry(1, a, key()), entry(1, b, key())]);
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup(&sig(1), &a, &digest()).is_some());
        assert!(cache.lookup(&sig(1), &b, &digest()).is_none());
    }

    #[test]
    fn test_fifo_eviction_after_batch() {
        let cache = RecoveryCache::new(3);
        let id = Digest::hash(b"t");
        cache.insert_batch((0..5).map(|n| entry(n, id, key())));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&sig(0)));
        assert!(!cache.contains(&sig(1)));
        assert!(cache.contains(&sig(2)));
        assert!(cache.contains(&sig(4)));
        assert_eq!(cache.stats().evictions, 2);
    }

    #[test]
    fn test_default_capacity_evicts_single_oldest() {
        let cache = RecoveryCache::default();
        let id = Digest::hash(b"t");
        let k = key();
        cache.insert_batch((0..=DEFAULT_RECOVERY_CACHE_CAPACITY as u32).map(|n| entry(n, id, k)));
        assert_eq!(cache.len(), DEFAULT_RECOVERY_CACHE_CAPACITY);
        assert!(!cache.contains(&sig(0)));
        assert!(cache.contains(&sig(1)));
        assert!(cache.contains(&sig(DEFAULT_RECOVERY_CACHE_CAPACITY as u32)));
        assert_eq!(cache.lookup(&sig(0), &id, &digest()), None);
    }

    #[test]
    fn test_clear() {
        let cache = RecoveryCache::new(3);
        cache.insert_batch([entry(1, Digest::hash(b"a"), key())]);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_inserts_respect_capacity() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(RecoveryCache::new(50));
        let k = key();
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let id = Digest::hash(&t.to_le_bytes());
                    for n in 0..100u32 {
                        cache.insert_batch([entry(t * 1_000 + n, id, k)]);
                        let _ = cache.lookup(&sig(t * 1_000 + n), &id, &digest());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), 50);
    }
}
