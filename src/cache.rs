//! Memoization of set evaluations.
//!
//! Every evaluation in a search uses the same seed (common random
//! numbers), so simulating a set is a pure function of its members and
//! the search parameters. Greedy passes re-evaluate the same sets many
//! times (the incumbent of each step, overlapping sets across restarts),
//! and this cache makes those repeats free.
//!
//! ## Cache Key Design
//!
//! The key is an xxh64 hash of the sorted member ids, salted with a hash
//! of everything else that affects the result (diffusion parameters,
//! trials per evaluation, seed). Member order never changes the key.
//! Each entry also keeps its sorted member list, and a lookup only counts
//! as a hit when that list matches, so two sets sharing a hash never
//! share a result.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::canonical::node_set_hash;
use crate::types::{NodeId, TrialResult};

/// Configuration for the evaluation cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
    /// Whether to enable the cache.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            enabled: true,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that required a simulation.
    pub misses: u64,
}

struct CacheEntry {
    members: Vec<NodeId>,
    result: TrialResult,
}

/// LRU cache of trial results keyed by member set.
///
/// Thread-safe; lookups take a read lock only.
pub struct EvaluationCache {
    salt: u64,
    cache: Option<RwLock<LruCache<u64, CacheEntry>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvaluationCache {
    /// Create a cache. `salt` must identify every parameter besides the
    /// member set that affects evaluation results.
    pub fn new(config: &CacheConfig, salt: u64) -> Self {
        let cache = match NonZeroUsize::new(config.max_entries) {
            Some(size) if config.enabled => Some(RwLock::new(LruCache::new(size))),
            _ => None,
        };
        Self {
            salt,
            cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached result for `members`, or compute and store it.
    ///
    /// The boolean is `true` on a cache hit. Errors are never cached.
    pub fn get_or_try_insert<E, F>(&self, members: &[NodeId], compute: F) -> Result<(TrialResult, bool), E>
    where
        F: FnOnce() -> Result<TrialResult, E>,
    {
        let mut sorted = members.to_vec();
        sorted.sort_unstable();
        let key = node_set_hash(&sorted, self.salt);

        if let Some(cache) = &self.cache {
            if let Some(entry) = cache.read().peek(&key) {
                if entry.members == sorted {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok((entry.result, true));
                }
                tracing::debug!(key, "Evaluation cache key collision");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = compute()?;

        if let Some(cache) = &self.cache {
            cache.write().put(key, CacheEntry { members: sorted, result });
        }
        Ok((result, false))
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (len, cap) = match &self.cache {
            Some(cache) => {
                let cache = cache.read();
                (cache.len(), cache.cap().get())
            }
            None => (0, 0),
        };
        CacheStats {
            len,
            cap,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

}
