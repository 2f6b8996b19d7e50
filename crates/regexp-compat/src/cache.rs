//! Bounded cache of compiled patterns keyed on `(source, flags)`.
//!
//! Shared between contexts; the oldest entry is evicted first.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use tracing::trace;

use crate::config::RegExpConfig;
use crate::error::RegExpResult;
use crate::flags::RegExpFlags;
use crate::pattern::Pattern;

type CacheKey = (String, RegExpFlags);

/// Thread-safe pattern cache.
pub struct PatternCache {
    config: RegExpConfig,
    entries: Mutex<IndexMap<CacheKey, Arc<Pattern>, FxBuildHasher>>,
}

impl PatternCache {
    /// Cache sized and configured by `config`.
    pub fn new(config: RegExpConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(IndexMap::with_capacity_and_hasher(
                config.cache_capacity,
                FxBuildHasher,
            )),
        }
    }

    /// Shared cache, ready to hand to several contexts.
    pub fn shared(config: RegExpConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Configuration patterns are compiled with.
    pub fn config(&self) -> &RegExpConfig {
        &self.config
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.config.cache_capacity
    }

    /// Number of cached patterns.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Cached pattern for `(source, flags)`, compiling it on a miss.
    ///
    /// Compile errors are not cached.
    pub fn get_or_compile(&self, source: &str, flags: RegExpFlags) -> RegExpResult<Arc<Pattern>> {
        let key = (source.to_string(), flags);
        if let Some(pattern) = self.entries.lock().get(&key) {
            trace!(source, flags = %flags, "Pattern cache hit");
            return Ok(Arc::clone(pattern));
        }

        // Compile outside the lock.
        let pattern = Arc::new(Pattern::compile(source, flags, &self.config)?);
        let capacity = self.config.cache_capacity;
        if capacity == 0 {
            return Ok(pattern);
        }

        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return Ok(Arc::clone(existing));
        }
        while entries.len() >= capacity {
            if let Some(((evicted, _), _)) = entries.shift_remove_index(0) {
                trace!(source = %evicted, "Pattern cache eviction");
            }
        }
        entries.insert(key, Arc::clone(&pattern));
        Ok(pattern)
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(RegExpConfig::default())
    }
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
