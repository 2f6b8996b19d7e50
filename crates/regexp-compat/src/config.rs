//! Configuration for RegExp compilation.
//!
//! Mirrors the builder-style config structs used by the runtime: a
//! `Default` impl plus chained setters.

/// Default number of compiled patterns kept per cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Default backtracking budget handed to the host engine.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// Settings applied when patterns are compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegExpConfig {
    /// Maximum number of `(source, flags)` entries in the pattern cache.
    /// Zero disables caching.
    /// Default: 256
    pub cache_capacity: usize,

    /// Backtracking steps the host engine may take for one search before it
    /// gives up. A search that exceeds it reports "no match".
    /// Default: 1_000_000
    pub backtrack_limit: usize,
}

impl Default for RegExpConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

impl RegExpConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config without a pattern cache.
    pub fn uncached() -> Self {
        Self {
            cache_capacity: 0,
            ..Default::default()
        }
    }

    /// Set the cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Set the host backtrack limit.
    pub fn backtrack_limit(mut self, limit: usize) -> Self {
        self.backtrack_limit = limit;
        self
    }
}
