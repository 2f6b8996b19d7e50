//! Script contexts and their registry.
//!
//! A context owns its own legacy match state but may share a
//! [`PatternCache`] with other contexts.

use parking_lot::{Mutex, RwLock};
use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};
use tracing::debug;

use crate::cache::PatternCache;
use crate::config::RegExpConfig;
use crate::error::RegExpResult;
use crate::flags::RegExpFlags;
use crate::match_result::MatchResult;
use crate::regexp::RegExpInstance;
use crate::statics::GlobalMatchState;

/// Unique context identifier.
pub type ContextId = u32;

/// One script context (a window, a worker...).
#[derive(Debug)]
pub struct RegExpContext {
    id: ContextId,
    statics: GlobalMatchState,
    cache: Arc<PatternCache>,
}

impl RegExpContext {
    /// Standalone context with its own default cache.
    pub fn new() -> Self {
        Self::with_config(RegExpConfig::default())
    }

    /// Standalone context with its own cache built from `config`.
    pub fn with_config(config: RegExpConfig) -> Self {
        Self::with_cache(0, PatternCache::shared(config))
    }

    /// Context backed by a shared cache.
    pub fn with_cache(id: ContextId, cache: Arc<PatternCache>) -> Self {
        Self {
            id,
            statics: GlobalMatchState::new(),
            cache,
        }
    }

    /// Context id.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Pattern cache used by [`compile`](Self::compile).
    pub fn cache(&self) -> &Arc<PatternCache> {
        &self.cache
    }

    /// `new RegExp(source, flags)`.
    pub fn compile(&self, source: &str, flags: &str) -> RegExpResult<RegExpInstance> {
        self.compile_with_flags(source, RegExpFlags::parse(flags)?)
    }

    /// Compile with already parsed flags.
    pub fn compile_with_flags(
        &self,
        source: &str,
        flags: RegExpFlags,
    ) -> RegExpResult<RegExpInstance> {
        let pattern = self.cache.get_or_compile(source, flags)?;
        Ok(RegExpInstance::new(pattern))
    }

    /// Legacy `RegExp.*` statics of this context.
    pub fn statics(&self) -> &GlobalMatchState {
        &self.statics
    }

    /// Mutable statics, for `RegExp.input = ...`.
    pub fn statics_mut(&mut self) -> &mut GlobalMatchState {
        &mut self.statics
    }

    pub(crate) fn record(&mut self, result: &MatchResult) {
        self.statics.update(result);
    }
}

impl Default for RegExpContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a registered context.
pub type ContextHandle = Arc<Mutex<RegExpContext>>;

/// Registry of live contexts. All contexts share one pattern cache.
pub struct ContextRegistry {
    cache: Arc<PatternCache>,
    contexts: RwLock<Vec<(ContextId, ContextHandle)>>,
    next_id: AtomicU32,
}

impl ContextRegistry {
    /// Registry whose shared cache is built from `config`.
    pub fn new(config: RegExpConfig) -> Arc<Self> {
        Arc::new(Self {
            cache: PatternCache::shared(config),
            contexts: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        })
    }

    /// The cache shared by every context.
    pub fn cache(&self) -> &Arc<PatternCache> {
        &self.cache
    }

    /// Allocate a new context id.
    pub fn allocate_id(&self) -> ContextId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Create and register a fresh context.
    pub fn create(&self) -> ContextHandle {
        let id = self.allocate_id();
        let handle = Arc::new(Mutex::new(RegExpContext::with_cache(
            id,
            Arc::clone(&self.cache),
        )));
        self.contexts.write().push((id, Arc::clone(&handle)));
        debug!(context = id, "Context created");
        handle
    }

    /// Lookup a context by id.
    pub fn get(&self, id: ContextId) -> Option<ContextHandle> {
        self.contexts
            .read()
            .iter()
            .find(|(context_id, _)| *context_id == id)
            .map(|(_, handle)| Arc::clone(handle))
    }

    /// Remove a context by id. Its statics go with it.
    pub fn remove(&self, id: ContextId) -> Option<ContextHandle> {
        let mut contexts = self.contexts.write();
        let pos = contexts.iter().position(|(context_id, _)| *context_id == id)?;
        debug!(context = id, "Context removed");
        Some(contexts.swap_remove(pos).1)
    }

    /// Number of live contexts.
    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    /// True when no context is registered.
    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_do_not_share_statics() {
        let registry = ContextRegistry::new(RegExpConfig::default());
        let a = registry.create();
        let b = registry.create();

        {
            let mut ctx = a.lock();
            let mut re = ctx.compile("(x)", "").unwrap();
            assert!(re.test(&mut ctx, "axb"));
            assert_eq!(ctx.statics().dollar(1), Some("x"));
        }
        assert_eq!(b.lock().statics().dollar(1), Some(""));
        assert_eq!(b.lock().statics().last_match(), "");
    }

    #[test]
    fn test_contexts_share_cache() {
        let registry = ContextRegistry::new(RegExpConfig::default());
        let a = registry.create();
        let b = registry.create();
        let ra = a.lock().compile("abc", "g").unwrap();
        let rb = b.lock().compile("abc", "g").unwrap();
        assert!(Arc::ptr_eq(ra.pattern(), rb.pattern()));
        assert_eq!(registry.cache().len(), 1);
    }

    #[test]
    fn test_instances_keep_own_last_index() {
        let mut ctx = RegExpContext::new();
        let mut first = ctx.compile("a", "g").unwrap();
        let second = ctx.compile("a", "g").unwrap();
        first.exec(&mut ctx, "aa");
        assert_eq!(first.last_index(), 1);
        assert_eq!(second.last_index(), 0);
    }

    #[test]
    fn test_registry_lookup_and_remove() {
        let registry = ContextRegistry::new(RegExpConfig::default());
        let a = registry.create();
        let id = a.lock().id();
        let b = registry.create();
        assert_ne!(id, b.lock().id());

        assert!(registry.get(id).is_some());
        assert_eq!(registry.len(), 2);
        assert!(registry.remove(id).is_some());
        assert!(registry.get(id).is_none());
        assert!(registry.remove(id).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_compile_errors() {
        let ctx = RegExpContext::new();
        assert!(ctx.compile("a", "gg").unwrap_err().is_syntax_error());
    }
}
