//! Read-through cache of hierarchy lookups, shareable across decoders.
//!
//! The first lookup for a `(base type, scope)` pair runs discovery; every
//! later lookup, from any decoder sharing the cache, reuses the result.
//! Concurrent first lookups for the same pair run discovery exactly once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use rpcerrors_core::{ErrorType, HierarchyResolver};

type Entry = Arc<OnceLock<Arc<[ErrorType]>>>;

/// Memoized subtype sets keyed by base type path and scope.
#[derive(Default)]
pub struct SubtypeCache {
    entries: Mutex<HashMap<(String, String), Entry>>,
}

impl SubtypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> Arc<SubtypeCache> {
        static GLOBAL: OnceLock<Arc<SubtypeCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(SubtypeCache::new())).clone()
    }

    /// Return the cached subtypes of `base` in `scope`, running `discover`
    /// on a miss.
    pub fn get_or_discover<F>(&self, base: &ErrorType, scope: &str, discover: F) -> Arc<[ErrorType]>
    where
        F: FnOnce() -> Vec<ErrorType>,
    {
        let entry = {
            let mut entries = self.entries.lock().unwrap();
            entries
                .entry((base.path().to_string(), scope.to_string()))
                .or_default()
                .clone()
        };

        if let Some(hit) = entry.get() {
            tracing::debug!(error_type = %base, scope, "subtype cache hit");
            return hit.clone();
        }

        entry
            .get_or_init(|| {
                tracing::debug!(error_type = %base, scope, "subtype cache miss");
                let found: Arc<[ErrorType]> = discover().into();
                tracing::debug!(error_type = %base, count = found.len(), "found subtypes");
                found
            })
            .clone()
    }

    /// Number of cached `(base, scope)` pairs.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Wraps a resolver with a [`SubtypeCache`].
pub struct CachedHierarchyResolver<R> {
    inner: R,
    cache: Arc<SubtypeCache>,
}

impl<R: HierarchyResolver> CachedHierarchyResolver<R> {
    /// Cache private to this resolver.
    pub fn new(inner: R) -> Self {
        Self::with_cache(inner, Arc::new(SubtypeCache::new()))
    }

    /// Cache shared by every resolver in the process.
    pub fn shared(inner: R) -> Self {
        Self::with_cache(inner, SubtypeCache::global())
    }

    pub fn with_cache(inner: R, cache: Arc<SubtypeCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<SubtypeCache> {
        &self.cache
    }
}

impl<R: HierarchyResolver> HierarchyResolver for CachedHierarchyResolver<R> {
    fn concrete_subtypes(&self, base: &ErrorType, scope: &str) -> Vec<ErrorType> {
        self.cache
            .get_or_discover(base, scope, || self.inner.concrete_subtypes(base, scope))
            .to_vec()
    }
}
