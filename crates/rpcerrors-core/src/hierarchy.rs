//! Hierarchy resolvers: expand an abstract error type into the concrete
//! types that derive from it.

use std::sync::RwLock;

use crate::types::ErrorType;

/// Discovers the concrete subtypes of an error type.
///
/// Implementations return concrete (instantiable) types only, in no
/// particular order. `scope` is a type-path prefix restricting the search;
/// an empty scope is unrestricted.
pub trait HierarchyResolver: Send + Sync {
    fn concrete_subtypes(&self, base: &ErrorType, scope: &str) -> Vec<ErrorType>;
}

impl<F> HierarchyResolver for F
where
    F: Fn(&ErrorType, &str) -> Vec<ErrorType> + Send + Sync,
{
    fn concrete_subtypes(&self, base: &ErrorType, scope: &str) -> Vec<ErrorType> {
        self(base, scope)
    }
}

/// Resolver used when no discovery backend is available. Always empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyHierarchyResolver;

impl HierarchyResolver for EmptyHierarchyResolver {
    fn concrete_subtypes(&self, base: &ErrorType, _scope: &str) -> Vec<ErrorType> {
        tracing::warn!(
            error_type = %base,
            "can't extract the hierarchy of abstract error type; provide a HierarchyResolver"
        );
        Vec::new()
    }
}

/// A resolver over an explicit list of known error types, populated by the
/// modules that define them.
#[derive(Default)]
pub struct StaticHierarchyResolver {
    known: RwLock<Vec<ErrorType>>,
}

impl StaticHierarchyResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type. Re-registering the same path is a no-op.
    pub fn register(&self, error_type: ErrorType) {
        let mut known = self.known.write().unwrap();
        if !known.contains(&error_type) {
            known.push(error_type);
        }
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.known.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<ErrorType> for StaticHierarchyResolver {
    fn from_iter<I: IntoIterator<Item = ErrorType>>(iter: I) -> Self {
        let resolver = Self::new();
        for t in iter {
            resolver.register(t);
        }
        resolver
    }
}

impl HierarchyResolver for StaticHierarchyResolver {
    fn concrete_subtypes(&self, base: &ErrorType, scope: &str) -> Vec<ErrorType> {
        self.known
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.is_concrete() && t != &base && t.is_subtype_of(base) && t.in_scope(scope))
            .cloned()
            .collect()
    }
}
