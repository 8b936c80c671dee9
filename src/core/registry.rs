// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Thread-safe registry for per-type hooks.
//!
//! Holds the custom default providers and custom string representations that
//! callers attach to type names listed in the generator configuration.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe name-keyed registry.
///
/// Uses RwLock for concurrent read access with exclusive write access.
/// Values are shared behind `Arc` so lookups never hold the lock while the
/// hook runs.
pub struct HookRegistry<T: ?Sized> {
    inner: RwLock<HashMap<String, Arc<T>>>,
}

impl<T: ?Sized> HookRegistry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Register a hook, replacing any previous one for the same name.
    pub fn register(&self, name: impl Into<String>, hook: Arc<T>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.insert(name.into(), hook);
    }

    /// Get a hook by name.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.get(name).cloned()
    }

    /// Check if a hook is registered.
    pub fn contains(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.contains_key(name)
    }

    /// Get all registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = inner.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove a hook.
    pub fn remove(&self, name: &str) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.remove(name).is_some()
    }

    /// Get the number of registered hooks.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> Default for HookRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_registry() {
        let registry: HookRegistry<u32> = HookRegistry::new();
        assert!(registry.is_empty());

        registry.register("Amount", Arc::new(42));
        assert_eq!(registry.get("Amount").as_deref(), Some(&42));
        assert!(registry.contains("Amount"));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("Amount"));
        assert!(!registry.contains("Amount"));
        assert!(!registry.remove("Amount"));
    }

    #[test]
    fn test_names_sorted() {
        let registry: HookRegistry<str> = HookRegistry::new();
        registry.register("b", Arc::from("x"));
        registry.register("a", Arc::from("y"));
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_register_replaces() {
        let registry: HookRegistry<u32> = HookRegistry::new();
        registry.register("T", Arc::new(1));
        registry.register("T", Arc::new(2));
        assert_eq!(registry.get("T").as_deref(), Some(&2));
        assert_eq!(registry.len(), 1);
    }
}
