//! Single-writer access to a `KnowledgeStore` shared between callers.

use std::sync::{Arc, PoisonError, RwLock};

use super::KnowledgeStore;

/// A cloneable handle serializing every mutation through one write lock.
///
/// Reads may run concurrently with each other but never interleave with a
/// mutation (and the save it triggers). A poisoned lock is recovered: a
/// panicked writer must not take the assistant down with it.
#[derive(Debug, Clone)]
pub struct SharedKnowledgeStore {
    inner: Arc<RwLock<KnowledgeStore>>,
}

impl SharedKnowledgeStore {
    /// Wrap a store for shared use.
    pub fn new(store: KnowledgeStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Run a read-only operation.
    pub fn read<R>(&self, f: impl FnOnce(&KnowledgeStore) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run a mutating operation inside the critical section.
    pub fn write<R>(&self, f: impl FnOnce(&mut KnowledgeStore) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl From<KnowledgeStore> for SharedKnowledgeStore {
    fn from(store: KnowledgeStore) -> Self {
        Self::new(store)
    }
}
