use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use super::ResourceError;

/// Key -> index map plus dense storage; the shared core of every registry.
///
/// Entries are never removed, so indices stay valid for the process lifetime.
#[derive(Debug)]
pub(crate) struct HandleTable<K, V> {
    by_key: HashMap<K, u32>,
    items: Vec<Arc<V>>,
}

impl<K: Eq + Hash, V> HandleTable<K, V> {
    pub(crate) fn new() -> Self {
        Self { by_key: HashMap::new(), items: Vec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn lookup(&self, key: &K) -> Option<u32> {
        self.by_key.get(key).copied()
    }

    pub(crate) fn get(&self, index: usize) -> Option<Arc<V>> {
        self.items.get(index).cloned()
    }

    /// Inserts `value` under `key`, or returns the index already stored there.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<u32, ResourceError> {
        if let Some(index) = self.lookup(&key) {
            return Ok(index);
        }
        // u32::MAX is the invalid sentinel.
        let index = u32::try_from(self.items.len())
            .ok()
            .filter(|&i| i < u32::MAX)
            .ok_or(ResourceError::Exhausted)?;
        self.items.push(Arc::new(value));
        self.by_key.insert(key, index);
        Ok(index)
    }

    /// Swaps the value at `index`; readers holding the old `Arc` keep it.
    pub(crate) fn replace(&mut self, index: usize, value: V) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = Arc::new(value);
                true
            }
            None => false,
        }
    }

    pub(crate) fn get_or_insert_with(
        &mut self,
        key: K,
        make: impl FnOnce() -> V,
    ) -> Result<u32, ResourceError> {
        match self.lookup(&key) {
            Some(index) => Ok(index),
            None => self.insert(key, make()),
        }
    }
}
