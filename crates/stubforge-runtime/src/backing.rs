//! Backing storage for indexers.

use std::cell::RefCell;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Key/value storage behind an indexer.
///
/// Setters with no override store into it and getters read from it before
/// falling back to the member's default. Resetting an interceptor leaves the
/// backing untouched so pre-populated entries survive.
#[derive(Debug)]
pub struct IndexBacking<K, V>(RefCell<FxHashMap<K, V>>);

impl<K, V> Default for IndexBacking<K, V> {
    fn default() -> Self {
        Self(RefCell::new(FxHashMap::default()))
    }
}

impl<K: Eq + Hash, V> IndexBacking<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.0.borrow_mut().insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.0.borrow_mut().remove(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.0.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl<K: Eq + Hash, V: Clone> IndexBacking<K, V> {
    /// A copy of the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.0.borrow().get(key).cloned()
    }
}
