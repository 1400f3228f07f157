//! Per-type-argument interceptor registry for generic methods.
//!
//! A generic method cannot carry one statically typed interceptor, because its
//! type arguments are only known at the call site. Instead the generated code
//! keeps a [`GenericRegistry`] keyed by the tuple of type arguments and asks it
//! for the typed interceptor on every call:
//!
//! ```rust
//! use std::rc::Rc;
//! use stubforge_runtime::{Counter, GenericRegistry, Tracked, TypeKey};
//!
//! #[derive(Default)]
//! struct Typed {
//!     call_count: Counter,
//! }
//!
//! impl Tracked for Typed {
//!     fn call_count(&self) -> usize {
//!         self.call_count.get()
//!     }
//!     fn reset(&self) {
//!         self.call_count.reset();
//!     }
//! }
//!
//! let registry = GenericRegistry::new();
//! let typed: Rc<Typed> = registry.get_or_create(TypeKey::of::<i32>(), Typed::default);
//! typed.call_count.bump();
//! assert_eq!(registry.total_call_count(), 1);
//! ```

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Ordered type arguments of one generic call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TypeKey(Vec<TypeId>);

impl TypeKey {
    /// Empty key. Extend with [`TypeKey::with`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for a single type argument.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new().with::<T>()
    }

    /// Builder: append a type argument.
    pub fn with<T: ?Sized + 'static>(mut self) -> Self {
        self.0.push(TypeId::of::<T>());
        self
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

/// Aggregate view of an interceptor, independent of its concrete type.
pub trait Tracked {
    fn call_count(&self) -> usize;

    fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Zero counters, clear stored arguments and override slots.
    fn reset(&self);
}

struct Entry {
    key: TypeKey,
    typed: Rc<dyn Any>,
    tracked: Rc<dyn Tracked>,
}

/// Lazily created typed interceptors, one per distinct type-argument tuple.
///
/// Entries are kept in creation order.
#[derive(Default)]
pub struct GenericRegistry {
    entries: RefCell<Vec<Entry>>,
    index: RefCell<FxHashMap<TypeKey, usize>>,
}

impl GenericRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The interceptor for `key`, created with `make` on first access.
    pub fn get_or_create<I, M>(&self, key: TypeKey, make: M) -> Rc<I>
    where
        I: Tracked + 'static,
        M: FnOnce() -> I,
    {
        let existing = self.index.borrow().get(&key).copied();
        if let Some(position) = existing {
            let typed = Rc::clone(&self.entries.borrow()[position].typed);
            match typed.downcast::<I>() {
                Ok(interceptor) => return interceptor,
                Err(_) => {
                    // Same key registered with another interceptor type; replace it.
                    tracing::warn!(arity = key.arity(), "generic registry entry type mismatch");
                    let interceptor = Rc::new(make());
                    self.entries.borrow_mut()[position] = Entry {
                        key,
                        typed: Rc::clone(&interceptor) as Rc<dyn Any>,
                        tracked: Rc::clone(&interceptor) as Rc<dyn Tracked>,
                    };
                    return interceptor;
                }
            }
        }

        let interceptor = Rc::new(make());
        let mut entries = self.entries.borrow_mut();
        self.index.borrow_mut().insert(key.clone(), entries.len());
        entries.push(Entry {
            key,
            typed: Rc::clone(&interceptor) as Rc<dyn Any>,
            tracked: Rc::clone(&interceptor) as Rc<dyn Tracked>,
        });
        interceptor
    }

    /// The interceptor for `key`, if one was created.
    pub fn get<I: Tracked + 'static>(&self, key: &TypeKey) -> Option<Rc<I>> {
        let position = self.index.borrow().get(key).copied()?;
        let typed = Rc::clone(&self.entries.borrow()[position].typed);
        typed.downcast::<I>().ok()
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.index.borrow().contains_key(key)
    }

    /// Number of distinct type-argument tuples seen.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Keys in creation order.
    pub fn keys(&self) -> Vec<TypeKey> {
        self.entries.borrow().iter().map(|e| e.key.clone()).collect()
    }

    /// Calls summed over every typed interceptor.
    pub fn total_call_count(&self) -> usize {
        self.tracked().iter().map(|t| t.call_count()).sum()
    }

    /// Whether any typed interceptor was called.
    pub fn was_called(&self) -> bool {
        self.tracked().iter().any(|t| t.was_called())
    }

    /// Reset every typed interceptor, then forget them all.
    pub fn reset(&self) {
        for tracked in self.tracked() {
            tracked.reset();
        }
        self.entries.borrow_mut().clear();
        self.index.borrow_mut().clear();
    }

    fn tracked(&self) -> Vec<Rc<dyn Tracked>> {
        self.entries
            .borrow()
            .iter()
            .map(|e| Rc::clone(&e.tracked))
            .collect()
    }
}

impl fmt::Debug for GenericRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Counter;
    use std::marker::PhantomData;

    struct Typed<T> {
        call_count: Counter,
        _marker: PhantomData<fn() -> T>,
    }

    impl<T> Typed<T> {
        fn new() -> Self {
            Self {
                call_count: Counter::new(),
                _marker: PhantomData,
            }
        }
    }

    impl<T: 'static> Tracked for Typed<T> {
        fn call_count(&self) -> usize {
            self.call_count.get()
        }

        fn reset(&self) {
            self.call_count.reset();
        }
    }

    #[test]
    fn same_key_returns_same_instance() {
        let registry = GenericRegistry::new();
        let a: Rc<Typed<i32>> = registry.get_or_create(TypeKey::of::<i32>(), Typed::new);
        let b: Rc<Typed<i32>> = registry.get_or_create(TypeKey::of::<i32>(), Typed::new);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let registry = GenericRegistry::new();
        let ints: Rc<Typed<i32>> = registry.get_or_create(TypeKey::of::<i32>(), Typed::new);
        let texts: Rc<Typed<String>> = registry.get_or_create(TypeKey::of::<String>(), Typed::new);
        ints.call_count.bump();
        texts.call_count.bump();
        texts.call_count.bump();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.total_call_count(), 3);
        assert!(registry.was_called());
    }

    #[test]
    fn multi_argument_keys_are_ordered() {
        assert_ne!(
            TypeKey::new().with::<i32>().with::<String>(),
            TypeKey::new().with::<String>().with::<i32>()
        );
        assert_eq!(TypeKey::new().with::<u8>().with::<u16>().arity(), 2);
    }

    #[test]
    fn reset_clears_nested_and_registry() {
        let registry = GenericRegistry::new();
        let ints: Rc<Typed<i32>> = registry.get_or_create(TypeKey::of::<i32>(), Typed::new);
        ints.call_count.bump();
        registry.reset();
        assert_eq!(ints.call_count.get(), 0);
        assert!(registry.is_empty());
        assert!(!registry.was_called());
        assert_eq!(registry.total_call_count(), 0);
    }

    #[test]
    fn get_without_create() {
        let registry = GenericRegistry::new();
        assert!(registry.get::<Typed<i32>>(&TypeKey::of::<i32>()).is_none());
        let _: Rc<Typed<i32>> = registry.get_or_create(TypeKey::of::<i32>(), Typed::new);
        assert!(registry.get::<Typed<i32>>(&TypeKey::of::<i32>()).is_some());
        assert!(registry.contains(&TypeKey::of::<i32>()));
        assert_eq!(registry.keys(), vec![TypeKey::of::<i32>()]);
    }

    #[test]
    fn mismatched_type_replaces_entry() {
        let registry = GenericRegistry::new();
        let _: Rc<Typed<i32>> = registry.get_or_create(TypeKey::of::<i32>(), Typed::new);
        let replaced: Rc<Typed<u8>> = registry.get_or_create(TypeKey::of::<i32>(), Typed::new);
        replaced.call_count.bump();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.total_call_count(), 1);
    }
}
