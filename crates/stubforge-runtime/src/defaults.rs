//! Runtime default provider.
//!
//! Generic members whose return type is a bare type parameter cannot get a
//! default at generation time. Their generated body asks the stub's
//! [`DefaultProvider`] for a value of the concrete type argument and fails with
//! [`unconfigured`](crate::unconfigured) if none is registered.

use std::any::{Any, TypeId};
use std::fmt;

use rustc_hash::FxHashMap;

type Factory = Box<dyn Fn() -> Box<dyn Any>>;

/// Produces default values by concrete type, looked up by `TypeId`.
pub struct DefaultProvider {
    factories: FxHashMap<TypeId, Factory>,
}

impl DefaultProvider {
    /// A provider with nothing registered.
    pub fn empty() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// A provider pre-populated with the primitive and standard types.
    pub fn with_std_defaults() -> Self {
        let mut provider = Self::empty();
        provider.register_default::<()>();
        provider.register_default::<bool>();
        provider.register_default::<char>();
        provider.register_default::<i8>();
        provider.register_default::<i16>();
        provider.register_default::<i32>();
        provider.register_default::<i64>();
        provider.register_default::<i128>();
        provider.register_default::<isize>();
        provider.register_default::<u8>();
        provider.register_default::<u16>();
        provider.register_default::<u32>();
        provider.register_default::<u64>();
        provider.register_default::<u128>();
        provider.register_default::<usize>();
        provider.register_default::<f32>();
        provider.register_default::<f64>();
        provider.register_default::<String>();
        provider
    }

    /// Register a factory for `T`, replacing any previous one.
    pub fn register<T, F>(&mut self, factory: F)
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        self.factories
            .insert(TypeId::of::<T>(), Box::new(move || Box::new(factory()) as Box<dyn Any>));
    }

    /// Register `T::default` as the factory for `T`.
    pub fn register_default<T: Default + 'static>(&mut self) {
        self.register::<T, _>(T::default);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<T, F>(mut self, factory: F) -> Self
    where
        T: 'static,
        F: Fn() -> T + 'static,
    {
        self.register(factory);
        self
    }

    pub fn can_provide<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// A fresh value of `T`, if a factory is registered.
    pub fn provide<T: 'static>(&self) -> Option<T> {
        let factory = self.factories.get(&TypeId::of::<T>())?;
        factory().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// A fresh value of `T`, or the unconfigured-member failure for `member`.
    pub fn provide_or_fail<T: 'static>(&self, member: &str, hint: &str) -> T {
        match self.provide::<T>() {
            Some(value) => value,
            None => crate::unconfigured(member, hint),
        }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for DefaultProvider {
    fn default() -> Self {
        Self::with_std_defaults()
    }
}

impl fmt::Debug for DefaultProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultProvider")
            .field("registered", &self.factories.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Order {
        id: u32,
    }

    #[test]
    fn std_defaults_cover_primitives() {
        let provider = DefaultProvider::default();
        assert_eq!(provider.provide::<i32>(), Some(0));
        assert_eq!(provider.provide::<String>(), Some(String::new()));
        assert_eq!(provider.provide::<bool>(), Some(false));
        assert!(provider.can_provide::<f64>());
    }

    #[test]
    fn unknown_type_is_none() {
        let provider = DefaultProvider::with_std_defaults();
        assert_eq!(provider.provide::<Order>(), None);
        assert!(DefaultProvider::empty().is_empty());
    }

    #[test]
    fn registered_factory_is_called_each_time() {
        let provider = DefaultProvider::empty().with(|| Order { id: 7 });
        assert_eq!(provider.provide::<Order>(), Some(Order { id: 7 }));
        assert_eq!(provider.provide::<Order>(), Some(Order { id: 7 }));
        assert_eq!(provider.len(), 1);
    }

    #[test]
    #[should_panic(expected = "Repository::get")]
    fn provide_or_fail_panics_with_member() {
        let provider = DefaultProvider::empty();
        let _: Order = provider.provide_or_fail("Repository::get", "register a default");
    }
}
