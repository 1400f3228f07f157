//! Default-value resolution.
//!
//! [`DefaultValueResolver::resolve`] classifies a type into the
//! [`DefaultValueStrategy`] the generated code uses when a member has no
//! override and no hand-written implementation. It is total and pure: every
//! type gets exactly one strategy and the same type always gets the same one.
//!
//! ## Rules
//!
//! 1. `()`, primitives, `Option<_>` and value-shaped types use `Default::default()`.
//! 2. Tuples use `Default::default()` when every element does.
//! 3. Reference-shaped types with a parameterless constructor are built with `<T>::new()`.
//! 4. Recognized collection abstractions become a fresh container (see [`collections`]).
//! 5. Method type parameters use `Default::default()` when bounded by `Default`.
//! 6. Futures resolve on their payload; a payload-less future completes with `()`.
//! 7. Everything else is unresolvable and fails at call time.

pub mod collections;

use stubforge_core::{NamedType, TypeParameterModel, TypeRef, TypeShape};

pub use collections::ContainerKind;

/// A type that can be built fresh at call time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConcreteType {
    /// The declared type itself, via `<T>::new()`.
    Constructible(TypeRef),
    /// A growable container standing in for a collection abstraction.
    Collection {
        kind: ContainerKind,
        elements: Vec<TypeRef>,
    },
}

impl ConcreteType {
    /// Rust spelling of the concrete type.
    pub fn type_name(&self) -> String {
        match self {
            ConcreteType::Constructible(ty) => ty.to_string(),
            ConcreteType::Collection { kind, elements } => {
                collections::container_type(*kind, elements)
            }
        }
    }

    /// Whether the value must be converted into the declared type.
    pub fn needs_conversion(&self) -> bool {
        matches!(self, ConcreteType::Collection { .. })
    }
}

/// How a member produces a value when nothing else does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValueStrategy {
    UseTypeDefault,
    ConstructConcrete(ConcreteType),
    Unresolvable,
}

impl DefaultValueStrategy {
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, DefaultValueStrategy::Unresolvable)
    }
}

/// Resolves default strategies, aware of the enclosing method's type parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueResolver<'a> {
    type_params: &'a [TypeParameterModel],
}

impl<'a> DefaultValueResolver<'a> {
    /// Resolver for types outside any generic method.
    pub fn new() -> Self {
        Self { type_params: &[] }
    }

    /// Resolver for types inside a method with these type parameters.
    pub fn with_type_params(type_params: &'a [TypeParameterModel]) -> Self {
        Self { type_params }
    }

    /// Classify `ty`.
    pub fn resolve(&self, ty: &TypeRef) -> DefaultValueStrategy {
        match ty {
            TypeRef::Unit | TypeRef::Primitive(_) | TypeRef::Nullable(_) => {
                DefaultValueStrategy::UseTypeDefault
            }
            TypeRef::Tuple(items) => {
                let all_default = items
                    .iter()
                    .all(|item| self.resolve(item) == DefaultValueStrategy::UseTypeDefault);
                if all_default {
                    DefaultValueStrategy::UseTypeDefault
                } else {
                    DefaultValueStrategy::Unresolvable
                }
            }
            TypeRef::Named(named) => self.resolve_named(ty, named),
            TypeRef::Param(name) => {
                let default_constructible = self
                    .type_params
                    .iter()
                    .find(|p| &p.name == name)
                    .is_some_and(TypeParameterModel::is_default_constructible);
                if default_constructible {
                    DefaultValueStrategy::UseTypeDefault
                } else {
                    DefaultValueStrategy::Unresolvable
                }
            }
            TypeRef::Future(None) => DefaultValueStrategy::UseTypeDefault,
            TypeRef::Future(Some(payload)) => self.resolve(payload),
        }
    }

    fn resolve_named(&self, ty: &TypeRef, named: &NamedType) -> DefaultValueStrategy {
        match named.shape {
            TypeShape::Value => DefaultValueStrategy::UseTypeDefault,
            TypeShape::Reference {
                parameterless_ctor: true,
            } => DefaultValueStrategy::ConstructConcrete(ConcreteType::Constructible(ty.clone())),
            TypeShape::Reference { .. } | TypeShape::Abstract => {
                match collections::recognize(named) {
                    Some(kind) => DefaultValueStrategy::ConstructConcrete(ConcreteType::Collection {
                        kind,
                        elements: named.args.clone(),
                    }),
                    None => DefaultValueStrategy::Unresolvable,
                }
            }
        }
    }
}
