//! Generic method dispatch.
//!
//! A generic method's type arguments are only known at the call site, so its
//! interceptor is a registry keyed by the tuple of type arguments. Each entry
//! is the fully typed interceptor produced by the handler synthesizer,
//! created lazily on first access through `of::<T..>()`.
//!
//! The registry aggregates over every entry: total call count, "called with
//! any type argument", and a `reset()` that resets each entry and then forgets
//! them all.

use stubforge_core::TypeParameterModel;

use crate::handlers::{HandlerSynthesizer, InterceptorDef};
use crate::naming;
use crate::overload::{Overload, OverloadGroup};

/// The registry-backed interceptor of one generic method overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericDispatchDef {
    /// Field name in the bundle.
    pub field: String,
    /// Type of the registry wrapper.
    pub type_name: String,
    /// Per-type-argument interceptor.
    pub nested: InterceptorDef,
}

impl GenericDispatchDef {
    /// Type parameters forming the registry key, in declaration order.
    pub fn key_params(&self) -> &[TypeParameterModel] {
        &self.nested.type_params
    }
}

/// Wraps generic method interceptors in a type-argument registry.
#[derive(Debug, Clone, Copy)]
pub struct GenericDispatchSynthesizer<'a> {
    interface_simple: &'a str,
    suffix: &'a str,
}

impl<'a> GenericDispatchSynthesizer<'a> {
    pub fn new(interface_simple: &'a str, suffix: &'a str) -> Self {
        Self {
            interface_simple,
            suffix,
        }
    }

    /// Registry definition for a generic overload. `None` for non-generic methods.
    pub fn dispatch(&self, group: &OverloadGroup, overload: &Overload) -> Option<GenericDispatchDef> {
        if !overload.method.is_dispatched_generic() {
            return None;
        }
        let nested = HandlerSynthesizer::new(self.interface_simple, self.suffix).method(group, overload);
        Some(GenericDispatchDef {
            type_name: naming::interceptor_type_name(self.interface_simple, &nested.field, self.suffix),
            field: nested.field.clone(),
            nested,
        })
    }
}
