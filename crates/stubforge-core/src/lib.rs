//! Shared model types for stubforge.
//!
//! This crate holds everything a front end and the generator agree on:
//!
//! - [`TypeRef`] - resolved type references with default-relevant shape
//! - [`MemberModel`] - properties, methods and events
//! - [`InterfaceModel`] / [`ClassModel`] / [`StubRequest`] - generation inputs
//! - [`SignatureKey`] - exact-match signature identity
//! - [`diagnostics`] - the structured diagnostic catalogue

pub mod diagnostics;
mod error;
mod member;
mod model;
mod signature;
mod type_ref;

pub use diagnostics::{Diagnostic, DiagnosticDescriptor, Diagnostics, Severity};
pub use error::ModelError;
pub use member::{
    Accessibility, ConstraintKind, EventMember, EventShape, MemberModel, MethodMember, Modifiers,
    ParameterModel, PassingMode, PropertyMember, Receiver, TypeParameterModel,
};
pub use model::{
    ClassModel, ConstructorModel, InterfaceModel, Placement, StubRequest, StubTarget,
};
pub use signature::SignatureKey;
pub use type_ref::{NamedType, Primitive, TypeRef, TypeShape};
