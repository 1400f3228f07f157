//! Member model: properties, methods and events.
//!
//! Members are produced by a front end that has already flattened inherited
//! members into a single list. Each member remembers the trait that declares
//! it ([`MethodMember::declaring`] and friends) so the generator can route its
//! implementation into the right `impl Trait for Stub` block.
//!
//! ## Components
//!
//! - [`MemberModel`] - the member variant
//! - [`ParameterModel`] / [`PassingMode`] - parameters and how they are passed
//! - [`TypeParameterModel`] / [`ConstraintKind`] - method generics
//! - [`Modifiers`] / [`Accessibility`] - override and visibility information

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::TypeRef;

// ============================================================================
// Parameters
// ============================================================================

/// How a parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassingMode {
    /// Moved in: `value: T`.
    #[default]
    ByValue,
    /// Mutable reference the callee may read and write: `value: &mut T`.
    ByRef,
    /// Mutable reference the callee must write: `value: &mut T`.
    ///
    /// Out parameters are not tracked. The generated body assigns their
    /// default before anything else runs.
    Out,
    /// Shared reference: `value: &T` (`&str` for text).
    In,
}

impl PassingMode {
    /// Whether parameters with this mode take part in call tracking.
    pub fn is_tracked(self) -> bool {
        !matches!(self, PassingMode::Out)
    }
}

/// A single method, indexer or event-payload parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterModel {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub mode: PassingMode,
}

impl ParameterModel {
    /// A by-value parameter.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            mode: PassingMode::ByValue,
        }
    }

    /// Builder: set the passing mode.
    pub fn with_mode(mut self, mode: PassingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Rust spelling of the parameter type as it appears in a signature.
    pub fn signature_type(&self) -> String {
        match self.mode {
            PassingMode::ByValue => self.ty.to_string(),
            PassingMode::In => self.ty.borrowed(),
            PassingMode::ByRef | PassingMode::Out => self.ty.borrowed_mut(),
        }
    }
}

// ============================================================================
// Type Parameters
// ============================================================================

/// A constraint on a method type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "bound")]
pub enum ConstraintKind {
    /// Only reference-shaped arguments. No Rust bound is emitted.
    ReferenceOnly,
    /// Only value-shaped arguments. No Rust bound is emitted.
    ValueOnly,
    /// Plain-data arguments; rendered as `Copy`.
    Unmanaged,
    /// Arguments with a parameterless constructor; rendered as `Default`.
    DefaultConstructible,
    /// `'static`. Required for per-type-argument interception.
    Static,
    /// Explicit trait bound, e.g. `Clone` or `serde::Serialize`.
    Bound(String),
}

impl ConstraintKind {
    /// Rust bound text, if this constraint has one.
    pub fn rust_bound(&self) -> Option<String> {
        match self {
            ConstraintKind::ReferenceOnly | ConstraintKind::ValueOnly => None,
            ConstraintKind::Unmanaged => Some("Copy".to_string()),
            ConstraintKind::DefaultConstructible => Some("Default".to_string()),
            ConstraintKind::Static => Some("'static".to_string()),
            ConstraintKind::Bound(bound) => Some(bound.clone()),
        }
    }
}

/// A method type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParameterModel {
    pub name: String,
    #[serde(default)]
    pub constraints: Vec<ConstraintKind>,
}

impl TypeParameterModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    /// Builder: add a constraint.
    pub fn with_constraint(mut self, constraint: ConstraintKind) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn has_constraint(&self, constraint: &ConstraintKind) -> bool {
        self.constraints.contains(constraint)
    }

    /// Whether the parameter is known to implement `Default`.
    pub fn is_default_constructible(&self) -> bool {
        self.has_constraint(&ConstraintKind::DefaultConstructible)
    }

    /// Whether the parameter is known to implement `Clone` (directly or via `Copy`).
    pub fn is_cloneable(&self) -> bool {
        self.constraints.iter().any(|c| match c {
            ConstraintKind::Unmanaged => true,
            ConstraintKind::Bound(b) => {
                let last = b.rsplit("::").next().unwrap_or(b);
                last == "Clone" || last == "Copy"
            }
            _ => false,
        })
    }

    /// Rust bounds in declaration order.
    pub fn rust_bounds(&self) -> Vec<String> {
        self.constraints
            .iter()
            .filter_map(ConstraintKind::rust_bound)
            .collect()
    }
}

// ============================================================================
// Modifiers & Accessibility
// ============================================================================

bitflags! {
    /// Override-related member and class modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const ABSTRACT = 1 << 0;
        const VIRTUAL = 1 << 1;
        const SEALED = 1 << 2;
        const STATIC = 1 << 3;
    }
}

impl Modifiers {
    /// Whether a class stub may intercept a member with these modifiers.
    pub fn is_overridable(self) -> bool {
        self.intersects(Modifiers::ABSTRACT | Modifiers::VIRTUAL) && !self.contains(Modifiers::SEALED)
    }
}

/// Declared accessibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

impl Accessibility {
    /// Reachable from a derived stub.
    pub fn is_accessible_to_derived(self) -> bool {
        !matches!(self, Accessibility::Private)
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessibility::Public => write!(f, "public"),
            Accessibility::Protected => write!(f, "protected"),
            Accessibility::Internal => write!(f, "internal"),
            Accessibility::Private => write!(f, "private"),
        }
    }
}

/// Method receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    /// `&self`
    #[default]
    Shared,
    /// `&mut self`
    Exclusive,
}

// ============================================================================
// Members
// ============================================================================

/// A property or indexer.
///
/// Properties render as a `name(&self) -> T` getter and a
/// `set_name(&mut self, value: T)` setter. Indexers take their index
/// parameters ahead of the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default = "yes")]
    pub has_getter: bool,
    #[serde(default)]
    pub has_setter: bool,
    #[serde(default)]
    pub is_indexer: bool,
    #[serde(default)]
    pub index_params: Vec<ParameterModel>,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Trait that declares this member. `None` means the owning model.
    #[serde(default)]
    pub declaring: Option<String>,
}

fn yes() -> bool {
    true
}

impl PropertyMember {
    /// Read-only property.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            has_getter: true,
            has_setter: false,
            is_indexer: false,
            index_params: Vec::new(),
            modifiers: Modifiers::empty(),
            accessibility: Accessibility::Public,
            declaring: None,
        }
    }

    /// Indexer keyed by the given parameters.
    pub fn indexer(name: impl Into<String>, ty: TypeRef, keys: Vec<ParameterModel>) -> Self {
        let mut member = Self::new(name, ty);
        member.is_indexer = true;
        member.index_params = keys;
        member
    }

    /// Builder: add a setter.
    pub fn with_setter(mut self) -> Self {
        self.has_setter = true;
        self
    }

    /// Builder: remove the getter.
    pub fn write_only(mut self) -> Self {
        self.has_getter = false;
        self.has_setter = true;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn declared_by(mut self, path: impl Into<String>) -> Self {
        self.declaring = Some(path.into());
        self
    }

    /// Name of the generated setter function.
    pub fn setter_name(&self) -> String {
        format!("set_{}", self.name)
    }
}

/// A method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodMember {
    pub name: String,
    #[serde(default = "unit")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<ParameterModel>,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterModel>,
    #[serde(default)]
    pub is_generic: bool,
    #[serde(default)]
    pub receiver: Receiver,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub declaring: Option<String>,
}

fn unit() -> TypeRef {
    TypeRef::Unit
}

impl MethodMember {
    /// Zero-argument method returning `()`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: TypeRef::Unit,
            parameters: Vec::new(),
            type_parameters: Vec::new(),
            is_generic: false,
            receiver: Receiver::Shared,
            modifiers: Modifiers::empty(),
            accessibility: Accessibility::Public,
            declaring: None,
        }
    }

    pub fn with_param(mut self, param: ParameterModel) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    /// Builder: add a type parameter. Marks the method generic.
    pub fn with_type_param(mut self, param: TypeParameterModel) -> Self {
        self.type_parameters.push(param);
        self.is_generic = true;
        self
    }

    pub fn with_receiver(mut self, receiver: Receiver) -> Self {
        self.receiver = receiver;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn declared_by(mut self, path: impl Into<String>) -> Self {
        self.declaring = Some(path.into());
        self
    }

    /// Parameters that take part in call tracking (everything except `Out`).
    pub fn tracked_params(&self) -> impl Iterator<Item = &ParameterModel> {
        self.parameters.iter().filter(|p| p.mode.is_tracked())
    }

    /// Parameters written by the callee.
    pub fn out_params(&self) -> impl Iterator<Item = &ParameterModel> {
        self.parameters.iter().filter(|p| p.mode == PassingMode::Out)
    }

    /// Whether calls dispatch on type arguments.
    ///
    /// Decided by the declared type parameters alone; a method flagged generic
    /// without any is rejected before generation.
    pub fn is_dispatched_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    pub fn type_param(&self, name: &str) -> Option<&TypeParameterModel> {
        self.type_parameters.iter().find(|p| p.name == name)
    }
}

/// Callback shape of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventShape {
    /// Handlers return nothing.
    #[default]
    Void,
    /// Handlers return a value; raising yields the last handler's result.
    Returning,
    /// Handlers return a future awaited in subscription order.
    Async,
}

/// An event: a subscribable list of handlers.
///
/// Rendered as `add_name(&self, handler)` and `remove_name(&self, &handler)`
/// where the handler type is `Rc<dyn Fn(payload..) -> R>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventMember {
    pub name: String,
    #[serde(default)]
    pub payload_params: Vec<ParameterModel>,
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub shape: EventShape,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub declaring: Option<String>,
}

impl EventMember {
    /// Event whose handlers take no payload and return nothing.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload_params: Vec::new(),
            return_type: None,
            is_async: false,
            shape: EventShape::Void,
            modifiers: Modifiers::empty(),
            accessibility: Accessibility::Public,
            declaring: None,
        }
    }

    pub fn with_payload(mut self, param: ParameterModel) -> Self {
        self.payload_params.push(param);
        self
    }

    /// Builder: handlers return `ty`.
    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self.shape = EventShape::Returning;
        self.is_async = false;
        self
    }

    /// Builder: handlers are async.
    pub fn asynchronous(mut self) -> Self {
        self.return_type = None;
        self.shape = EventShape::Async;
        self.is_async = true;
        self
    }

    pub fn declared_by(mut self, path: impl Into<String>) -> Self {
        self.declaring = Some(path.into());
        self
    }

    /// Rust type of a handler: `Rc<dyn Fn(..) -> R>`.
    pub fn handler_type(&self) -> String {
        format!("::std::rc::Rc<{}>", self.handler_fn_type())
    }

    /// The handler's callable type, `dyn Fn(..) -> R`.
    pub fn handler_fn_type(&self) -> String {
        let args: Vec<String> = self
            .payload_params
            .iter()
            .map(ParameterModel::signature_type)
            .collect();
        let ret = match self.shape {
            EventShape::Void => String::new(),
            EventShape::Returning => self
                .return_type
                .as_ref()
                .filter(|t| !t.is_unit())
                .map(|t| format!(" -> {t}"))
                .unwrap_or_default(),
            EventShape::Async => format!(" -> {}", TypeRef::future(None)),
        };
        format!("dyn Fn({}){}", args.join(", "), ret)
    }

    pub fn add_name(&self) -> String {
        format!("add_{}", self.name)
    }

    pub fn remove_name(&self) -> String {
        format!("remove_{}", self.name)
    }
}

/// One member of an interface or class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "member")]
pub enum MemberModel {
    Property(PropertyMember),
    Method(MethodMember),
    Event(EventMember),
}

impl MemberModel {
    pub fn name(&self) -> &str {
        match self {
            MemberModel::Property(p) => &p.name,
            MemberModel::Method(m) => &m.name,
            MemberModel::Event(e) => &e.name,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            MemberModel::Property(p) => p.modifiers,
            MemberModel::Method(m) => m.modifiers,
            MemberModel::Event(e) => e.modifiers,
        }
    }

    pub fn accessibility(&self) -> Accessibility {
        match self {
            MemberModel::Property(p) => p.accessibility,
            MemberModel::Method(m) => m.accessibility,
            MemberModel::Event(e) => e.accessibility,
        }
    }

    /// Declaring trait, falling back to `owner`.
    pub fn declaring_or<'a>(&'a self, owner: &'a str) -> &'a str {
        let declaring = match self {
            MemberModel::Property(p) => p.declaring.as_deref(),
            MemberModel::Method(m) => m.declaring.as_deref(),
            MemberModel::Event(e) => e.declaring.as_deref(),
        };
        declaring.unwrap_or(owner)
    }

    /// Names of the Rust functions this member occupies in its trait.
    pub fn fn_names(&self) -> Vec<String> {
        match self {
            MemberModel::Property(p) => {
                let mut names = Vec::new();
                if p.has_getter {
                    names.push(p.name.clone());
                }
                if p.has_setter {
                    names.push(p.setter_name());
                }
                names
            }
            MemberModel::Method(m) => vec![m.name.clone()],
            MemberModel::Event(e) => vec![e.add_name(), e.remove_name()],
        }
    }

    pub fn as_method(&self) -> Option<&MethodMember> {
        match self {
            MemberModel::Method(m) => Some(m),
            _ => None,
        }
    }
}

impl From<PropertyMember> for MemberModel {
    fn from(p: PropertyMember) -> Self {
        MemberModel::Property(p)
    }
}

impl From<MethodMember> for MemberModel {
    fn from(m: MethodMember) -> Self {
        MemberModel::Method(m)
    }
}

impl From<EventMember> for MemberModel {
    fn from(e: EventMember) -> Self {
        MemberModel::Event(e)
    }
}
