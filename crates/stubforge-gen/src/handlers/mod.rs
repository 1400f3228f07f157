//! Interceptor synthesis.
//!
//! The [`HandlerSynthesizer`] derives one [`InterceptorDef`] per property,
//! indexer, method overload and event. A definition lists exactly the tracking
//! state, override slots and backing storage its member needs; the renderer
//! turns it into a struct plus accessor methods.
//!
//! ## Components
//!
//! - [`property`] - properties and indexers
//! - [`method`] - methods, one interceptor per overload
//! - [`event`] - events, subscriber lists and raise helpers

mod event;
mod method;
mod property;

pub(crate) use event::raise_return;

use stubforge_core::{EventShape, ParameterModel, PassingMode, TypeParameterModel, TypeRef};

use crate::naming;

/// What kind of member an interceptor serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterceptorKind {
    Property,
    Indexer,
    Method,
    Event,
}

/// One piece of recorded state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingField {
    GetCount,
    SetCount,
    /// Last value passed to the setter.
    LastSetValue(TypeRef),
    /// Last index key passed to the getter, tupled when there are several.
    LastGetKey(Vec<ParameterModel>),
    /// Last `(keys.., value)` passed to the setter.
    LastSetEntry {
        keys: Vec<ParameterModel>,
        value: TypeRef,
    },
    CallCount,
    /// Derived from [`TrackingField::CallCount`]; no storage of its own.
    WasCalled,
    /// The single tracked argument of the last call.
    LastCallArg(ParameterModel),
    /// All tracked arguments of the last call, as a tuple.
    LastCallArgs(Vec<ParameterModel>),
    SubscribeCount,
    UnsubscribeCount,
    /// Derived from the subscriber list.
    HasSubscribers,
    RaiseCount,
    /// Payload of the last raise, tupled when there are several parameters.
    LastRaiseArgs(Vec<ParameterModel>),
    /// Payload of every raise.
    AllRaises(Vec<ParameterModel>),
}

impl TrackingField {
    /// Name of the struct field and of its public accessor.
    pub fn name(&self) -> &'static str {
        match self {
            TrackingField::GetCount => "get_count",
            TrackingField::SetCount => "set_count",
            TrackingField::LastSetValue(_) => "last_set_value",
            TrackingField::LastGetKey(_) => "last_get_key",
            TrackingField::LastSetEntry { .. } => "last_set_entry",
            TrackingField::CallCount => "call_count",
            TrackingField::WasCalled => "was_called",
            TrackingField::LastCallArg(_) => "last_call_arg",
            TrackingField::LastCallArgs(_) => "last_call_args",
            TrackingField::SubscribeCount => "subscribe_count",
            TrackingField::UnsubscribeCount => "unsubscribe_count",
            TrackingField::HasSubscribers => "has_subscribers",
            TrackingField::RaiseCount => "raise_count",
            TrackingField::LastRaiseArgs(_) => "last_raise_args",
            TrackingField::AllRaises(_) => "all_raises",
        }
    }

    /// Whether the field is a counter.
    pub fn is_counter(&self) -> bool {
        matches!(
            self,
            TrackingField::GetCount
                | TrackingField::SetCount
                | TrackingField::CallCount
                | TrackingField::SubscribeCount
                | TrackingField::UnsubscribeCount
                | TrackingField::RaiseCount
        )
    }

    /// Whether the field is computed from other state rather than stored.
    pub fn is_derived(&self) -> bool {
        matches!(self, TrackingField::WasCalled | TrackingField::HasSubscribers)
    }

    /// Owned type of a recorded value, for value-recording fields.
    pub fn recorded_type(&self) -> Option<TypeRef> {
        match self {
            TrackingField::LastSetValue(ty) => Some(ty.clone()),
            TrackingField::LastGetKey(keys) => Some(owned_tuple(keys)),
            TrackingField::LastSetEntry { keys, value } => {
                let mut items: Vec<TypeRef> = keys.iter().map(|k| k.ty.clone()).collect();
                items.push(value.clone());
                Some(TypeRef::Tuple(items))
            }
            TrackingField::LastCallArg(param) => Some(param.ty.clone()),
            TrackingField::LastCallArgs(params)
            | TrackingField::LastRaiseArgs(params)
            | TrackingField::AllRaises(params) => Some(owned_tuple(params)),
            _ => None,
        }
    }
}

/// Owned type of a parameter list: the single type, or a tuple.
pub fn owned_tuple(params: &[ParameterModel]) -> TypeRef {
    match params {
        [single] => single.ty.clone(),
        many => TypeRef::Tuple(many.iter().map(|p| p.ty.clone()).collect()),
    }
}

/// Which override slot a callback fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    OnGet,
    OnSet,
    OnCall,
}

impl SlotKind {
    pub fn name(self) -> &'static str {
        match self {
            SlotKind::OnGet => "on_get",
            SlotKind::OnSet => "on_set",
            SlotKind::OnCall => "on_call",
        }
    }
}

/// An override slot typed `Fn(&Owner, params..) -> returns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackSlot {
    pub kind: SlotKind,
    /// Parameters passed after the owning stub, with their passing modes.
    pub params: Vec<ParameterModel>,
    pub returns: TypeRef,
}

/// Storage consulted by getters before the default strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backing {
    /// A single value, for properties.
    Value(TypeRef),
    /// A key/value map, for indexers.
    Index {
        keys: Vec<ParameterModel>,
        value: TypeRef,
    },
}

/// Subscriber list and raise helper of an event interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSurface {
    pub payload: Vec<ParameterModel>,
    pub shape: EventShape,
    pub returns: Option<TypeRef>,
    /// Handler type, `Rc<dyn Fn(..) -> R>`.
    pub handler_type: String,
    /// Callable held by the subscriber list, `dyn Fn(..) -> R`.
    pub handler_fn: String,
}

/// Everything the renderer needs to emit one interceptor type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorDef {
    /// Field name in the bundle.
    pub field: String,
    pub type_name: String,
    /// Member name as declared.
    pub member: String,
    pub kind: InterceptorKind,
    /// 1-based overload index when the member is overloaded.
    pub overload: Option<usize>,
    /// Generic parameters of a per-type-argument interceptor.
    pub type_params: Vec<TypeParameterModel>,
    pub tracking: Vec<TrackingField>,
    pub slots: Vec<CallbackSlot>,
    pub backing: Option<Backing>,
    pub event: Option<EventSurface>,
}

impl InterceptorDef {
    pub fn has_tracking(&self, name: &str) -> bool {
        self.tracking.iter().any(|t| t.name() == name)
    }

    pub fn slot(&self, kind: SlotKind) -> Option<&CallbackSlot> {
        self.slots.iter().find(|s| s.kind == kind)
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

/// Derives interceptor definitions for the members of one interface.
#[derive(Debug, Clone, Copy)]
pub struct HandlerSynthesizer<'a> {
    interface_simple: &'a str,
    suffix: &'a str,
}

impl<'a> HandlerSynthesizer<'a> {
    pub fn new(interface_simple: &'a str, suffix: &'a str) -> Self {
        Self {
            interface_simple,
            suffix,
        }
    }

    fn type_name(&self, field: &str) -> String {
        naming::interceptor_type_name(self.interface_simple, field, self.suffix)
    }

    fn typed_type_name(&self, field: &str) -> String {
        naming::typed_interceptor_type_name(self.interface_simple, field, self.suffix)
    }
}

/// Parameters whose values are recorded: everything but `Out`, minus values of
/// type parameters that are not known to be `Clone`.
pub(crate) fn recordable_params(
    params: &[ParameterModel],
    type_params: &[TypeParameterModel],
) -> Vec<ParameterModel> {
    params
        .iter()
        .filter(|p| p.mode != PassingMode::Out)
        .filter(|p| {
            type_params
                .iter()
                .filter(|tp| p.ty.mentions_param(&tp.name))
                .all(TypeParameterModel::is_cloneable)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubforge_core::{ConstraintKind, Primitive};

    #[test]
    fn owned_tuple_of_one_is_the_type() {
        let params = vec![ParameterModel::new("k", TypeRef::text()).with_mode(PassingMode::In)];
        assert_eq!(owned_tuple(&params), TypeRef::text());
    }

    #[test]
    fn owned_tuple_of_many_is_a_tuple() {
        let params = vec![
            ParameterModel::new("a", TypeRef::text()),
            ParameterModel::new("b", TypeRef::Primitive(Primitive::U8)),
        ];
        assert_eq!(owned_tuple(&params).to_string(), "(String, u8)");
    }

    #[test]
    fn last_set_entry_type_appends_value() {
        let field = TrackingField::LastSetEntry {
            keys: vec![ParameterModel::new("k", TypeRef::text())],
            value: TypeRef::Primitive(Primitive::I32),
        };
        assert_eq!(field.recorded_type().unwrap().to_string(), "(String, i32)");
    }

    #[test]
    fn recordable_params_skip_out_and_uncloneable_generics() {
        let type_params = vec![
            TypeParameterModel::new("T").with_constraint(ConstraintKind::Static),
            TypeParameterModel::new("U").with_constraint(ConstraintKind::Bound("Clone".into())),
        ];
        let params = vec![
            ParameterModel::new("t", TypeRef::Param("T".into())),
            ParameterModel::new("u", TypeRef::Param("U".into())),
            ParameterModel::new("o", TypeRef::text()).with_mode(PassingMode::Out),
            ParameterModel::new("s", TypeRef::text()).with_mode(PassingMode::In),
        ];
        let names: Vec<_> = recordable_params(&params, &type_params)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["u", "s"]);
    }

    #[test]
    fn derived_and_counter_fields() {
        assert!(TrackingField::WasCalled.is_derived());
        assert!(TrackingField::HasSubscribers.is_derived());
        assert!(TrackingField::RaiseCount.is_counter());
        assert!(!TrackingField::LastCallArg(ParameterModel::new("x", TypeRef::Unit)).is_counter());
    }
}
