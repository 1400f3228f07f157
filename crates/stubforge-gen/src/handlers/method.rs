//! Method interceptors.

use super::{
    CallbackSlot, HandlerSynthesizer, InterceptorDef, InterceptorKind, SlotKind, TrackingField,
    recordable_params,
};
use crate::naming;
use crate::overload::{Overload, OverloadGroup};

impl HandlerSynthesizer<'_> {
    /// Interceptor for one overload of a method group.
    ///
    /// Overloaded groups get one independent interceptor per overload, named
    /// with the overload's 1-based index. A generic overload yields the
    /// per-type-argument interceptor; [`crate::generic`] wraps it in a registry.
    pub fn method(&self, group: &OverloadGroup, overload: &Overload) -> InterceptorDef {
        let method = &overload.method;
        let index = group.naming_index(overload);
        let field = naming::interceptor_field_name(&method.name, index);

        let mut tracking = vec![TrackingField::CallCount, TrackingField::WasCalled];
        let recorded = recordable_params(&method.parameters, &method.type_parameters);
        match recorded.len() {
            0 => {}
            1 => tracking.push(TrackingField::LastCallArg(recorded[0].clone())),
            _ => tracking.push(TrackingField::LastCallArgs(recorded)),
        }

        let slots = vec![CallbackSlot {
            kind: SlotKind::OnCall,
            params: method.tracked_params().cloned().collect(),
            returns: method.return_type.clone(),
        }];

        let type_name = if method.is_dispatched_generic() {
            self.typed_type_name(&field)
        } else {
            self.type_name(&field)
        };

        InterceptorDef {
            type_name,
            field,
            member: method.name.clone(),
            kind: InterceptorKind::Method,
            overload: index,
            type_params: method.type_parameters.clone(),
            tracking,
            slots,
            backing: None,
            event: None,
        }
    }
}
