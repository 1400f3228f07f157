//! Event interceptors.

use stubforge_core::{EventMember, EventShape, TypeRef};

use super::{EventSurface, HandlerSynthesizer, InterceptorDef, InterceptorKind, TrackingField};
use crate::naming;

impl HandlerSynthesizer<'_> {
    /// Interceptor for an event.
    ///
    /// Subscriptions are counted and held in a subscriber list. Raising is
    /// counted, and events with a payload also keep the last payload and the
    /// full raise history.
    pub fn event(&self, event: &EventMember) -> InterceptorDef {
        let field = naming::interceptor_field_name(&event.name, None);
        let mut tracking = vec![
            TrackingField::SubscribeCount,
            TrackingField::UnsubscribeCount,
            TrackingField::HasSubscribers,
            TrackingField::RaiseCount,
        ];
        if !event.payload_params.is_empty() {
            tracking.push(TrackingField::LastRaiseArgs(event.payload_params.clone()));
            tracking.push(TrackingField::AllRaises(event.payload_params.clone()));
        }

        let returns = match event.shape {
            EventShape::Returning => event.return_type.clone().filter(|t| !t.is_unit()),
            EventShape::Void | EventShape::Async => None,
        };

        InterceptorDef {
            type_name: self.type_name(&field),
            field,
            member: event.name.clone(),
            kind: InterceptorKind::Event,
            overload: None,
            type_params: Vec::new(),
            tracking,
            slots: Vec::new(),
            backing: None,
            event: Some(EventSurface {
                payload: event.payload_params.clone(),
                shape: event.shape,
                returns,
                handler_type: event.handler_type(),
                handler_fn: event.handler_fn_type(),
            }),
        }
    }
}

/// Type returned by the generated `raise` helper.
pub(crate) fn raise_return(surface: &EventSurface) -> Option<TypeRef> {
    surface
        .returns
        .as_ref()
        .map(|ty| TypeRef::Nullable(Box::new(ty.clone())))
}
