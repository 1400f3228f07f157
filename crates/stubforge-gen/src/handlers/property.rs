//! Property and indexer interceptors.

use stubforge_core::{PropertyMember, TypeRef};

use super::{
    Backing, CallbackSlot, HandlerSynthesizer, InterceptorDef, InterceptorKind, SlotKind,
    TrackingField,
};
use crate::naming;

impl HandlerSynthesizer<'_> {
    /// Interceptor for a property or indexer.
    ///
    /// Counters and slots exist only for accessors the member actually has.
    /// Indexers additionally record keys and own a key/value backing map.
    pub fn property(&self, property: &PropertyMember) -> InterceptorDef {
        let field = naming::interceptor_field_name(&property.name, None);
        let keys = &property.index_params;
        let mut tracking = Vec::new();
        let mut slots = Vec::new();

        if property.has_getter {
            tracking.push(TrackingField::GetCount);
        }
        if property.has_setter {
            tracking.push(TrackingField::SetCount);
            tracking.push(TrackingField::LastSetValue(property.ty.clone()));
        }

        if property.is_indexer {
            if property.has_getter {
                tracking.push(TrackingField::LastGetKey(keys.clone()));
            }
            if property.has_setter {
                tracking.push(TrackingField::LastSetEntry {
                    keys: keys.clone(),
                    value: property.ty.clone(),
                });
            }
        }

        if property.has_getter {
            slots.push(CallbackSlot {
                kind: SlotKind::OnGet,
                params: keys.clone(),
                returns: property.ty.clone(),
            });
        }
        if property.has_setter {
            let mut params = keys.clone();
            params.push(stubforge_core::ParameterModel::new("value", property.ty.clone()));
            slots.push(CallbackSlot {
                kind: SlotKind::OnSet,
                params,
                returns: TypeRef::Unit,
            });
        }

        let backing = if property.is_indexer {
            Backing::Index {
                keys: keys.clone(),
                value: property.ty.clone(),
            }
        } else {
            Backing::Value(property.ty.clone())
        };

        InterceptorDef {
            type_name: self.type_name(&field),
            field,
            member: property.name.clone(),
            kind: if property.is_indexer {
                InterceptorKind::Indexer
            } else {
                InterceptorKind::Property
            },
            overload: None,
            type_params: Vec::new(),
            tracking,
            slots,
            backing: Some(backing),
            event: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubforge_core::{ParameterModel, PassingMode, Primitive};

    fn synth() -> HandlerSynthesizer<'static> {
        HandlerSynthesizer::new("Person", "Interceptor")
    }

    fn names(def: &InterceptorDef) -> Vec<&'static str> {
        def.tracking.iter().map(TrackingField::name).collect()
    }

    #[test]
    fn read_write_property() {
        let prop = PropertyMember::new("name", TypeRef::text()).with_setter();
        let def = synth().property(&prop);
        assert_eq!(def.type_name, "PersonNameInterceptor");
        assert_eq!(def.kind, InterceptorKind::Property);
        assert_eq!(names(&def), vec!["get_count", "set_count", "last_set_value"]);
        assert!(def.slot(SlotKind::OnGet).is_some());
        let on_set = def.slot(SlotKind::OnSet).unwrap();
        assert_eq!(on_set.params.len(), 1);
        assert_eq!(def.backing, Some(Backing::Value(TypeRef::text())));
    }

    #[test]
    fn read_only_property_has_no_setter_state() {
        let def = synth().property(&PropertyMember::new("age", TypeRef::Primitive(Primitive::U8)));
        assert_eq!(names(&def), vec!["get_count"]);
        assert!(def.slot(SlotKind::OnSet).is_none());
    }

    #[test]
    fn write_only_property_has_no_getter_state() {
        let def = synth().property(&PropertyMember::new("sink", TypeRef::text()).write_only());
        assert_eq!(names(&def), vec!["set_count", "last_set_value"]);
        assert!(def.slot(SlotKind::OnGet).is_none());
    }

    #[test]
    fn indexer_tracks_keys_and_entries() {
        let prop = PropertyMember::indexer(
            "item",
            TypeRef::Primitive(Primitive::I32),
            vec![ParameterModel::new("key", TypeRef::text()).with_mode(PassingMode::In)],
        )
        .with_setter();
        let def = synth().property(&prop);
        assert_eq!(def.kind, InterceptorKind::Indexer);
        assert_eq!(
            names(&def),
            vec![
                "get_count",
                "set_count",
                "last_set_value",
                "last_get_key",
                "last_set_entry"
            ]
        );
        let on_get = def.slot(SlotKind::OnGet).unwrap();
        assert_eq!(on_get.params.len(), 1);
        assert_eq!(def.slot(SlotKind::OnSet).unwrap().params.len(), 2);
        assert!(matches!(def.backing, Some(Backing::Index { .. })));
    }

    #[test]
    fn multi_key_indexer_records_tuple() {
        let prop = PropertyMember::indexer(
            "cell",
            TypeRef::text(),
            vec![
                ParameterModel::new("row", TypeRef::Primitive(Primitive::U32)),
                ParameterModel::new("col", TypeRef::Primitive(Primitive::U32)),
            ],
        );
        let def = synth().property(&prop);
        let key = def
            .tracking
            .iter()
            .find(|t| t.name() == "last_get_key")
            .and_then(TrackingField::recorded_type)
            .unwrap();
        assert_eq!(key.to_string(), "(u32, u32)");
    }
}
