//! Facade tests: the generation scenarios checked on the assembled companion
//! type, and the JSON entry points end to end.

use stubforge::generator::ir::{Accessor, BundleEntry, CompanionType, FallbackStep, MemberImpl};
use stubforge::generator::{DefaultValueStrategy, ImplementationAssembler};
use stubforge::prelude::*;

fn int() -> TypeRef {
    TypeRef::Primitive(Primitive::I32)
}

fn assemble(request: &StubRequest) -> CompanionType {
    let options = GeneratorOptions::default();
    let mut diagnostics = Diagnostics::new();
    let companion = Generator::new(options.clone())
        .unwrap()
        .assemble(request, &mut diagnostics);
    assert!(!diagnostics.has_errors(), "{diagnostics}");
    let direct = ImplementationAssembler::new(&options).assemble(request, &mut Diagnostics::new());
    assert_eq!(companion, direct);
    companion.expect("companion type")
}

fn member<'a>(companion: &'a CompanionType, fn_name: &'a str) -> &'a MemberImpl {
    companion
        .members_named(fn_name)
        .next()
        .unwrap_or_else(|| panic!("no member {fn_name}"))
}

fn plain<'a>(companion: &'a CompanionType, bundle: &str, field: &str) -> &'a stubforge::generator::InterceptorDef {
    match companion.bundle(bundle).and_then(|b| b.entry(field)) {
        Some(BundleEntry::Plain(def)) => def,
        other => panic!("expected plain interceptor {bundle}.{field}, got {other:?}"),
    }
}

// =============================================================================
// Scenario A: zero-argument void method
// =============================================================================

#[test]
fn scenario_a_void_method_counts_calls() {
    let pinger = InterfaceModel::new("crate::Pinger").with_member(MethodMember::new("ping"));
    let companion = assemble(&StubRequest::interfaces("PingerStub", vec![pinger]));

    let def = plain(&companion, "pinger", "ping");
    assert!(def.has_tracking("call_count"));
    assert!(def.has_tracking("was_called"));

    let ping = member(&companion, "ping");
    assert_eq!(ping.accessor, Accessor::Call);
    assert_eq!(
        ping.chain,
        vec![
            FallbackStep::Record,
            FallbackStep::Override,
            FallbackStep::Default(DefaultValueStrategy::UseTypeDefault),
        ]
    );
}

// =============================================================================
// Scenario B: overloads get independent interceptors
// =============================================================================

#[test]
fn scenario_b_overloads_are_independent() {
    let finder = InterfaceModel::new("crate::Finder")
        .with_member(
            MethodMember::new("find")
                .with_param(ParameterModel::new("id", int()))
                .returning(TypeRef::text().nullable())
                .declared_by("crate::FindById"),
        )
        .with_member(
            MethodMember::new("find")
                .with_param(ParameterModel::new("name", TypeRef::text()).with_mode(PassingMode::In))
                .returning(TypeRef::text().nullable())
                .declared_by("crate::FindByName"),
        );
    let companion = assemble(&StubRequest::interfaces("FinderStub", vec![finder]));

    let by_id = plain(&companion, "finder", "find1");
    let by_name = plain(&companion, "finder", "find2");
    assert_ne!(by_id.type_name, by_name.type_name);

    let routes: Vec<_> = companion
        .members_named("find")
        .map(|m| m.interceptor.as_ref().map(|i| i.field.as_str()))
        .collect();
    assert_eq!(routes, vec![Some("find1"), Some("find2")]);
    assert!(companion.trait_impl("crate::FindByName").is_some());
}

// =============================================================================
// Scenario C: read/write property
// =============================================================================

#[test]
fn scenario_c_property_getter_reads_what_setter_stored() {
    let person = InterfaceModel::new("crate::Person")
        .with_member(PropertyMember::new("name", TypeRef::text()).with_setter());
    let companion = assemble(&StubRequest::interfaces("PersonStub", vec![person]));

    let def = plain(&companion, "person", "name");
    assert!(def.has_tracking("last_set_value"));
    assert!(def.backing.is_some());

    assert_eq!(
        member(&companion, "name").chain,
        vec![
            FallbackStep::Record,
            FallbackStep::Override,
            FallbackStep::BackingLookup,
            FallbackStep::Default(DefaultValueStrategy::UseTypeDefault),
        ]
    );
    let setter = member(&companion, "set_name");
    assert_eq!(setter.accessor, Accessor::Setter);
    assert_eq!(setter.terminal(), Some(&FallbackStep::BackingStore));
}

// =============================================================================
// Scenario D: indexers with and without a safe default
// =============================================================================

#[test]
fn scenario_d_indexer_defaults() {
    let key = || vec![ParameterModel::new("key", TypeRef::text())];
    let lookup = InterfaceModel::new("crate::Lookup")
        .with_member(PropertyMember::indexer(
            "entry",
            TypeRef::reference("crate::Connection", false),
            key(),
        ))
        .with_member(PropertyMember::indexer(
            "tags",
            TypeRef::abstraction("ReadOnlyList", vec![TypeRef::text()]),
            key(),
        ));
    let companion = assemble(&StubRequest::interfaces("LookupStub", vec![lookup]));

    let entry = member(&companion, "entry");
    assert_eq!(
        entry.terminal(),
        Some(&FallbackStep::Default(DefaultValueStrategy::Unresolvable))
    );
    assert!(entry.hint.contains("insert"));

    let tags = member(&companion, "tags");
    assert!(matches!(
        tags.terminal(),
        Some(FallbackStep::Default(DefaultValueStrategy::ConstructConcrete(_)))
    ));
    assert!(tags.has_step(&FallbackStep::BackingLookup));
}

// =============================================================================
// Scenario E: generic method dispatch
// =============================================================================

#[test]
fn scenario_e_generic_method_uses_registry_and_runtime_defaults() {
    let repository = InterfaceModel::new("crate::Repository").with_member(
        MethodMember::new("get")
            .with_type_param(TypeParameterModel::new("T").with_constraint(ConstraintKind::Static))
            .returning(TypeRef::Param("T".into())),
    );
    let companion = assemble(&StubRequest::interfaces("RepoStub", vec![repository]));

    let Some(BundleEntry::Generic(dispatch)) = companion.bundle("repository").and_then(|b| b.entry("get")) else {
        panic!("expected a generic registry");
    };
    assert_eq!(dispatch.type_name, "RepositoryGetInterceptor");
    assert_eq!(dispatch.nested.type_name, "RepositoryGetTypedInterceptor");

    let get = member(&companion, "get");
    assert!(get.interceptor.as_ref().is_some_and(|i| i.generic));
    assert_eq!(get.terminal(), Some(&FallbackStep::RuntimeDefault));
    assert!(companion.runtime_defaults.is_some());
}

// =============================================================================
// Scenario F: events
// =============================================================================

#[test]
fn scenario_f_event_subscriptions_are_managed() {
    let widget = InterfaceModel::new("crate::Widget").with_member(EventMember::new("closed"));
    let companion = assemble(&StubRequest::interfaces("WidgetStub", vec![widget]));

    let def = plain(&companion, "widget", "closed");
    assert!(def.has_tracking("raise_count"));
    assert!(def.has_tracking("has_subscribers"));

    let add = member(&companion, "add_closed");
    assert_eq!(add.accessor, Accessor::Subscribe);
    assert_eq!(add.chain, vec![FallbackStep::Record, FallbackStep::ManageSubscribers]);
    assert_eq!(member(&companion, "remove_closed").accessor, Accessor::Unsubscribe);
}

// =============================================================================
// Entry points
// =============================================================================

#[test]
fn json_batch_generates_one_source() {
    let requests = r#"[
        {
            "stub_name": "PingerStub",
            "target": {
                "kind": "interfaces",
                "of": [{
                    "full_name": "crate::Pinger",
                    "simple_name": "Pinger",
                    "members": [{ "member": "method", "name": "ping" }]
                }]
            }
        },
        {
            "stub_name": "LockedStub",
            "target": {
                "kind": "class",
                "of": {
                    "full_name": "crate::Locked",
                    "simple_name": "Locked",
                    "surface": "crate::Lock",
                    "modifiers": "SEALED"
                }
            }
        }
    ]"#;
    let (source, outcomes) = stubforge::generate_from_json(requests, Some(r#"{"emit_docs": false}"#)).unwrap();
    assert!(outcomes[0].is_generated());
    assert!(!outcomes[1].is_generated());
    assert!(outcomes[1].diagnostics.contains("SF0002"));
    let file = syn::parse_file(&source).unwrap();
    assert!(!file.items.is_empty());
    assert!(!source.contains("LockedStub"));
}

#[test]
fn malformed_inputs_are_errors() {
    assert!(matches!(
        stubforge::generate_from_json("not json", None),
        Err(StubforgeError::Model(_))
    ));
    assert!(matches!(
        stubforge::generate_from_json("[]", Some(r#"{"runtime_path": "::"}"#)),
        Err(StubforgeError::Config(_))
    ));
}

#[test]
fn tracing_init_is_repeatable() {
    let first = stubforge::tracing_config::init_tracing();
    let second = stubforge::tracing_config::init_tracing();
    assert!(!(first && second));
}
