//! End-to-end generation: requests in, parseable Rust out.

use stubforge_core::{
    Accessibility, ClassModel, ConstraintKind, ConstructorModel, EventMember, InterfaceModel,
    MethodMember, Modifiers, ParameterModel, PassingMode, Primitive, PropertyMember, StubRequest,
    TypeParameterModel, TypeRef,
};
use stubforge_gen::{Generator, GeneratorOptions};

fn int() -> TypeRef {
    TypeRef::Primitive(Primitive::I32)
}

fn parse(code: &str) -> syn::File {
    syn::parse_file(code).unwrap_or_else(|err| panic!("generated code does not parse: {err}\n{code}"))
}

fn struct_names(file: &syn::File) -> Vec<String> {
    let mut names = Vec::new();
    for item in &file.items {
        match item {
            syn::Item::Struct(s) => names.push(s.ident.to_string()),
            syn::Item::Mod(m) => {
                if let Some((_, items)) = &m.content {
                    names.extend(items.iter().filter_map(|i| match i {
                        syn::Item::Struct(s) => Some(s.ident.to_string()),
                        _ => None,
                    }));
                }
            }
            _ => {}
        }
    }
    names
}

fn trait_impls(file: &syn::File) -> Vec<String> {
    file.items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Impl(i) => i.trait_.as_ref().map(|(_, path, _)| {
                path.segments.last().map(|s| s.ident.to_string()).unwrap_or_default()
            }),
            _ => None,
        })
        .collect()
}

fn generate(request: &StubRequest) -> syn::File {
    let outcome = Generator::default().generate(request);
    assert!(
        !outcome.diagnostics.has_errors(),
        "unexpected diagnostics: {}",
        outcome.diagnostics
    );
    parse(&outcome.code.expect("code"))
}

#[test]
fn interface_stub_has_bundle_per_interface() {
    let store = InterfaceModel::new("crate::store::Store")
        .with_member(
            MethodMember::new("find")
                .with_param(ParameterModel::new("id", int()))
                .returning(TypeRef::text().nullable()),
        )
        .with_member(
            MethodMember::new("find")
                .with_param(ParameterModel::new("name", TypeRef::text()).with_mode(PassingMode::In))
                .returning(TypeRef::text().nullable())
                .declared_by("crate::store::FindByName"),
        )
        .with_member(PropertyMember::new("name", TypeRef::text()).with_setter());
    let closer = InterfaceModel::new("crate::io::Close").with_member(MethodMember::new("close"));

    let file = generate(&StubRequest::interfaces("StoreStub", vec![store, closer]));
    let structs = struct_names(&file);
    for expected in [
        "StoreStub",
        "StoreInterceptors",
        "StoreFind1Interceptor",
        "StoreFind2Interceptor",
        "StoreNameInterceptor",
        "CloseInterceptors",
        "CloseCloseInterceptor",
    ] {
        assert!(structs.iter().any(|s| s == expected), "missing {expected} in {structs:?}");
    }
    assert_eq!(trait_impls(&file), vec!["Default", "Store", "FindByName", "Close"]);
}

#[test]
fn overloads_in_one_trait_are_rejected() {
    let store = InterfaceModel::new("crate::Store")
        .with_member(MethodMember::new("find").with_param(ParameterModel::new("id", int())))
        .with_member(MethodMember::new("find").with_param(ParameterModel::new("name", TypeRef::text())));
    let outcome = Generator::default().generate(&StubRequest::interfaces("StoreStub", vec![store]));
    assert!(outcome.code.is_none());
    assert!(outcome.diagnostics.contains("SF0008"));
}

#[test]
fn class_stub_wraps_base_and_forwards_constructors() {
    let class = ClassModel::new("crate::net::Connection", "crate::net::Transport")
        .with_constructor(
            ConstructorModel::new("connect").with_param(ParameterModel::new("host", TypeRef::text())),
        )
        .with_constructor(ConstructorModel::new("hidden").with_accessibility(Accessibility::Private))
        .with_member(
            MethodMember::new("send")
                .with_param(ParameterModel::new("bytes", int()))
                .with_modifiers(Modifiers::VIRTUAL),
        )
        .with_member(
            MethodMember::new("receive")
                .returning(TypeRef::text())
                .with_modifiers(Modifiers::ABSTRACT),
        );
    let file = generate(&StubRequest::class("ConnectionStub", class));
    let text = quote::ToTokens::to_token_stream(&file).to_string();
    assert!(text.contains("pub fn connect"));
    assert!(!text.contains("pub fn hidden"));
    assert!(text.contains("pub fn from_base"));
    assert!(text.contains("pub fn reset_interceptors"));
    assert!(trait_impls(&file).contains(&"Deref".to_string()));
    assert!(trait_impls(&file).contains(&"Transport".to_string()));
}

#[test]
fn generic_and_event_members_render() {
    let repo = InterfaceModel::new("crate::Repository")
        .with_member(
            MethodMember::new("get")
                .with_type_param(TypeParameterModel::new("T").with_constraint(ConstraintKind::Static))
                .returning(TypeRef::Param("T".into())),
        )
        .with_member(
            EventMember::new("changed").with_payload(ParameterModel::new("value", TypeRef::text())),
        )
        .with_member(EventMember::new("loaded").asynchronous());
    let file = generate(&StubRequest::interfaces("RepoStub", vec![repo]));
    let structs = struct_names(&file);
    assert!(structs.contains(&"RepositoryGetInterceptor".to_string()));
    assert!(structs.contains(&"RepositoryGetTypedInterceptor".to_string()));
    assert!(structs.contains(&"RepositoryChangedInterceptor".to_string()));
    let text = quote::ToTokens::to_token_stream(&file).to_string();
    assert!(text.contains("runtime_defaults"));
    assert!(text.contains("raise_async"));
}

#[test]
fn non_static_generic_is_rejected() {
    let repo = InterfaceModel::new("crate::Repository").with_member(
        MethodMember::new("get")
            .with_type_param(TypeParameterModel::new("T"))
            .returning(TypeRef::Param("T".into())),
    );
    let outcome = Generator::default().generate(&StubRequest::interfaces("RepoStub", vec![repo]));
    assert!(outcome.diagnostics.contains("SF0007"));
}

#[test]
fn private_user_method_replaces_default() {
    let store = InterfaceModel::new("crate::Store").with_member(
        MethodMember::new("count").returning(TypeRef::Primitive(Primitive::Usize)),
    );
    let request = StubRequest::interfaces("StoreStub", vec![store]).with_user_method(
        MethodMember::new("count")
            .returning(TypeRef::Primitive(Primitive::Usize))
            .with_accessibility(Accessibility::Private),
    );
    let file = generate(&request);
    let text = quote::ToTokens::to_token_stream(&file).to_string();
    assert!(text.contains("Self :: count (self)"));
}

#[test]
fn request_and_options_load_from_json() {
    let request = StubRequest::from_json(
        r#"{
            "stub_name": "PingerStub",
            "target": {
                "kind": "interfaces",
                "of": [{
                    "full_name": "crate::Pinger",
                    "simple_name": "Pinger",
                    "members": [{ "member": "method", "name": "ping" }]
                }]
            }
        }"#,
    )
    .unwrap();
    let options = GeneratorOptions::from_json(r#"{ "emit_docs": false, "runtime_path": "crate::rt" }"#).unwrap();
    let outcome = Generator::new(options).unwrap().generate(&request);
    let code = outcome.code.unwrap();
    parse(&code);
    assert!(code.contains("crate :: rt :: Counter"));
    assert!(!code.contains("doc"));
}

#[test]
fn batch_output_joins_into_one_file() {
    let pinger = InterfaceModel::new("crate::Pinger").with_member(MethodMember::new("ping"));
    let requests: Vec<_> = (0..8)
        .map(|i| {
            let request = StubRequest::interfaces(format!("Stub{i}"), vec![pinger.clone()]);
            if i % 2 == 0 { request.inline_in("crate::tests::Suite") } else { request }
        })
        .collect();
    let generator = Generator::default();
    let outcomes = generator.generate_batch(&requests);
    assert!(outcomes.iter().all(|o| o.is_generated()));
    let file = parse(&generator.source(&outcomes).unwrap());
    let modules = file
        .items
        .iter()
        .filter(|i| matches!(i, syn::Item::Mod(m) if m.ident == "suite_stubs"))
        .count();
    assert_eq!(modules, 1);
}
