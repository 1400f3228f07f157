use std::env;
use std::fs;
use std::path::PathBuf;

use stubforge_core::{
    Accessibility, ClassModel, ConstraintKind, ConstructorModel, EventMember, InterfaceModel,
    MethodMember, Modifiers, ParameterModel, PassingMode, Primitive, PropertyMember, StubRequest,
    TypeParameterModel, TypeRef,
};
use stubforge_gen::Generator;

fn prim(primitive: Primitive) -> TypeRef {
    TypeRef::Primitive(primitive)
}

fn requests() -> Vec<StubRequest> {
    let pinger = InterfaceModel::new("crate::Pinger").with_member(MethodMember::new("ping"));

    let finder = InterfaceModel::new("crate::Finder")
        .with_member(
            MethodMember::new("find")
                .with_param(ParameterModel::new("id", prim(Primitive::I32)))
                .returning(TypeRef::text().nullable())
                .declared_by("crate::FindById"),
        )
        .with_member(
            MethodMember::new("find")
                .with_param(ParameterModel::new("name", TypeRef::text()).with_mode(PassingMode::In))
                .returning(TypeRef::text().nullable())
                .declared_by("crate::FindByName"),
        );

    let person = InterfaceModel::new("crate::Person")
        .with_member(PropertyMember::new("name", TypeRef::text()).with_setter());

    let lookup = InterfaceModel::new("crate::Lookup")
        .with_member(PropertyMember::indexer(
            "entry",
            TypeRef::reference("crate::Connection", false),
            vec![ParameterModel::new("key", TypeRef::text())],
        ))
        .with_member(
            MethodMember::new("tags")
                .with_param(ParameterModel::new("key", TypeRef::text()))
                .returning(TypeRef::abstraction("crate::ReadOnlyList", vec![TypeRef::text()])),
        );

    let repository = InterfaceModel::new("crate::Repository").with_member(
        MethodMember::new("get")
            .with_type_param(TypeParameterModel::new("T").with_constraint(ConstraintKind::Static))
            .returning(TypeRef::Param("T".into())),
    );

    let parser = InterfaceModel::new("crate::Parser").with_member(
        MethodMember::new("try_parse")
            .with_param(ParameterModel::new("text", TypeRef::text()).with_mode(PassingMode::In))
            .with_param(ParameterModel::new("result", prim(Primitive::I32)).with_mode(PassingMode::Out))
            .returning(prim(Primitive::Bool)),
    );

    let widget = InterfaceModel::new("crate::Widget")
        .with_member(EventMember::new("closed"))
        .with_member(EventMember::new("changed").with_payload(ParameterModel::new("value", TypeRef::text())))
        .with_member(EventMember::new("loaded").asynchronous())
        .with_member(EventMember::new("validate").returning(prim(Primitive::Bool)));

    let tally = InterfaceModel::new("crate::Tally")
        .with_member(MethodMember::new("count").returning(prim(Primitive::Usize)));

    let channel = ClassModel::new("crate::Channel", "crate::Transport")
        .with_constructor(ConstructorModel::new("open").with_param(ParameterModel::new("host", TypeRef::text())))
        .with_member(
            MethodMember::new("send")
                .with_param(ParameterModel::new("bytes", prim(Primitive::I32)))
                .returning(prim(Primitive::Usize))
                .with_modifiers(Modifiers::VIRTUAL),
        )
        .with_member(
            MethodMember::new("receive")
                .returning(TypeRef::text())
                .with_modifiers(Modifiers::ABSTRACT),
        )
        .with_member(MethodMember::new("host").returning(TypeRef::text()));

    let clock = InterfaceModel::new("crate::Clock")
        .with_member(MethodMember::new("now").returning(prim(Primitive::U64)));

    vec![
        StubRequest::interfaces("PingerStub", vec![pinger]),
        StubRequest::interfaces("FinderStub", vec![finder]),
        StubRequest::interfaces("PersonStub", vec![person]),
        StubRequest::interfaces("LookupStub", vec![lookup]),
        StubRequest::interfaces("RepositoryStub", vec![repository]),
        StubRequest::interfaces("ParserStub", vec![parser]),
        StubRequest::interfaces("WidgetStub", vec![widget]),
        StubRequest::interfaces("TallyStub", vec![tally]).with_user_method(
            MethodMember::new("count")
                .returning(prim(Primitive::Usize))
                .with_accessibility(Accessibility::Private),
        ),
        StubRequest::class("ChannelStub", channel),
        StubRequest::interfaces("ClockStub", vec![clock]).inline_in("crate::suite::Suite"),
    ]
}

fn main() {
    let generator = Generator::default();
    let outcomes = generator.generate_batch(&requests());

    let mut failures = Vec::new();
    for outcome in &outcomes {
        for diagnostic in outcome.diagnostics.iter() {
            if diagnostic.is_error() {
                failures.push(format!("{}: {} {}", outcome.stub_name, diagnostic.id, diagnostic.message()));
            } else {
                println!("cargo:warning={}: {}", outcome.stub_name, diagnostic.message());
            }
        }
    }
    if !failures.is_empty() {
        panic!("stub generation failed:\n{}", failures.join("\n"));
    }

    let source = generator.source(&outcomes).expect("Unable to join generated stubs");
    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_path.join("stubs.rs"), source).expect("Couldn't write stubs!");

    println!("cargo:rerun-if-changed=build.rs");
}
