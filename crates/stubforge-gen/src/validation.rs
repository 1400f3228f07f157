//! Generation-time validation.
//!
//! Runs before assembly and reports every problem it finds through the
//! diagnostics channel instead of stopping at the first. Any error skips the
//! unit; warnings are carried into the outcome.

use rustc_hash::{FxHashMap, FxHashSet};
use stubforge_core::diagnostics::{Diagnostics, descriptors};
use stubforge_core::{
    ClassModel, ConstraintKind, EventMember, MemberModel, MethodMember, Modifiers, ParameterModel,
    PassingMode, Placement, PropertyMember, StubRequest, StubTarget, TypeRef,
};

use crate::assembler::{MemberIdentity, collect_members};
use crate::naming;
use crate::overload::group_overloads;

/// Validate `request`, reporting into `diagnostics`.
///
/// Returns `true` when no error was reported.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn validate(request: &StubRequest, diagnostics: &mut Diagnostics) -> bool {
    let errors_before = diagnostics.error_count();
    RequestValidator {
        request,
        diagnostics,
    }
    .run();
    diagnostics.error_count() == errors_before
}

struct RequestValidator<'r> {
    request: &'r StubRequest,
    diagnostics: &'r mut Diagnostics,
}

impl RequestValidator<'_> {
    fn run(&mut self) {
        let request = self.request;
        if !naming::is_valid_ident(&request.stub_name) || naming::is_keyword(&request.stub_name) {
            self.diagnostics
                .report(&descriptors::RESERVED_NAME, [request.stub_name.as_str(), "stub type name"]);
        }
        if let Placement::Inline { owner } = &request.placement {
            self.check_path(owner, &request.stub_name);
        }

        match &request.target {
            StubTarget::Interfaces(interfaces) if interfaces.is_empty() => {
                self.diagnostics
                    .report(&descriptors::NOT_STUBBABLE, [request.stub_name.as_str()]);
            }
            StubTarget::Interfaces(interfaces) => {
                let mut seen = FxHashSet::default();
                let mut sources = Vec::new();
                for interface in interfaces {
                    self.check_path(&interface.full_name, &request.stub_name);
                    for member in &interface.members {
                        let declaring = interface.declaring_of(member);
                        if declaring != interface.full_name {
                            self.check_path(declaring, &interface.full_name);
                        }
                        self.check_member(member, &interface.simple_name);
                    }
                    let members: Vec<_> = interface
                        .members
                        .iter()
                        .filter(|m| {
                            let declaring = interface.declaring_of(m).to_string();
                            seen.insert((declaring, MemberIdentity::of(m)))
                        })
                        .collect();
                    self.check_overloads(&interface.full_name, members.iter().copied());
                    sources.extend(members.into_iter().map(|m| (interface.declaring_of(m), m)));
                }
                self.check_duplicates(sources);
            }
            StubTarget::Class(class) => self.check_class(class),
        }

        self.check_user_methods();
    }

    fn check_class(&mut self, class: &ClassModel) {
        let request = self.request;
        if class.surface.is_empty() {
            self.diagnostics
                .report(&descriptors::NOT_STUBBABLE, [class.full_name.as_str()]);
            return;
        }
        if !class.is_stubbable() {
            self.diagnostics
                .report(&descriptors::SEALED_OR_STATIC, [class.full_name.as_str()]);
        }
        if !class.constructors.is_empty() && class.accessible_constructors().next().is_none() {
            self.diagnostics
                .report(&descriptors::NO_ACCESSIBLE_CONSTRUCTOR, [class.full_name.as_str()]);
        }
        for ctor in class.accessible_constructors() {
            if !naming::is_valid_ident(&ctor.name) {
                self.diagnostics
                    .report(&descriptors::RESERVED_NAME, [ctor.name.as_str(), "constructor name"]);
            }
            self.check_params(&ctor.parameters, &naming::qualified_member(&class.simple_name, &ctor.name));
        }

        for level in class.chain() {
            self.check_path(&level.full_name, &request.stub_name);
            self.check_path(&level.surface, &level.full_name);
            for member in &level.members {
                self.check_member(member, &level.simple_name);
            }
        }

        let members = collect_members(class);
        self.check_overloads(&class.full_name, members.iter().map(|m| m.member));
        self.check_duplicates(members.iter().map(|m| (m.declaring.as_str(), m.member)));
    }

    fn check_member(&mut self, member: &MemberModel, owner: &str) {
        let qualified = naming::qualified_member(owner, member.name());
        if !naming::is_valid_ident(member.name()) {
            self.diagnostics
                .report(&descriptors::RESERVED_NAME, [member.name(), "member name"]);
        }
        if member.modifiers().contains(Modifiers::STATIC) {
            self.unsupported(&qualified, "static members have no receiver to intercept");
        }
        match member {
            MemberModel::Property(p) => self.check_property(p, &qualified),
            MemberModel::Method(m) => self.check_method(m, &qualified),
            MemberModel::Event(e) => self.check_event(e, &qualified),
        }
    }

    fn check_property(&mut self, property: &PropertyMember, qualified: &str) {
        if !property.has_getter && !property.has_setter {
            self.unsupported(qualified, "property has neither a getter nor a setter");
        }
        if property.is_indexer && property.index_params.is_empty() {
            self.unsupported(qualified, "indexer declares no key parameters");
        }
        self.check_type(&property.ty, qualified);
        self.check_params(&property.index_params, qualified);
    }

    fn check_method(&mut self, method: &MethodMember, qualified: &str) {
        if method.is_generic && method.type_parameters.is_empty() {
            self.unsupported(qualified, "generic method declares no type parameters");
        }
        for tp in &method.type_parameters {
            if !naming::is_valid_ident(&tp.name) {
                self.diagnostics
                    .report(&descriptors::RESERVED_NAME, [tp.name.as_str(), "type parameter name"]);
            }
            if !tp.has_constraint(&ConstraintKind::Static) {
                self.diagnostics.report(
                    &descriptors::GENERIC_PARAMETER_NOT_STATIC,
                    [tp.name.as_str(), qualified],
                );
            }
            for constraint in &tp.constraints {
                if let ConstraintKind::Bound(bound) = constraint {
                    self.check_path(bound, qualified);
                }
            }
        }
        self.check_type(&method.return_type, qualified);
        self.check_params(&method.parameters, qualified);
    }

    fn check_event(&mut self, event: &EventMember, qualified: &str) {
        if event.payload_params.iter().any(|p| p.mode != PassingMode::ByValue) {
            self.unsupported(qualified, "event payload parameters must be passed by value");
        }
        if let Some(ty) = &event.return_type {
            self.check_type(ty, qualified);
        }
        self.check_params(&event.payload_params, qualified);
    }

    fn check_params(&mut self, params: &[ParameterModel], qualified: &str) {
        let mut names = FxHashSet::default();
        for param in params {
            if !naming::is_valid_ident(&param.name) || !names.insert(param.name.as_str()) {
                self.diagnostics
                    .report(&descriptors::RESERVED_NAME, [param.name.as_str(), "parameter name"]);
            }
            self.check_type(&param.ty, qualified);
        }
    }

    fn check_type(&mut self, ty: &TypeRef, qualified: &str) {
        for path in ty.named_paths() {
            self.check_path(path, qualified);
        }
    }

    fn check_path(&mut self, path: &str, used_by: &str) {
        if syn::parse_str::<syn::Path>(path).is_err() {
            self.diagnostics
                .report(&descriptors::INVALID_TYPE_PATH, [path, used_by]);
        }
    }

    fn check_overloads<'m>(&mut self, owner: &str, members: impl Iterator<Item = &'m MemberModel>) {
        for group in group_overloads(members.filter_map(MemberModel::as_method)) {
            if group.mixes_generic() {
                tracing::debug!(owner, method = %group.name, "overload group mixes generic and non-generic methods");
                self.diagnostics
                    .report(&descriptors::MIXED_GENERIC_OVERLOADS, [group.name.as_str()]);
            }
        }
    }

    /// Rust traits cannot overload, so one function name per declaring trait.
    fn check_duplicates<'m>(&mut self, members: impl IntoIterator<Item = (&'m str, &'m MemberModel)>) {
        let mut by_trait: FxHashMap<&str, FxHashSet<String>> = FxHashMap::default();
        for (declaring, member) in members {
            let names = by_trait.entry(declaring).or_default();
            for fn_name in member.fn_names() {
                if !names.insert(fn_name.clone()) {
                    self.diagnostics
                        .report(&descriptors::DUPLICATE_MEMBER_IN_TRAIT, [fn_name.as_str(), declaring]);
                }
            }
        }
    }

    fn check_user_methods(&mut self) {
        let request = self.request;
        for method in &request.user_methods {
            if naming::RESERVED_STUB_ITEMS.contains(&method.name.as_str()) {
                self.diagnostics.report(
                    &descriptors::RESERVED_NAME,
                    [method.name.as_str(), "reserved for generated code"],
                );
            } else if !naming::is_valid_ident(&method.name) {
                self.diagnostics
                    .report(&descriptors::RESERVED_NAME, [method.name.as_str(), "user method name"]);
            }
        }
    }

    fn unsupported(&mut self, qualified: &str, reason: &str) {
        self.diagnostics
            .report(&descriptors::UNSUPPORTED_MEMBER, [qualified, reason]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubforge_core::{
        Accessibility, ConstructorModel, InterfaceModel, Primitive, TypeParameterModel,
    };

    fn check(request: &StubRequest) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        validate(request, &mut diagnostics);
        diagnostics
    }

    fn single(member: impl Into<MemberModel>) -> StubRequest {
        StubRequest::interfaces(
            "Stub",
            vec![InterfaceModel::new("crate::Service").with_member(member)],
        )
    }

    #[test]
    fn well_formed_request_passes() {
        let request = single(
            MethodMember::new("find")
                .with_param(ParameterModel::new("id", TypeRef::Primitive(Primitive::I32)))
                .returning(TypeRef::text().nullable()),
        );
        let mut diagnostics = Diagnostics::new();
        assert!(validate(&request, &mut diagnostics));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn empty_interface_list_is_not_stubbable() {
        assert!(check(&StubRequest::interfaces("Stub", vec![])).contains("SF0001"));
    }

    #[test]
    fn sealed_class_is_rejected() {
        let class = ClassModel::new("crate::Final", "crate::Ops").with_modifiers(Modifiers::SEALED);
        assert!(check(&StubRequest::class("Stub", class)).contains("SF0002"));
    }

    #[test]
    fn class_without_accessible_constructor_is_rejected() {
        let class = ClassModel::new("crate::Hidden", "crate::Ops")
            .with_constructor(ConstructorModel::new("new").with_accessibility(Accessibility::Private));
        assert!(check(&StubRequest::class("Stub", class)).contains("SF0003"));
    }

    #[test]
    fn invalid_names_are_reported() {
        assert!(check(&StubRequest::interfaces("fn", vec![InterfaceModel::new("crate::A")])).contains("SF0005"));
        assert!(check(&single(MethodMember::new("1st"))).contains("SF0005"));

        let user = StubRequest::interfaces("Stub", vec![InterfaceModel::new("crate::A")])
            .with_user_method(MethodMember::new("from_base").with_accessibility(Accessibility::Private));
        assert!(check(&user).contains("SF0005"));
    }

    #[test]
    fn invalid_type_path_is_reported() {
        let bad = single(MethodMember::new("load").returning(TypeRef::value("crate::not a type")));
        assert!(check(&bad).contains("SF0006"));
    }

    #[test]
    fn generic_parameters_need_static() {
        let method = MethodMember::new("get")
            .with_type_param(TypeParameterModel::new("T"))
            .returning(TypeRef::Param("T".into()));
        assert!(check(&single(method)).contains("SF0007"));
    }

    #[test]
    fn same_name_in_one_trait_is_a_duplicate() {
        let iface = InterfaceModel::new("crate::Repo")
            .with_member(MethodMember::new("find").with_param(ParameterModel::new("id", TypeRef::text())))
            .with_member(MethodMember::new("find"));
        let diagnostics = check(&StubRequest::interfaces("Stub", vec![iface]));
        assert!(diagnostics.contains("SF0008"));
    }

    #[test]
    fn same_name_in_different_traits_is_fine() {
        let iface = InterfaceModel::new("crate::Repo")
            .with_member(MethodMember::new("find").declared_by("crate::A"))
            .with_member(
                MethodMember::new("find")
                    .with_param(ParameterModel::new("id", TypeRef::text()))
                    .declared_by("crate::B"),
            );
        assert!(!check(&StubRequest::interfaces("Stub", vec![iface])).contains("SF0008"));
    }

    #[test]
    fn setter_name_clash_is_a_duplicate() {
        let iface = InterfaceModel::new("crate::Person")
            .with_member(PropertyMember::new("name", TypeRef::text()).with_setter())
            .with_member(MethodMember::new("set_name").with_param(ParameterModel::new("v", TypeRef::text())));
        assert!(check(&StubRequest::interfaces("Stub", vec![iface])).contains("SF0008"));
    }

    #[test]
    fn mixed_generic_overloads_warn() {
        let iface = InterfaceModel::new("crate::Repo")
            .with_member(MethodMember::new("get").returning(TypeRef::text()).declared_by("crate::A"))
            .with_member(
                MethodMember::new("get")
                    .with_type_param(TypeParameterModel::new("T").with_constraint(ConstraintKind::Static))
                    .returning(TypeRef::Param("T".into()))
                    .declared_by("crate::B"),
            );
        let mut diagnostics = Diagnostics::new();
        assert!(validate(&StubRequest::interfaces("Stub", vec![iface]), &mut diagnostics));
        assert!(diagnostics.contains("SF0010"));
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn unsupported_member_shapes() {
        let static_method = MethodMember::new("create").with_modifiers(Modifiers::STATIC);
        assert!(check(&single(static_method)).contains("SF0011"));

        let by_ref_payload = EventMember::new("changed").with_payload(
            ParameterModel::new("v", TypeRef::Primitive(Primitive::I32)).with_mode(PassingMode::ByRef),
        );
        assert!(check(&single(by_ref_payload)).contains("SF0011"));

        let keyless = PropertyMember::indexer("item", TypeRef::text(), vec![]);
        assert!(check(&single(keyless)).contains("SF0011"));

        let mut generic = MethodMember::new("get");
        generic.is_generic = true;
        assert!(check(&single(generic)).contains("SF0011"));
    }
}
