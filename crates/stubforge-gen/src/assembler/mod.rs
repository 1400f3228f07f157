//! Implementation assembly.
//!
//! The [`ImplementationAssembler`] turns a validated [`StubRequest`] into a
//! [`CompanionType`]: one bundle per interface (or one for a class chain),
//! one trait impl per declaring trait and a fallback chain per generated
//! function.
//!
//! ## Components
//!
//! - [`fallback`] - the fixed record / override / implementation / default order
//! - [`user_impl`] - matching hand-written implementations by signature
//! - [`class`] - base class chain walking and constructor forwarding
//!
//! ## Name Bookkeeping
//!
//! Two [`NameAccumulator`]s are threaded through one assembly: stub fields
//! (bundles, the wrapped base, the runtime default provider) and inherent
//! functions (constructors, conversion helpers, user methods). A third one
//! keeps interceptor type prefixes unique across bundles, since every
//! interceptor type of a stub lives in the same module.

mod class;
mod fallback;
mod user_impl;

pub use class::{Disposition, collect_members, forwarding_constructors};
pub use fallback::{ChainSpec, Terminal, build_chain};
pub use user_impl::{UserImplementations, UserMatch};

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use stubforge_core::diagnostics::{Diagnostics, descriptors};
use stubforge_core::{
    MemberModel, NamedType, ParameterModel, PassingMode, Receiver, SignatureKey, StubRequest,
    StubTarget, TypeParameterModel, TypeRef, TypeShape,
};

use crate::defaults::{DefaultValueResolver, DefaultValueStrategy};
use crate::generic::GenericDispatchSynthesizer;
use crate::handlers::{Backing, HandlerSynthesizer, InterceptorDef, SlotKind};
use crate::ir::{
    Accessor, Bundle, BundleEntry, CompanionType, Conversion, FallbackStep, InterceptorRef,
    MemberImpl, StubShape, TraitImpl,
};
use crate::naming::{self, NameAccumulator};
use crate::options::GeneratorOptions;
use crate::overload::group_overloads;

/// Field holding the runtime default provider.
pub const RUNTIME_DEFAULTS_FIELD: &str = "runtime_defaults";

/// Identity of a member inside its declaring trait.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum MemberIdentity {
    Method(SignatureKey),
    Property { name: String, keys: Vec<String> },
    Event(String),
}

impl MemberIdentity {
    pub(crate) fn of(member: &MemberModel) -> Self {
        match member {
            MemberModel::Method(m) => MemberIdentity::Method(SignatureKey::of_method(m)),
            MemberModel::Property(p) => MemberIdentity::Property {
                name: p.name.clone(),
                keys: p.index_params.iter().map(|k| k.ty.to_string()).collect(),
            },
            MemberModel::Event(e) => MemberIdentity::Event(e.name.clone()),
        }
    }
}

/// A member as seen by the assembler, whatever it was declared on.
#[derive(Debug, Clone)]
pub struct SourceMember<'a> {
    pub member: &'a MemberModel,
    /// Trait the member is implemented for.
    pub declaring: String,
    /// Simple name of the interface or class that contributed it.
    pub owner: &'a str,
    pub disposition: Disposition,
}

/// Members that share one interceptor bundle.
struct BundleSource<'a> {
    simple_name: &'a str,
    full_name: &'a str,
    members: Vec<SourceMember<'a>>,
}

/// Signature of one generated trait function.
#[derive(Debug, Clone)]
struct FnShape {
    fn_name: String,
    accessor: Accessor,
    receiver: Receiver,
    type_params: Vec<TypeParameterModel>,
    params: Vec<ParameterModel>,
    returns: TypeRef,
}

impl FnShape {
    fn of(member: &MemberModel) -> Vec<FnShape> {
        match member {
            MemberModel::Property(p) => {
                let mut shapes = Vec::new();
                if p.has_getter {
                    shapes.push(FnShape {
                        fn_name: p.name.clone(),
                        accessor: Accessor::Getter,
                        receiver: Receiver::Shared,
                        type_params: Vec::new(),
                        params: p.index_params.clone(),
                        returns: p.ty.clone(),
                    });
                }
                if p.has_setter {
                    let mut params = p.index_params.clone();
                    let value = naming::setter_value_name(p.index_params.iter().map(|k| k.name.as_str()));
                    params.push(ParameterModel::new(value, p.ty.clone()));
                    shapes.push(FnShape {
                        fn_name: p.setter_name(),
                        accessor: Accessor::Setter,
                        receiver: Receiver::Exclusive,
                        type_params: Vec::new(),
                        params,
                        returns: TypeRef::Unit,
                    });
                }
                shapes
            }
            MemberModel::Method(m) => vec![FnShape {
                fn_name: m.name.clone(),
                accessor: Accessor::Call,
                receiver: m.receiver,
                type_params: m.type_parameters.clone(),
                params: m.parameters.clone(),
                returns: m.return_type.clone(),
            }],
            MemberModel::Event(e) => {
                // The handler type is emitted verbatim, so it rides in a named type.
                let handler = TypeRef::Named(NamedType {
                    path: e.handler_type(),
                    args: Vec::new(),
                    shape: TypeShape::Value,
                });
                vec![
                    FnShape {
                        fn_name: e.add_name(),
                        accessor: Accessor::Subscribe,
                        receiver: Receiver::Shared,
                        type_params: Vec::new(),
                        params: vec![ParameterModel::new("handler", handler.clone())],
                        returns: TypeRef::Unit,
                    },
                    FnShape {
                        fn_name: e.remove_name(),
                        accessor: Accessor::Unsubscribe,
                        receiver: Receiver::Shared,
                        type_params: Vec::new(),
                        params: vec![ParameterModel::new("handler", handler).with_mode(PassingMode::In)],
                        returns: TypeRef::Unit,
                    },
                ]
            }
        }
    }

    fn key(&self) -> SignatureKey {
        SignatureKey::new(
            &self.fn_name,
            self.receiver,
            &self.params,
            self.returns.to_string(),
            self.type_params.len(),
        )
    }

    fn slot(&self) -> Option<SlotKind> {
        match self.accessor {
            Accessor::Getter => Some(SlotKind::OnGet),
            Accessor::Setter => Some(SlotKind::OnSet),
            Accessor::Call => Some(SlotKind::OnCall),
            Accessor::Subscribe | Accessor::Unsubscribe => None,
        }
    }
}

/// Builds companion types from stub requests.
#[derive(Debug, Clone, Copy)]
pub struct ImplementationAssembler<'a> {
    options: &'a GeneratorOptions,
}

impl<'a> ImplementationAssembler<'a> {
    pub fn new(options: &'a GeneratorOptions) -> Self {
        Self { options }
    }

    /// Assemble the companion type of `request`.
    ///
    /// Returns `None` when assembly itself reports an error, e.g. a name
    /// collision between generated items.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn assemble(&self, request: &StubRequest, diagnostics: &mut Diagnostics) -> Option<CompanionType> {
        let errors_before = diagnostics.error_count();
        let mut assembly = Assembly::new(request, self.options, diagnostics);

        let shape = match &request.target {
            StubTarget::Interfaces(interfaces) => {
                let mut seen: FxHashSet<(String, MemberIdentity)> = FxHashSet::default();
                for interface in interfaces {
                    assembly.traits.entry(interface.full_name.clone()).or_default();
                    let members = interface
                        .members
                        .iter()
                        .filter_map(|member| {
                            let declaring = interface.declaring_of(member).to_string();
                            seen.insert((declaring.clone(), MemberIdentity::of(member)))
                                .then_some(SourceMember {
                                    member,
                                    declaring,
                                    owner: &interface.simple_name,
                                    disposition: Disposition::Intercept(Terminal::Default),
                                })
                        })
                        .collect();
                    assembly.bundle(BundleSource {
                        simple_name: &interface.simple_name,
                        full_name: &interface.full_name,
                        members,
                    });
                }
                StubShape::Interfaces
            }
            StubTarget::Class(class) => {
                assembly.traits.entry(class.surface.clone()).or_default();
                assembly.bundle(BundleSource {
                    simple_name: &class.simple_name,
                    full_name: &class.full_name,
                    members: collect_members(class),
                });
                let constructors = forwarding_constructors(class);
                for ctor in &constructors {
                    if !assembly.fns.claim(&ctor.name) {
                        assembly.diagnostics.report(
                            &descriptors::NAME_COLLISION,
                            [ctor.name.as_str(), request.stub_name.as_str()],
                        );
                    }
                }
                StubShape::Class {
                    base_type: class.full_name.clone(),
                    constructors,
                }
            }
        };

        let companion = assembly.finish(shape);
        tracing::debug!(
            stub = %companion.stub_name,
            bundles = companion.bundles.len(),
            impls = companion.impls.len(),
            "assembled companion type"
        );
        (diagnostics.error_count() == errors_before).then_some(companion)
    }
}

/// State of one assembly.
struct Assembly<'r> {
    request: &'r StubRequest,
    options: &'r GeneratorOptions,
    diagnostics: &'r mut Diagnostics,
    user: UserImplementations,
    fields: NameAccumulator,
    fns: NameAccumulator,
    type_prefixes: NameAccumulator,
    traits: IndexMap<String, Vec<MemberImpl>>,
    bundles: Vec<Bundle>,
    needs_runtime_defaults: bool,
}

impl<'r> Assembly<'r> {
    fn new(request: &'r StubRequest, options: &'r GeneratorOptions, diagnostics: &'r mut Diagnostics) -> Self {
        let is_class = matches!(request.target, StubTarget::Class(_));
        let fields = NameAccumulator::with_reserved(["base", RUNTIME_DEFAULTS_FIELD]);
        let mut fns = if is_class {
            NameAccumulator::with_reserved(["from_base", "reset_interceptors"])
        } else {
            NameAccumulator::with_reserved(["new", "reset_interceptors"])
        };
        for method in &request.user_methods {
            fns.claim(&method.name);
        }
        Self {
            request,
            options,
            diagnostics,
            user: UserImplementations::new(&request.user_methods),
            fields,
            fns,
            type_prefixes: NameAccumulator::new(),
            traits: IndexMap::new(),
            bundles: Vec::new(),
            needs_runtime_defaults: false,
        }
    }

    fn bundle(&mut self, source: BundleSource<'_>) {
        let options = self.options;
        let member_names: Vec<String> = source
            .members
            .iter()
            .flat_map(|m| std::iter::once(m.member.name().to_string()).chain(m.member.fn_names()))
            .collect();
        let preferred = naming::bundle_field_name(source.simple_name, member_names.iter().map(String::as_str));
        let field = self.fields.claim_unique(&preferred);
        let prefix = self
            .type_prefixes
            .claim_unique(&naming::to_pascal_case(source.simple_name));
        let suffix = options.interceptor_suffix.as_str();
        let handlers = HandlerSynthesizer::new(&prefix, suffix);
        let generics = GenericDispatchSynthesizer::new(&prefix, suffix);

        let intercepted_methods = source.members.iter().filter_map(|m| match m.disposition {
            Disposition::Intercept(_) => m.member.as_method(),
            Disposition::Forward => None,
        });
        let groups = group_overloads(intercepted_methods);
        let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
        let mut entry_names = NameAccumulator::new();
        let mut bundle = Bundle {
            field,
            type_name: naming::bundle_type_name(&prefix, &options.bundle_suffix),
            source: source.full_name.to_string(),
            entries: Vec::new(),
        };

        for source_member in &source.members {
            let terminal = match source_member.disposition {
                Disposition::Forward => {
                    self.forward(source_member);
                    continue;
                }
                Disposition::Intercept(terminal) => terminal,
            };
            let (entry, def, generic) = match source_member.member {
                MemberModel::Property(p) => {
                    let def = handlers.property(p);
                    (BundleEntry::Plain(def.clone()), def, false)
                }
                MemberModel::Event(e) => {
                    let def = handlers.event(e);
                    (BundleEntry::Plain(def.clone()), def, false)
                }
                MemberModel::Method(m) => {
                    let Some(group) = groups.iter().find(|g| g.name == m.name) else {
                        continue;
                    };
                    let position = positions.entry(m.name.as_str()).or_insert(0);
                    let Some(overload) = group.overloads.get(*position) else {
                        continue;
                    };
                    *position += 1;
                    match generics.dispatch(group, overload) {
                        Some(dispatch) => {
                            let nested = dispatch.nested.clone();
                            (BundleEntry::Generic(dispatch), nested, true)
                        }
                        None => {
                            let def = handlers.method(group, overload);
                            (BundleEntry::Plain(def.clone()), def, false)
                        }
                    }
                }
            };

            if !entry_names.claim(entry.field()) {
                self.diagnostics.report(
                    &descriptors::NAME_COLLISION,
                    [entry.field(), bundle.type_name.as_str()],
                );
                continue;
            }
            self.intercept(source_member, terminal, &bundle.field, entry.field(), &def, generic);
            bundle.entries.push(entry);
        }

        tracing::trace!(bundle = %bundle.type_name, entries = bundle.entries.len(), "bundle assembled");
        self.bundles.push(bundle);
    }

    fn intercept(
        &mut self,
        source: &SourceMember<'_>,
        terminal: Terminal,
        bundle_field: &str,
        entry_field: &str,
        def: &InterceptorDef,
        generic: bool,
    ) {
        let member = naming::qualified_member(source.owner, source.member.name());
        for shape in FnShape::of(source.member) {
            let resolver = DefaultValueResolver::with_type_params(&shape.type_params);
            let strategy = match shape.accessor {
                Accessor::Getter | Accessor::Call => resolver.resolve(&shape.returns),
                _ => DefaultValueStrategy::UseTypeDefault,
            };
            let runtime_default = shape.accessor == Accessor::Call
                && !strategy.is_resolvable()
                && shape
                    .type_params
                    .iter()
                    .any(|tp| shape.returns.mentions_param(&tp.name));
            let out_defaults = shape
                .params
                .iter()
                .filter(|p| p.mode == PassingMode::Out)
                .map(|p| (p.clone(), resolver.resolve(&p.ty)))
                .filter(|(_, strategy)| strategy.is_resolvable())
                .collect();
            let user = self.user_match(&shape.key(), &member);

            let chain = build_chain(ChainSpec {
                accessor: shape.accessor,
                terminal,
                user,
                strategy,
                runtime_default,
                out_defaults,
            });
            if chain.contains(&FallbackStep::RuntimeDefault) {
                self.needs_runtime_defaults = true;
            }

            let hint = configuration_hint(&shape, bundle_field, entry_field, def, generic);
            let interceptor = InterceptorRef {
                bundle: bundle_field.to_string(),
                field: entry_field.to_string(),
                def: def.clone(),
                generic,
                slot: shape.slot(),
            };
            self.push_impl(
                &source.declaring,
                MemberImpl {
                    member: member.clone(),
                    fn_name: shape.fn_name,
                    accessor: shape.accessor,
                    receiver: shape.receiver,
                    type_params: shape.type_params,
                    params: shape.params,
                    returns: shape.returns,
                    interceptor: Some(interceptor),
                    chain,
                    hint,
                },
            );
        }
    }

    fn forward(&mut self, source: &SourceMember<'_>) {
        let member = naming::qualified_member(source.owner, source.member.name());
        for shape in FnShape::of(source.member) {
            self.push_impl(
                &source.declaring,
                MemberImpl {
                    member: member.clone(),
                    fn_name: shape.fn_name,
                    accessor: shape.accessor,
                    receiver: shape.receiver,
                    type_params: shape.type_params,
                    params: shape.params,
                    returns: shape.returns,
                    interceptor: None,
                    chain: vec![FallbackStep::BaseImplementation],
                    hint: String::new(),
                },
            );
        }
    }

    fn push_impl(&mut self, declaring: &str, member: MemberImpl) {
        self.traits.entry(declaring.to_string()).or_default().push(member);
    }

    fn user_match(&mut self, key: &SignatureKey, member: &str) -> UserMatch {
        let found = self.user.lookup(key);
        if found == UserMatch::PublicIgnored {
            self.diagnostics
                .report(&descriptors::PUBLIC_USER_METHOD_IGNORED, [key.name.as_str(), member]);
        }
        found
    }

    fn finish(mut self, shape: StubShape) -> CompanionType {
        let mut conversions = Vec::new();
        for trait_path in self.traits.keys() {
            let fn_name = self.fns.claim_unique(&naming::conversion_name(trait_path));
            conversions.push(Conversion {
                fn_name,
                trait_path: trait_path.clone(),
            });
        }
        let impls = self
            .traits
            .into_iter()
            .map(|(trait_path, members)| TraitImpl { trait_path, members })
            .collect();

        CompanionType {
            stub_name: self.request.stub_name.clone(),
            module: naming::module_name(&self.request.stub_name, &self.options.module_suffix),
            shape,
            bundles: self.bundles,
            impls,
            conversions,
            runtime_defaults: self
                .needs_runtime_defaults
                .then(|| RUNTIME_DEFAULTS_FIELD.to_string()),
        }
    }
}

/// How to configure a member, quoted by the unconfigured-member failure.
fn configuration_hint(
    shape: &FnShape,
    bundle: &str,
    field: &str,
    def: &InterceptorDef,
    generic: bool,
) -> String {
    let path = format!("stub.{bundle}.{field}");
    match shape.accessor {
        Accessor::Getter if matches!(def.backing, Some(Backing::Index { .. })) => {
            format!("set {path}.on_get(..) or insert a value for the key with {path}.insert(..)")
        }
        Accessor::Getter => format!("set {path}.on_get(..) or store a value with {path}.set_value(..)"),
        Accessor::Setter => format!("set {path}.on_set(..)"),
        Accessor::Call if generic => {
            let args: Vec<&str> = shape.type_params.iter().map(|tp| tp.name.as_str()).collect();
            format!(
                "set {path}.of::<{}>().on_call(..) or register a default with stub.{RUNTIME_DEFAULTS_FIELD}.register(..)",
                args.join(", ")
            )
        }
        Accessor::Call => format!("set {path}.on_call(..)"),
        Accessor::Subscribe | Accessor::Unsubscribe => format!("subscribe through {path}"),
    }
}
