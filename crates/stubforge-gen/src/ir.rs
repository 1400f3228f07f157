//! Companion-type intermediate representation.
//!
//! The assembler produces a [`CompanionType`]; the renderer turns it into Rust
//! tokens. Nothing here knows about token streams, so the assembly rules can be
//! tested on plain data.

use stubforge_core::{ParameterModel, Receiver, TypeParameterModel, TypeRef};

use crate::defaults::DefaultValueStrategy;
use crate::generic::GenericDispatchDef;
use crate::handlers::{InterceptorDef, SlotKind};

/// One interceptor field of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleEntry {
    Plain(InterceptorDef),
    Generic(GenericDispatchDef),
}

impl BundleEntry {
    pub fn field(&self) -> &str {
        match self {
            BundleEntry::Plain(def) => &def.field,
            BundleEntry::Generic(def) => &def.field,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            BundleEntry::Plain(def) => &def.type_name,
            BundleEntry::Generic(def) => &def.type_name,
        }
    }
}

/// The public interceptor bundle of one interface (or of a class chain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Field name on the stub.
    pub field: String,
    pub type_name: String,
    /// Trait or class the bundle stands for.
    pub source: String,
    pub entries: Vec<BundleEntry>,
}

impl Bundle {
    pub fn entry(&self, field: &str) -> Option<&BundleEntry> {
        self.entries.iter().find(|e| e.field() == field)
    }
}

/// Which generated function a member implementation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Getter,
    Setter,
    Call,
    Subscribe,
    Unsubscribe,
}

/// Where a member implementation finds its interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorRef {
    /// Bundle field on the stub.
    pub bundle: String,
    /// Interceptor field in the bundle.
    pub field: String,
    /// The definition holding the state this member records into. For generic
    /// methods this is the per-type-argument interceptor.
    pub def: InterceptorDef,
    /// Reach the interceptor through `of::<T..>()`.
    pub generic: bool,
    /// Override slot consulted by this accessor.
    pub slot: Option<SlotKind>,
}

/// One step of a member's fallback chain. Steps run in order; terminal steps
/// end the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackStep {
    /// Assign defaults to `Out` parameters before anything else runs.
    DefaultOutParams(Vec<(ParameterModel, DefaultValueStrategy)>),
    /// Record the invocation into the interceptor.
    Record,
    /// Invoke the override slot if set.
    Override,
    /// Call the hand-written restricted-visibility implementation. Terminal.
    UserImplementation,
    /// Return the backing value if present.
    BackingLookup,
    /// Store into the backing. Terminal.
    BackingStore,
    /// Add to or remove from the subscriber list. Terminal.
    ManageSubscribers,
    /// Call the wrapped base value's implementation. Terminal.
    BaseImplementation,
    /// Produce the default value. Terminal.
    Default(DefaultValueStrategy),
    /// Ask the stub's runtime default provider, then fail. Terminal.
    RuntimeDefault,
}

impl FallbackStep {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FallbackStep::UserImplementation
                | FallbackStep::BackingStore
                | FallbackStep::ManageSubscribers
                | FallbackStep::BaseImplementation
                | FallbackStep::Default(_)
                | FallbackStep::RuntimeDefault
        )
    }
}

/// One generated trait function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberImpl {
    /// Qualified member name for failure messages, e.g. `Repository::find`.
    pub member: String,
    pub fn_name: String,
    pub accessor: Accessor,
    pub receiver: Receiver,
    pub type_params: Vec<TypeParameterModel>,
    pub params: Vec<ParameterModel>,
    pub returns: TypeRef,
    /// `None` for members forwarded to the base without interception.
    pub interceptor: Option<InterceptorRef>,
    pub chain: Vec<FallbackStep>,
    /// How to configure the member, quoted in the unconfigured failure.
    pub hint: String,
}

impl MemberImpl {
    pub fn has_step(&self, step: &FallbackStep) -> bool {
        self.chain.contains(step)
    }

    /// The chain's terminal step.
    pub fn terminal(&self) -> Option<&FallbackStep> {
        self.chain.iter().find(|s| s.is_terminal())
    }
}

/// `impl Trait for Stub`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitImpl {
    pub trait_path: String,
    pub members: Vec<MemberImpl>,
}

/// `fn as_x(&self) -> &impl Trait`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub fn_name: String,
    pub trait_path: String,
}

/// `fn name(params..) -> Self` forwarding to a base constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingConstructor {
    pub name: String,
    pub params: Vec<ParameterModel>,
}

/// Interface stubs are built from nothing; class stubs wrap a base value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubShape {
    Interfaces,
    Class {
        /// Base struct path.
        base_type: String,
        constructors: Vec<ForwardingConstructor>,
    },
}

/// Everything generated for one stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionType {
    pub stub_name: String,
    /// Module holding interceptor and bundle types.
    pub module: String,
    pub shape: StubShape,
    pub bundles: Vec<Bundle>,
    pub impls: Vec<TraitImpl>,
    pub conversions: Vec<Conversion>,
    /// Field holding the runtime default provider, when any member needs it.
    pub runtime_defaults: Option<String>,
}

impl CompanionType {
    pub fn is_class(&self) -> bool {
        matches!(self.shape, StubShape::Class { .. })
    }

    pub fn bundle(&self, field: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.field == field)
    }

    pub fn trait_impl(&self, trait_path: &str) -> Option<&TraitImpl> {
        self.impls.iter().find(|i| i.trait_path == trait_path)
    }

    /// Every member implementation named `fn_name`, across trait impls.
    pub fn members_named<'a>(&'a self, fn_name: &'a str) -> impl Iterator<Item = &'a MemberImpl> {
        self.impls
            .iter()
            .flat_map(|i| i.members.iter())
            .filter(move |m| m.fn_name == fn_name)
    }
}
