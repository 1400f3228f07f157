//! Interface, class and request models.
//!
//! These are the inputs to generation. A front end builds them (or ships them
//! as JSON through [`StubRequest::from_json`]); the generator only reads them.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::member::{Accessibility, MemberModel, MethodMember, Modifiers, ParameterModel};

/// A trait to implement, with its flattened member list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceModel {
    /// Trait path as written in Rust, e.g. `crate::repo::Repository`.
    pub full_name: String,
    /// Short name used to derive bundle and interceptor names.
    pub simple_name: String,
    #[serde(default)]
    pub members: Vec<MemberModel>,
}

impl InterfaceModel {
    /// Create an interface whose simple name is the last path segment.
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let simple_name = last_segment(&full_name).to_string();
        Self {
            full_name,
            simple_name,
            members: Vec::new(),
        }
    }

    /// Builder: add a member.
    pub fn with_member(mut self, member: impl Into<MemberModel>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Declaring trait of a member of this interface.
    pub fn declaring_of<'a>(&'a self, member: &'a MemberModel) -> &'a str {
        member.declaring_or(&self.full_name)
    }
}

/// A constructor of a base class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstructorModel {
    /// Associated function name, e.g. `new` or `with_capacity`.
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterModel>,
    #[serde(default)]
    pub accessibility: Accessibility,
}

impl ConstructorModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            accessibility: Accessibility::Public,
        }
    }

    pub fn with_param(mut self, param: ParameterModel) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }
}

/// A base class: a struct plus the trait that carries its overridable surface.
///
/// Inheritance is expressed through `base`, most-derived first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassModel {
    /// Struct path, e.g. `crate::net::Connection`.
    pub full_name: String,
    pub simple_name: String,
    /// Trait implemented by the class for its overridable members.
    pub surface: String,
    #[serde(default)]
    pub members: Vec<MemberModel>,
    #[serde(default)]
    pub constructors: Vec<ConstructorModel>,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub base: Option<Box<ClassModel>>,
}

impl ClassModel {
    pub fn new(full_name: impl Into<String>, surface: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let simple_name = last_segment(&full_name).to_string();
        Self {
            full_name,
            simple_name,
            surface: surface.into(),
            members: Vec::new(),
            constructors: Vec::new(),
            modifiers: Modifiers::empty(),
            base: None,
        }
    }

    pub fn with_member(mut self, member: impl Into<MemberModel>) -> Self {
        self.members.push(member.into());
        self
    }

    pub fn with_constructor(mut self, ctor: ConstructorModel) -> Self {
        self.constructors.push(ctor);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_base(mut self, base: ClassModel) -> Self {
        self.base = Some(Box::new(base));
        self
    }

    /// Sealed or static classes cannot be stubbed.
    pub fn is_stubbable(&self) -> bool {
        !self.modifiers.intersects(Modifiers::SEALED | Modifiers::STATIC)
    }

    /// Constructors a derived stub may forward to.
    pub fn accessible_constructors(&self) -> impl Iterator<Item = &ConstructorModel> {
        self.constructors
            .iter()
            .filter(|c| c.accessibility.is_accessible_to_derived())
    }

    /// This class followed by its ancestors, most-derived first.
    pub fn chain(&self) -> Vec<&ClassModel> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(class) = current {
            chain.push(class);
            current = class.base.as_deref();
        }
        chain
    }
}

/// What a stub stands in for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum StubTarget {
    /// One or more traits, each with explicit routing.
    Interfaces(Vec<InterfaceModel>),
    /// A base class to wrap and extend.
    Class(ClassModel),
}

/// Where the generated companion type is placed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Placement {
    /// At module level.
    #[default]
    Standalone,
    /// Nested inside the well-known container of the requesting declaration.
    Inline { owner: String },
}

/// A single generation unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StubRequest {
    /// Name of the generated stub struct.
    pub stub_name: String,
    pub target: StubTarget,
    #[serde(default)]
    pub placement: Placement,
    /// Inherent methods the stub already declares in hand-written code.
    #[serde(default)]
    pub user_methods: Vec<MethodMember>,
}

impl StubRequest {
    /// Stub for one or more interfaces.
    pub fn interfaces(stub_name: impl Into<String>, interfaces: Vec<InterfaceModel>) -> Self {
        Self {
            stub_name: stub_name.into(),
            target: StubTarget::Interfaces(interfaces),
            placement: Placement::Standalone,
            user_methods: Vec::new(),
        }
    }

    /// Stub for a base class.
    pub fn class(stub_name: impl Into<String>, class: ClassModel) -> Self {
        Self {
            stub_name: stub_name.into(),
            target: StubTarget::Class(class),
            placement: Placement::Standalone,
            user_methods: Vec::new(),
        }
    }

    /// Builder: nest inside `owner`'s stub container.
    pub fn inline_in(mut self, owner: impl Into<String>) -> Self {
        self.placement = Placement::Inline {
            owner: owner.into(),
        };
        self
    }

    /// Builder: declare a hand-written inherent method.
    pub fn with_user_method(mut self, method: MethodMember) -> Self {
        self.user_methods.push(method);
        self
    }

    /// Parse a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let request: StubRequest = serde_json::from_str(json)?;
        if request.stub_name.trim().is_empty() {
            return Err(ModelError::MissingName {
                what: "stub_name".to_string(),
            });
        }
        Ok(request)
    }

    /// Parse a batch of requests from a JSON array.
    pub fn batch_from_json(json: &str) -> Result<Vec<Self>, ModelError> {
        let requests: Vec<StubRequest> = serde_json::from_str(json)?;
        if let Some(index) = requests.iter().position(|r| r.stub_name.trim().is_empty()) {
            return Err(ModelError::MissingName {
                what: format!("stub_name of request {index}"),
            });
        }
        Ok(requests)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}
