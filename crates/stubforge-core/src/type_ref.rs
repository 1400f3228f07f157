//! Type references used throughout the member model.
//!
//! A [`TypeRef`] is the front end's already-resolved view of a type. It carries
//! just enough shape information for the generator to pick a default-value
//! strategy and to render the type back as Rust syntax.
//!
//! ## Rendering
//!
//! `Display` produces valid Rust type syntax:
//!
//! | TypeRef                          | Rendered                        |
//! |----------------------------------|---------------------------------|
//! | `Unit`                           | `()`                            |
//! | `Primitive(Text)`                | `String`                        |
//! | `Named { path: "a::B", args }`   | `a::B<args..>`                  |
//! | `Nullable(T)`                    | `Option<T>`                     |
//! | `Tuple([A, B])`                  | `(A, B)`                        |
//! | `Param("T")`                     | `T`                             |
//! | `Future(Some(T))`                | boxed, pinned `dyn Future`      |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fully qualified boxed-future type used for async returns.
pub const BOXED_FUTURE: &str =
    "::std::pin::Pin<::std::boxed::Box<dyn ::std::future::Future<Output = {}>>>";

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Usize,
    Isize,
    F32,
    F64,
    Char,
    /// Owned text. Rendered as `String`, or `&str` when passed by shared reference.
    Text,
}

impl Primitive {
    /// Rust spelling of the owned form.
    pub fn rust_name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::Usize => "usize",
            Primitive::Isize => "isize",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Char => "char",
            Primitive::Text => "String",
        }
    }
}

/// How a named type behaves with respect to "no value" defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TypeShape {
    /// Value-like type with a natural default (`Default` is implemented).
    #[default]
    Value,
    /// Reference-like type; may or may not expose a parameterless `new()`.
    Reference {
        #[serde(default)]
        parameterless_ctor: bool,
    },
    /// Abstraction (trait object, opaque handle). Never directly constructible.
    Abstract,
}

/// A named type with optional generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedType {
    /// Path as written in Rust, e.g. `crate::model::Order`.
    pub path: String,
    #[serde(default)]
    pub args: Vec<TypeRef>,
    #[serde(default)]
    pub shape: TypeShape,
}

impl NamedType {
    /// Last path segment, e.g. `Order` for `crate::model::Order`.
    pub fn last_segment(&self) -> &str {
        self.path.rsplit("::").next().unwrap_or(&self.path)
    }
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum TypeRef {
    Unit,
    Primitive(Primitive),
    Named(NamedType),
    /// Optional value. Always has a "no value" default.
    Nullable(Box<TypeRef>),
    Tuple(Vec<TypeRef>),
    /// A method type parameter, by name.
    Param(String),
    /// Async computation. `None` means it completes without a payload.
    Future(Option<Box<TypeRef>>),
}

impl TypeRef {
    /// Owned text type.
    pub fn text() -> Self {
        TypeRef::Primitive(Primitive::Text)
    }

    /// Value-shaped named type without arguments.
    pub fn value(path: impl Into<String>) -> Self {
        TypeRef::Named(NamedType {
            path: path.into(),
            args: Vec::new(),
            shape: TypeShape::Value,
        })
    }

    /// Reference-shaped named type without arguments.
    pub fn reference(path: impl Into<String>, parameterless_ctor: bool) -> Self {
        TypeRef::Named(NamedType {
            path: path.into(),
            args: Vec::new(),
            shape: TypeShape::Reference { parameterless_ctor },
        })
    }

    /// Abstract named type with generic arguments.
    pub fn abstraction(path: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named(NamedType {
            path: path.into(),
            args,
            shape: TypeShape::Abstract,
        })
    }

    /// Wrap this type as nullable. Already-nullable types are returned unchanged.
    pub fn nullable(self) -> Self {
        match self {
            TypeRef::Nullable(_) => self,
            other => TypeRef::Nullable(Box::new(other)),
        }
    }

    /// Async future with the given payload.
    pub fn future(payload: Option<TypeRef>) -> Self {
        TypeRef::Future(payload.map(Box::new))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, TypeRef::Unit)
    }

    pub fn is_future(&self) -> bool {
        matches!(self, TypeRef::Future(_))
    }

    /// Whether this type refers to the named method type parameter anywhere.
    pub fn mentions_param(&self, name: &str) -> bool {
        match self {
            TypeRef::Unit | TypeRef::Primitive(_) => false,
            TypeRef::Param(p) => p == name,
            TypeRef::Named(named) => named.args.iter().any(|a| a.mentions_param(name)),
            TypeRef::Nullable(inner) => inner.mentions_param(name),
            TypeRef::Tuple(items) => items.iter().any(|t| t.mentions_param(name)),
            TypeRef::Future(payload) => payload.as_deref().is_some_and(|p| p.mentions_param(name)),
        }
    }

    /// Every named path referenced by this type, outermost first.
    pub fn named_paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Named(named) => {
                out.push(&named.path);
                for arg in &named.args {
                    arg.collect_paths(out);
                }
            }
            TypeRef::Nullable(inner) => inner.collect_paths(out),
            TypeRef::Tuple(items) => items.iter().for_each(|t| t.collect_paths(out)),
            TypeRef::Future(Some(payload)) => payload.collect_paths(out),
            _ => {}
        }
    }

    /// Render for a shared-reference parameter position (`&T`, `&str` for text).
    pub fn borrowed(&self) -> String {
        match self {
            TypeRef::Primitive(Primitive::Text) => "&str".to_string(),
            other => format!("&{other}"),
        }
    }

    /// Render for a mutable-reference parameter position.
    pub fn borrowed_mut(&self) -> String {
        format!("&mut {self}")
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Unit => write!(f, "()"),
            TypeRef::Primitive(p) => write!(f, "{}", p.rust_name()),
            TypeRef::Named(named) => {
                write!(f, "{}", named.path)?;
                if !named.args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in named.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Nullable(inner) => write!(f, "Option<{inner}>"),
            TypeRef::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            TypeRef::Param(name) => write!(f, "{name}"),
            TypeRef::Future(payload) => {
                let output = payload
                    .as_deref()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "()".to_string());
                write!(f, "{}", BOXED_FUTURE.replace("{}", &output))
            }
        }
    }
}
