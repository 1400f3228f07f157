//! Recognized collection abstractions.
//!
//! A non-constructible named type whose last path segment is one of the
//! abstractions below, with the listed number of element types, defaults to a
//! fresh growable container converted with `Into::into`.
//!
//! | Abstraction                                                            | Arity | Container |
//! |------------------------------------------------------------------------|-------|-----------|
//! | `List`, `ReadOnlyList`, `Sequence`, `Collection`, `ReadOnlyCollection`, `Enumerable`, `Iterable` | 1 | `Vec`     |
//! | `Map`, `Dictionary`, `ReadOnlyDictionary`, `ReadOnlyMap`               | 2     | `HashMap` |
//! | `Set`, `ReadOnlySet`, `UniqueSet`                                      | 1     | `HashSet` |

use stubforge_core::{NamedType, TypeRef};

const SEQUENCES: &[&str] = &[
    "List",
    "ReadOnlyList",
    "Sequence",
    "Collection",
    "ReadOnlyCollection",
    "Enumerable",
    "Iterable",
];

const MAPPINGS: &[&str] = &["Map", "Dictionary", "ReadOnlyDictionary", "ReadOnlyMap"];

const SETS: &[&str] = &["Set", "ReadOnlySet", "UniqueSet"];

/// Growable container families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Ordered sequence: `Vec<T>`.
    Sequence,
    /// Key to value mapping: `HashMap<K, V>`.
    Mapping,
    /// Unique elements: `HashSet<T>`.
    Set,
}

impl ContainerKind {
    /// Fully qualified container path.
    pub fn path(self) -> &'static str {
        match self {
            ContainerKind::Sequence => "::std::vec::Vec",
            ContainerKind::Mapping => "::std::collections::HashMap",
            ContainerKind::Set => "::std::collections::HashSet",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            ContainerKind::Mapping => 2,
            ContainerKind::Sequence | ContainerKind::Set => 1,
        }
    }
}

/// Container kind for `named`, if it is a recognized abstraction with the right arity.
pub fn recognize(named: &NamedType) -> Option<ContainerKind> {
    let segment = named.last_segment();
    let kind = if SEQUENCES.contains(&segment) {
        ContainerKind::Sequence
    } else if MAPPINGS.contains(&segment) {
        ContainerKind::Mapping
    } else if SETS.contains(&segment) {
        ContainerKind::Set
    } else {
        return None;
    };
    (named.args.len() == kind.arity()).then_some(kind)
}

/// Render `Container<elements..>`.
pub fn container_type(kind: ContainerKind, elements: &[TypeRef]) -> String {
    let args: Vec<String> = elements.iter().map(ToString::to_string).collect();
    format!("{}<{}>", kind.path(), args.join(", "))
}
