//! Structured diagnostics.
//!
//! Generation never reports free-form text. Every problem is a [`Diagnostic`]
//! built from a [`DiagnosticDescriptor`] in the [`descriptors`] catalogue plus
//! the arguments that fill its message template. The same catalogue is used by
//! front ends that extract models, so one reporting channel covers both.
//!
//! # Examples
//!
//! ```rust
//! use stubforge_core::diagnostics::{descriptors, Diagnostic, Diagnostics};
//!
//! let mut diagnostics = Diagnostics::new();
//! diagnostics.push(Diagnostic::new(&descriptors::SEALED_OR_STATIC, ["Locked"]));
//!
//! assert!(diagnostics.has_errors());
//! assert_eq!(
//!     diagnostics.errors().next().unwrap().message(),
//!     "'Locked' is sealed or static and cannot be stubbed"
//! );
//! ```

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The unit is skipped.
    Error,
    /// Generation continues.
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Static description of a diagnostic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Message template with positional `{0}`, `{1}` placeholders.
    pub template: &'static str,
    pub severity: Severity,
}

/// A reported diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: &'static str,
    pub template: &'static str,
    pub severity: Severity,
    pub args: Vec<String>,
}

impl Diagnostic {
    /// Instantiate a descriptor with its template arguments.
    pub fn new<I, S>(descriptor: &DiagnosticDescriptor, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: descriptor.id,
            template: descriptor.template,
            severity: descriptor.severity,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Template with placeholders filled in. Missing arguments stay as `{n}`.
    pub fn message(&self) -> String {
        let mut message = self.template.to_string();
        for (i, arg) in self.args.iter().enumerate() {
            message = message.replace(&format!("{{{i}}}"), arg);
        }
        message
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message())
    }
}

/// An ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Shorthand for `push(Diagnostic::new(..))`.
    pub fn report<I, S>(&mut self, descriptor: &DiagnosticDescriptor, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Diagnostic::new(descriptor, args));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// Whether any diagnostic with this id was reported.
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.items {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

/// The diagnostic catalogue.
pub mod descriptors {
    use super::{DiagnosticDescriptor, Severity};

    pub const NOT_STUBBABLE: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0001",
        title: "Type cannot be stubbed",
        template: "'{0}' is not a trait, class or callback type and cannot be stubbed",
        severity: Severity::Error,
    };

    pub const SEALED_OR_STATIC: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0002",
        title: "Sealed or static base",
        template: "'{0}' is sealed or static and cannot be stubbed",
        severity: Severity::Error,
    };

    pub const NO_ACCESSIBLE_CONSTRUCTOR: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0003",
        title: "No accessible constructor",
        template: "'{0}' has no constructor accessible to a derived stub",
        severity: Severity::Error,
    };

    pub const NAME_COLLISION: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0004",
        title: "Name collision",
        template: "'{0}' in '{1}' collides with a generated name",
        severity: Severity::Error,
    };

    pub const RESERVED_NAME: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0005",
        title: "Reserved or invalid name",
        template: "'{0}' is reserved or not a valid identifier ({1})",
        severity: Severity::Error,
    };

    pub const INVALID_TYPE_PATH: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0006",
        title: "Invalid type path",
        template: "'{0}' used by '{1}' is not a valid Rust type",
        severity: Severity::Error,
    };

    pub const GENERIC_PARAMETER_NOT_STATIC: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0007",
        title: "Generic parameter is not 'static",
        template: "type parameter '{0}' of '{1}' needs a 'static bound to be intercepted per type argument",
        severity: Severity::Error,
    };

    pub const DUPLICATE_MEMBER_IN_TRAIT: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0008",
        title: "Duplicate member in one trait",
        template: "'{0}' is declared more than once by '{1}'",
        severity: Severity::Error,
    };

    pub const PUBLIC_USER_METHOD_IGNORED: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0009",
        title: "Public user implementation ignored",
        template: "'{0}' matches '{1}' but is public; make it private to use it as the fallback implementation",
        severity: Severity::Warning,
    };

    pub const MIXED_GENERIC_OVERLOADS: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0010",
        title: "Mixed generic and non-generic overloads",
        template: "overloads of '{0}' mix generic and non-generic signatures; each overload gets its own interceptor",
        severity: Severity::Warning,
    };

    pub const UNSUPPORTED_MEMBER: DiagnosticDescriptor = DiagnosticDescriptor {
        id: "SF0011",
        title: "Unsupported member",
        template: "'{0}' cannot be stubbed: {1}",
        severity: Severity::Error,
    };

    /// Every descriptor, in id order.
    pub const ALL: &[DiagnosticDescriptor] = &[
        NOT_STUBBABLE,
        SEALED_OR_STATIC,
        NO_ACCESSIBLE_CONSTRUCTOR,
        NAME_COLLISION,
        RESERVED_NAME,
        INVALID_TYPE_PATH,
        GENERIC_PARAMETER_NOT_STATIC,
        DUPLICATE_MEMBER_IN_TRAIT,
        PUBLIC_USER_METHOD_IGNORED,
        MIXED_GENERIC_OVERLOADS,
        UNSUPPORTED_MEMBER,
    ];

    /// Look up a descriptor by id.
    pub fn by_id(id: &str) -> Option<&'static DiagnosticDescriptor> {
        ALL.iter().find(|d| d.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_fills_placeholders() {
        let d = Diagnostic::new(&descriptors::NAME_COLLISION, ["from_base", "ConnStub"]);
        assert_eq!(
            d.message(),
            "'from_base' in 'ConnStub' collides with a generated name"
        );
    }

    #[test]
    fn message_keeps_missing_placeholders() {
        let d = Diagnostic::new(&descriptors::NAME_COLLISION, ["x"]);
        assert!(d.message().ends_with("in '{1}' collides with a generated name"));
    }

    #[test]
    fn display_includes_severity_and_id() {
        let d = Diagnostic::new(&descriptors::MIXED_GENERIC_OVERLOADS, ["get"]);
        assert!(d.to_string().starts_with("warning[SF0010]: overloads of 'get'"));
    }

    #[test]
    fn collection_counts() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        diagnostics.report(&descriptors::MIXED_GENERIC_OVERLOADS, ["get"]);
        assert!(!diagnostics.has_errors());
        diagnostics.report(&descriptors::SEALED_OR_STATIC, ["Locked"]);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert!(diagnostics.contains("SF0002"));
        assert!(!diagnostics.contains("SF0003"));
    }

    #[test]
    fn catalogue_ids_are_unique_and_ordered() {
        let ids: Vec<_> = descriptors::ALL.iter().map(|d| d.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
        assert_eq!(descriptors::by_id("SF0007").map(|d| d.title), Some("Generic parameter is not 'static"));
    }
}
