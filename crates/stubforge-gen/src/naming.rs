//! Naming rules for generated items.
//!
//! Every generated name is derived from the model alone, so regenerating the
//! same model always yields the same names.
//!
//! | Item                     | Rule                                            |
//! |--------------------------|-------------------------------------------------|
//! | bundle field on the stub | `snake(interface)`, plus `_` on collision       |
//! | bundle type              | `Pascal(interface) + bundle suffix`             |
//! | interceptor field        | `snake(member)`, plus the 1-based overload index|
//! | interceptor type         | `Pascal(interface) + Pascal(field) + suffix`    |
//! | interceptor module       | `snake(stub) + module suffix`                   |
//! | inline container         | `snake(owner) + container suffix`               |
//! | conversion helper        | `as_ + snake(trait)`                            |

use rustc_hash::FxHashSet;

/// Strict and reserved Rust keywords.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super", "_"];

/// Names the generated code itself defines on every stub.
pub const RESERVED_STUB_ITEMS: &[&str] = &[
    "new",
    "from_base",
    "base",
    "reset_interceptors",
    "runtime_defaults",
];

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Whether `name` can be used as an identifier, raw if needed.
pub fn is_valid_ident(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') || name == "_" {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_') && !NON_RAW_KEYWORDS.contains(&name)
}

/// `FindById` / `findById` / `HTTPServer` to `find_by_id` / `find_by_id` / `http_server`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            if !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `find_by_id` / `findById` to `FindById`.
pub fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split(['_', '-', ' ']).filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Field name of an interface's bundle on the stub.
///
/// Appends exactly one `_` when the plain name collides with one of the
/// interface's own members. `member_names` carries both the declared member
/// names and the generated function names (`set_x`, `add_x`, `remove_x`), so
/// an event named like its interface counts as a collision too.
pub fn bundle_field_name<'a>(
    simple_name: &str,
    member_names: impl IntoIterator<Item = &'a str>,
) -> String {
    let base = to_snake_case(simple_name);
    let collides = member_names.into_iter().any(|name| name == base);
    if collides || is_keyword(&base) {
        format!("{base}_")
    } else {
        base
    }
}

pub fn bundle_type_name(simple_name: &str, suffix: &str) -> String {
    format!("{}{suffix}", to_pascal_case(simple_name))
}

/// Field name of a member's interceptor inside its bundle.
pub fn interceptor_field_name(member_name: &str, overload_index: Option<usize>) -> String {
    let base = to_snake_case(member_name);
    match overload_index {
        Some(index) => format!("{base}{index}"),
        None => base,
    }
}

pub fn interceptor_type_name(interface_simple: &str, field: &str, suffix: &str) -> String {
    format!(
        "{}{}{suffix}",
        to_pascal_case(interface_simple),
        to_pascal_case(field)
    )
}

/// Type name of the per-type-argument interceptor behind a generic method.
pub fn typed_interceptor_type_name(interface_simple: &str, field: &str, suffix: &str) -> String {
    format!(
        "{}{}Typed{suffix}",
        to_pascal_case(interface_simple),
        to_pascal_case(field)
    )
}

pub fn module_name(stub_name: &str, suffix: &str) -> String {
    format!("{}{suffix}", to_snake_case(stub_name))
}

pub fn container_name(owner: &str, suffix: &str) -> String {
    format!("{}{suffix}", to_snake_case(last_segment(owner)))
}

pub fn conversion_name(trait_path: &str) -> String {
    format!("as_{}", to_snake_case(last_segment(trait_path)))
}

/// Qualified member name used in failure messages, e.g. `Repository::find`.
pub fn qualified_member(owner_simple: &str, member: &str) -> String {
    format!("{owner_simple}::{member}")
}

/// Value parameter of an indexer setter, kept clear of the key names.
pub fn setter_value_name<'a>(key_names: impl IntoIterator<Item = &'a str>) -> String {
    NameAccumulator::with_reserved(key_names).claim_unique("value")
}

/// Names already taken in one scope.
///
/// Threaded explicitly through every step that introduces names into a shared
/// scope (stub fields, container items, conversion helpers).
#[derive(Debug, Default, Clone)]
pub struct NameAccumulator {
    used: FxHashSet<String>,
}

impl NameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed with names that are already taken.
    pub fn with_reserved<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut acc = Self::new();
        for name in names {
            acc.used.insert(name.to_string());
        }
        acc
    }

    /// Take `name`. Returns `false` if it was already taken.
    pub fn claim(&mut self, name: &str) -> bool {
        self.used.insert(name.to_string())
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Take `base`, or the first free `base2`, `base3`, ...
    pub fn claim_unique(&mut self, base: &str) -> String {
        if self.claim(base) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}{n}");
            if self.claim(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
