//! Exact-match signature keys.
//!
//! Used to match hand-written implementations against generated members and
//! to de-duplicate members reached through several paths (multiple interfaces,
//! deep base-class chains).

use std::fmt;

use crate::member::{MethodMember, ParameterModel, PassingMode, Receiver};

/// The identity of a Rust function signature, ignoring parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    pub name: String,
    pub receiver: Receiver,
    /// Passing mode and rendered type per parameter.
    pub params: Vec<(PassingMode, String)>,
    pub returns: String,
    pub type_param_count: usize,
}

impl SignatureKey {
    /// Build a key from parts.
    pub fn new<'a>(
        name: impl Into<String>,
        receiver: Receiver,
        params: impl IntoIterator<Item = &'a ParameterModel>,
        returns: String,
        type_param_count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            receiver,
            params: params
                .into_iter()
                .map(|p| (normalize(p.mode), p.ty.to_string()))
                .collect(),
            returns,
            type_param_count,
        }
    }

    /// Key of a method.
    pub fn of_method(method: &MethodMember) -> Self {
        Self::new(
            &method.name,
            method.receiver,
            &method.parameters,
            method.return_type.to_string(),
            method.type_parameters.len(),
        )
    }
}

/// `ByRef` and `Out` both render as `&mut T`.
fn normalize(mode: PassingMode) -> PassingMode {
    match mode {
        PassingMode::Out => PassingMode::ByRef,
        other => other,
    }
}

impl fmt::Display for SignatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let receiver = match self.receiver {
            Receiver::Shared => "&self",
            Receiver::Exclusive => "&mut self",
        };
        write!(f, "fn {}", self.name)?;
        if self.type_param_count > 0 {
            write!(f, "<{}>", vec!["_"; self.type_param_count].join(", "))?;
        }
        write!(f, "({receiver}")?;
        for (mode, ty) in &self.params {
            match mode {
                PassingMode::ByValue => write!(f, ", {ty}")?,
                PassingMode::In => write!(f, ", &{ty}")?,
                PassingMode::ByRef | PassingMode::Out => write!(f, ", &mut {ty}")?,
            }
        }
        write!(f, ") -> {}", self.returns)
    }
}
