//! Generator errors.

use thiserror::Error;

/// Errors raised while loading [`GeneratorOptions`](crate::GeneratorOptions).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid generator options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("runtime path '{path}' is not a valid Rust path")]
    InvalidRuntimePath { path: String },

    #[error("option '{option}' must not be empty")]
    EmptyOption { option: &'static str },
}

/// Errors raised while turning an assembled companion type into tokens.
///
/// The validator catches these up front; a render error that still occurs is
/// reported as a diagnostic for its unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("'{name}' is not a valid identifier")]
    InvalidIdent { name: String },

    #[error("'{text}' is not a valid Rust type")]
    InvalidType { text: String },

    #[error("'{text}' is not a valid Rust path")]
    InvalidPath { text: String },

    #[error("'{member}' records calls but has no interceptor")]
    MissingInterceptor { member: String },

    #[error("generated code for '{stub}' does not lex as Rust tokens")]
    InvalidTokens { stub: String },

    #[error("'{member}' forwards to a base value but the stub wraps none")]
    MissingBase { member: String },
}
