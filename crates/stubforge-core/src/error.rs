//! Model errors.

use thiserror::Error;

/// Errors raised while loading models.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The JSON document could not be parsed into a model.
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required name was empty.
    #[error("missing required name: {what}")]
    MissingName { what: String },
}
