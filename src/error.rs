use stubforge_core::ModelError;
use stubforge_gen::{ConfigError, RenderError};
use thiserror::Error;

/// Errors surfaced by the facade helpers.
///
/// Problems with individual stubs are not errors: they are reported as
/// diagnostics on each outcome.
#[derive(Debug, Error)]
pub enum StubforgeError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
