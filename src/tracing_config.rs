//! Opt-in tracing output.
//!
//! `STUBFORGE_LOG` sets the filter (falling back to `RUST_LOG`) with the usual
//! `EnvFilter` syntax, and `STUBFORGE_LOG_FORMAT` picks `text` (default) or
//! `json`:
//!
//! ```bash
//! STUBFORGE_LOG=stubforge_gen=debug STUBFORGE_LOG_FORMAT=json cargo test
//! ```
//!
//! Without either filter variable nothing is installed.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        std::env::var("STUBFORGE_LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

fn build_filter() -> Option<EnvFilter> {
    if let Ok(val) = std::env::var("STUBFORGE_LOG") {
        Some(EnvFilter::builder().parse_lossy(val))
    } else if std::env::var("RUST_LOG").is_ok() {
        Some(EnvFilter::from_default_env())
    } else {
        None
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Returns whether a subscriber was installed by this call. Calling it again,
/// or after another subscriber was set, is harmless.
pub fn init_tracing() -> bool {
    let Some(filter) = build_filter() else {
        return false;
    };
    match LogFormat::from_env() {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .is_ok(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}
