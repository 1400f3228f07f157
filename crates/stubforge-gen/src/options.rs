//! Generator configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Knobs that shape generated code without changing its behavior.
///
/// Every field has a default, so a JSON document only needs the fields it
/// changes:
///
/// ```rust
/// use stubforge_gen::GeneratorOptions;
///
/// let options = GeneratorOptions::from_json(r#"{"emit_docs": false}"#).unwrap();
/// assert_eq!(options.runtime_path, "::stubforge_runtime");
/// assert!(!options.emit_docs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Path generated code uses to reach the runtime support crate.
    pub runtime_path: String,
    /// Suffix of per-member interceptor type names.
    pub interceptor_suffix: String,
    /// Suffix of per-interface bundle type names.
    pub bundle_suffix: String,
    /// Suffix of the per-stub module holding interceptor types.
    pub module_suffix: String,
    /// Suffix of the container module that holds inline stubs.
    pub container_suffix: String,
    /// Emit `///` docs on generated items.
    pub emit_docs: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_path: "::stubforge_runtime".to_string(),
            interceptor_suffix: "Interceptor".to_string(),
            bundle_suffix: "Interceptors".to_string(),
            module_suffix: "_interceptors".to_string(),
            container_suffix: "_stubs".to_string(),
            emit_docs: true,
        }
    }
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate options from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: GeneratorOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Builder: point generated code at another runtime path.
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Builder: toggle generated docs.
    pub fn with_docs(mut self, emit_docs: bool) -> Self {
        self.emit_docs = emit_docs;
        self
    }

    /// Check that every option can be spliced into Rust source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if syn::parse_str::<syn::Path>(&self.runtime_path).is_err() {
            return Err(ConfigError::InvalidRuntimePath {
                path: self.runtime_path.clone(),
            });
        }
        let required = [
            ("interceptor_suffix", &self.interceptor_suffix),
            ("bundle_suffix", &self.bundle_suffix),
            ("module_suffix", &self.module_suffix),
            ("container_suffix", &self.container_suffix),
        ];
        for (option, value) in required {
            if value.is_empty() {
                return Err(ConfigError::EmptyOption { option });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GeneratorOptions::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let options = GeneratorOptions::from_json(r#"{"container_suffix": "_mocks"}"#).unwrap();
        assert_eq!(options.container_suffix, "_mocks");
        assert_eq!(options.bundle_suffix, "Interceptors");
    }

    #[test]
    fn rejects_invalid_runtime_path() {
        let err = GeneratorOptions::from_json(r#"{"runtime_path": "not a path"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRuntimePath { .. }));
    }

    #[test]
    fn rejects_empty_suffix() {
        let err = GeneratorOptions::from_json(r#"{"module_suffix": ""}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyOption {
                option: "module_suffix"
            }
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            GeneratorOptions::from_json("[").unwrap_err(),
            ConfigError::Json(_)
        ));
    }
}
