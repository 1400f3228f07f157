//! stubforge generates recording, overridable stub types.
//!
//! A front end extracts an interface or base-class model from its source and
//! hands it over as a [`StubRequest`]. The generator answers with Rust source
//! for a companion stub plus structured diagnostics; the generated code links
//! against [`runtime`].
//!
//! - [`model`] - shared model and diagnostics
//! - [`generator`] - the generation pipeline
//! - [`runtime`] - building blocks used by generated stubs
//! - [`tracing_config`] - opt-in log output
//!
//! # Examples
//!
//! ```rust
//! use stubforge::prelude::*;
//!
//! let pinger = InterfaceModel::new("crate::Pinger").with_member(MethodMember::new("ping"));
//! let request = StubRequest::interfaces("PingerStub", vec![pinger]);
//!
//! let (source, outcomes) = stubforge::generate_source(&[request], GeneratorOptions::default()).unwrap();
//! assert!(outcomes[0].diagnostics.is_empty());
//! assert!(source.contains("PingerStub"));
//! ```

mod error;
pub mod tracing_config;

pub use error::StubforgeError;

pub mod model {
    pub use stubforge_core::*;
}

pub mod generator {
    pub use stubforge_gen::*;
}

pub mod runtime {
    pub use stubforge_runtime::*;
}

pub mod prelude {
    pub use stubforge_core::diagnostics::descriptors;
    pub use stubforge_core::{
        Accessibility, ClassModel, ConstraintKind, ConstructorModel, Diagnostic, Diagnostics,
        EventMember, InterfaceModel, MethodMember, Modifiers, ParameterModel, PassingMode,
        Primitive, PropertyMember, Receiver, Severity, StubRequest, TypeParameterModel, TypeRef,
        TypeShape,
    };
    pub use stubforge_gen::{GenerationOutcome, Generator, GeneratorOptions};

    pub use crate::StubforgeError;
}

use stubforge_core::StubRequest;
use stubforge_gen::{GenerationOutcome, Generator, GeneratorOptions};

/// Generate a batch and join every generated stub into one source text.
///
/// Units with errors are left out of the source; their diagnostics are in
/// the returned outcomes, which keep input order.
pub fn generate_source(
    requests: &[StubRequest],
    options: GeneratorOptions,
) -> Result<(String, Vec<GenerationOutcome>), StubforgeError> {
    let generator = Generator::new(options)?;
    let outcomes = generator.generate_batch(requests);
    let source = generator.source(&outcomes)?;
    tracing::info!(
        requested = requests.len(),
        generated = outcomes.iter().filter(|o| o.is_generated()).count(),
        "generated stub source"
    );
    Ok((source, outcomes))
}

/// [`generate_source`] for JSON input: an array of requests and an optional
/// options document.
pub fn generate_from_json(
    requests_json: &str,
    options_json: Option<&str>,
) -> Result<(String, Vec<GenerationOutcome>), StubforgeError> {
    let requests = StubRequest::batch_from_json(requests_json)?;
    let options = match options_json {
        Some(json) => GeneratorOptions::from_json(json)?,
        None => GeneratorOptions::default(),
    };
    generate_source(&requests, options)
}
