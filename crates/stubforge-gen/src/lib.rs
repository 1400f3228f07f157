//! Stub synthesis for stubforge.
//!
//! Given an interface or base-class model, the generator produces a companion
//! stub type that records every invocation, lets tests override each member,
//! and falls back to safe defaults or to a clear failure.
//!
//! ## Pipeline
//!
//! 1. [`validation`] - reject unsupported input with structured diagnostics
//! 2. [`overload`] - group same-named methods into overload sets
//! 3. [`defaults`] - classify how each type gets a default value
//! 4. [`handlers`] / [`generic`] - derive one interceptor per member
//! 5. [`assembler`] - build the companion type and every fallback chain
//! 6. [`render`] - emit Rust tokens
//!
//! [`Generator`] runs the whole pipeline, one request or a parallel batch.
//!
//! # Examples
//!
//! ```rust
//! use stubforge_core::{InterfaceModel, MethodMember, StubRequest};
//! use stubforge_gen::Generator;
//!
//! let pinger = InterfaceModel::new("crate::Pinger").with_member(MethodMember::new("ping"));
//! let outcome = Generator::default().generate(&StubRequest::interfaces("PingerStub", vec![pinger]));
//!
//! assert!(outcome.diagnostics.is_empty());
//! assert!(outcome.code.unwrap().contains("PingerStub"));
//! ```

pub mod assembler;
pub mod defaults;
mod error;
pub mod generic;
pub mod handlers;
pub mod ir;
pub mod naming;
mod options;
pub mod overload;
mod pipeline;
pub mod render;
pub mod validation;

pub use assembler::ImplementationAssembler;
pub use defaults::{ConcreteType, DefaultValueResolver, DefaultValueStrategy};
pub use error::{ConfigError, RenderError};
pub use generic::{GenericDispatchDef, GenericDispatchSynthesizer};
pub use handlers::{HandlerSynthesizer, InterceptorDef};
pub use ir::CompanionType;
pub use options::GeneratorOptions;
pub use overload::{OverloadGroup, group_overloads};
pub use pipeline::{GenerationOutcome, Generator};
pub use render::Renderer;
