//! Generation pipeline.
//!
//! [`Generator`] runs each [`StubRequest`] through validation, assembly and
//! rendering. A unit that reports an error is skipped; its diagnostics are
//! returned with the outcome and the rest of the batch still runs.
//!
//! Batches are processed in parallel with `rayon`. Inline requests for the
//! same owner share a container module, so they form one work item and their
//! stub names are claimed in order.

use indexmap::IndexMap;
use proc_macro2::TokenStream;
use rayon::prelude::*;
use stubforge_core::diagnostics::descriptors;
use stubforge_core::{Diagnostic, Diagnostics, Placement, StubRequest};

use crate::assembler::ImplementationAssembler;
use crate::error::{ConfigError, RenderError};
use crate::ir::CompanionType;
use crate::naming::{self, NameAccumulator};
use crate::options::GeneratorOptions;
use crate::render::Renderer;
use crate::validation;

/// What generating one request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub stub_name: String,
    /// Owner of the container the stub is nested in, for inline requests.
    pub owner: Option<String>,
    /// Rendered stub, without its container. `None` when the unit was skipped.
    pub code: Option<String>,
    pub diagnostics: Diagnostics,
}

impl GenerationOutcome {
    fn skipped(request: &StubRequest, diagnostics: Diagnostics) -> Self {
        Self {
            stub_name: request.stub_name.clone(),
            owner: owner_of(request).map(str::to_string),
            code: None,
            diagnostics,
        }
    }

    pub fn is_generated(&self) -> bool {
        self.code.is_some()
    }
}

fn owner_of(request: &StubRequest) -> Option<&str> {
    match &request.placement {
        Placement::Standalone => None,
        Placement::Inline { owner } => Some(owner),
    }
}

/// Validates, assembles and renders stub requests.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Validate and assemble one request into its companion type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn assemble(&self, request: &StubRequest, diagnostics: &mut Diagnostics) -> Option<CompanionType> {
        if !validation::validate(request, diagnostics) {
            tracing::debug!("validation failed");
            return None;
        }
        ImplementationAssembler::new(&self.options).assemble(request, diagnostics)
    }

    /// Generate one request.
    pub fn generate(&self, request: &StubRequest) -> GenerationOutcome {
        let span = tracing::info_span!("generate", stub = %request.stub_name);
        let _enter = span.enter();

        let mut diagnostics = Diagnostics::new();
        let outcome = match self.assemble(request, &mut diagnostics) {
            Some(companion) => match self.render(&companion) {
                Ok(code) => GenerationOutcome {
                    stub_name: request.stub_name.clone(),
                    owner: owner_of(request).map(str::to_string),
                    code: Some(code),
                    diagnostics,
                },
                Err(err) => {
                    diagnostics.push(render_failure(request, &err));
                    GenerationOutcome::skipped(request, diagnostics)
                }
            },
            None => GenerationOutcome::skipped(request, diagnostics),
        };
        log_diagnostics(&outcome.diagnostics);
        outcome
    }

    /// Generate a batch in parallel. Outcomes come back in input order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn generate_batch(&self, requests: &[StubRequest]) -> Vec<GenerationOutcome> {
        let mut inline: IndexMap<&str, Vec<usize>> = IndexMap::new();
        let mut standalone = Vec::new();
        for (index, request) in requests.iter().enumerate() {
            match owner_of(request) {
                Some(owner) => inline.entry(owner).or_default().push(index),
                None => standalone.push(vec![index]),
            }
        }
        let work: Vec<Vec<usize>> = standalone.into_iter().chain(inline.into_values()).collect();
        tracing::info!(requests = requests.len(), work_items = work.len(), "generating batch");

        let results: Vec<(usize, GenerationOutcome)> = work
            .par_iter()
            .flat_map_iter(|indices| self.generate_group(requests, indices))
            .collect();

        let mut outcomes: Vec<Option<GenerationOutcome>> = vec![None; requests.len()];
        for (index, outcome) in results {
            outcomes[index] = Some(outcome);
        }
        let mut outcomes: Vec<GenerationOutcome> = outcomes.into_iter().flatten().collect();
        reject_duplicate_standalone(&mut outcomes);
        outcomes
    }

    /// Requests sharing one scope, in order. Later duplicates of a stub name
    /// are rejected.
    fn generate_group(&self, requests: &[StubRequest], indices: &[usize]) -> Vec<(usize, GenerationOutcome)> {
        let mut names = NameAccumulator::new();
        indices
            .iter()
            .map(|&index| {
                let request = &requests[index];
                let outcome = match owner_of(request) {
                    Some(owner) if !names.claim(&request.stub_name) => {
                        let mut diagnostics = Diagnostics::new();
                        diagnostics.report(
                            &descriptors::NAME_COLLISION,
                            [
                                request.stub_name.clone(),
                                naming::container_name(owner, &self.options.container_suffix),
                            ],
                        );
                        log_diagnostics(&diagnostics);
                        GenerationOutcome::skipped(request, diagnostics)
                    }
                    _ => self.generate(request),
                };
                (index, outcome)
            })
            .collect()
    }

    fn render(&self, companion: &CompanionType) -> Result<String, RenderError> {
        let renderer = Renderer::new(&self.options)?;
        Ok(renderer.render(companion)?.to_string())
    }

    /// Join generated outcomes into one source text. Standalone stubs come
    /// first in order; inline stubs are nested in one container per owner.
    pub fn source(&self, outcomes: &[GenerationOutcome]) -> Result<String, RenderError> {
        let renderer = Renderer::new(&self.options)?;
        let mut standalone = Vec::new();
        let mut containers: IndexMap<&str, Vec<TokenStream>> = IndexMap::new();
        for outcome in outcomes {
            let Some(code) = &outcome.code else { continue };
            let tokens: TokenStream = code.parse().map_err(|_| RenderError::InvalidTokens {
                stub: outcome.stub_name.clone(),
            })?;
            match &outcome.owner {
                Some(owner) => containers.entry(owner.as_str()).or_default().push(tokens),
                None => standalone.push(tokens),
            }
        }
        let mut out = TokenStream::new();
        out.extend(standalone);
        for (owner, stubs) in containers {
            out.extend(renderer.container(owner, stubs)?);
        }
        Ok(out.to_string())
    }
}

fn render_failure(request: &StubRequest, err: &RenderError) -> Diagnostic {
    Diagnostic::new(
        &descriptors::UNSUPPORTED_MEMBER,
        [request.stub_name.clone(), err.to_string()],
    )
}

/// Two standalone stubs with one name would clash at module level.
fn reject_duplicate_standalone(outcomes: &mut [GenerationOutcome]) {
    let mut names = NameAccumulator::new();
    for outcome in outcomes.iter_mut().filter(|o| o.owner.is_none() && o.is_generated()) {
        if !names.claim(&outcome.stub_name) {
            outcome.code = None;
            outcome.diagnostics.report(
                &descriptors::NAME_COLLISION,
                [outcome.stub_name.as_str(), "the batch"],
            );
            log_diagnostics(&outcome.diagnostics);
        }
    }
}

fn log_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        if diagnostic.is_error() {
            tracing::warn!(id = diagnostic.id, "{}", diagnostic.message());
        } else {
            tracing::info!(id = diagnostic.id, "{}", diagnostic.message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubforge_core::{
        ClassModel, InterfaceModel, MethodMember, Modifiers, ParameterModel, Primitive, TypeRef,
    };

    fn pinger() -> InterfaceModel {
        InterfaceModel::new("crate::Pinger").with_member(MethodMember::new("ping"))
    }

    #[test]
    fn generates_parseable_code() {
        let outcome = Generator::default().generate(&StubRequest::interfaces("PingerStub", vec![pinger()]));
        assert!(outcome.diagnostics.is_empty());
        let code = outcome.code.unwrap();
        let file = syn::parse_file(&code).unwrap();
        assert!(file.items.len() >= 3);
    }

    #[test]
    fn invalid_unit_is_skipped_with_diagnostics() {
        let sealed = ClassModel::new("crate::Locked", "crate::Lock").with_modifiers(Modifiers::SEALED);
        let outcome = Generator::default().generate(&StubRequest::class("LockedStub", sealed));
        assert!(!outcome.is_generated());
        assert!(outcome.diagnostics.contains("SF0002"));
    }

    #[test]
    fn batch_keeps_input_order_and_isolates_failures() {
        let requests = vec![
            StubRequest::interfaces("AStub", vec![pinger()]),
            StubRequest::interfaces("BadStub", vec![]),
            StubRequest::interfaces("CStub", vec![pinger()]).inline_in("crate::tests::Suite"),
            StubRequest::interfaces("DStub", vec![pinger()]),
        ];
        let outcomes = Generator::default().generate_batch(&requests);
        let names: Vec<_> = outcomes.iter().map(|o| o.stub_name.as_str()).collect();
        assert_eq!(names, vec!["AStub", "BadStub", "CStub", "DStub"]);
        assert!(outcomes[0].is_generated());
        assert!(outcomes[1].diagnostics.contains("SF0001"));
        assert_eq!(outcomes[2].owner.as_deref(), Some("crate::tests::Suite"));
        assert!(outcomes[3].is_generated());
    }

    #[test]
    fn duplicate_inline_names_collide() {
        let requests = vec![
            StubRequest::interfaces("Dup", vec![pinger()]).inline_in("crate::Suite"),
            StubRequest::interfaces("Dup", vec![pinger()]).inline_in("crate::Suite"),
            StubRequest::interfaces("Dup", vec![pinger()]).inline_in("crate::Other"),
        ];
        let outcomes = Generator::default().generate_batch(&requests);
        assert!(outcomes[0].is_generated());
        assert!(outcomes[1].diagnostics.contains("SF0004"));
        assert!(outcomes[2].is_generated());
    }

    #[test]
    fn duplicate_standalone_names_collide() {
        let requests = vec![
            StubRequest::interfaces("Dup", vec![pinger()]),
            StubRequest::interfaces("Dup", vec![pinger()]),
        ];
        let outcomes = Generator::default().generate_batch(&requests);
        assert!(outcomes[0].is_generated());
        assert!(!outcomes[1].is_generated());
        assert!(outcomes[1].diagnostics.contains("SF0004"));
    }

    #[test]
    fn source_nests_inline_stubs_per_owner() {
        let finder = InterfaceModel::new("crate::Finder").with_member(
            MethodMember::new("find")
                .with_param(ParameterModel::new("id", TypeRef::Primitive(Primitive::I32)))
                .returning(TypeRef::text().nullable()),
        );
        let requests = vec![
            StubRequest::interfaces("PingerStub", vec![pinger()]).inline_in("crate::Suite"),
            StubRequest::interfaces("FinderStub", vec![finder]).inline_in("crate::Suite"),
            StubRequest::interfaces("TopStub", vec![pinger()]),
        ];
        let generator = Generator::default();
        let outcomes = generator.generate_batch(&requests);
        let file = syn::parse_file(&generator.source(&outcomes).unwrap()).unwrap();
        let containers: Vec<_> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Mod(m) if m.ident == "suite_stubs" => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(containers.len(), 1);
        let nested = containers[0].content.as_ref().map(|(_, items)| items.len()).unwrap_or(0);
        assert!(nested > 4);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = GeneratorOptions::default().with_runtime_path("not a path");
        assert!(matches!(
            Generator::new(options),
            Err(ConfigError::InvalidRuntimePath { .. })
        ));
    }
}
