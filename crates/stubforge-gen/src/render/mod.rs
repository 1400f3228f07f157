//! Rust rendering of companion types.
//!
//! The [`Renderer`] turns an assembled [`CompanionType`] into a token stream.
//! Every runtime item is referenced through the configured runtime crate path,
//! so the emitted code needs no imports besides the user's own types.
//!
//! ## Components
//!
//! - [`types`] - the stub struct, its constructors and conversion helpers
//! - [`interceptors`] - the interceptor module: bundles, interceptors, registries
//! - [`members`] - trait impls and their fallback chains

mod interceptors;
mod members;
mod types;

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use stubforge_core::{ParameterModel, PassingMode, TypeParameterModel, TypeRef};

use crate::error::RenderError;
use crate::ir::CompanionType;
use crate::naming;
use crate::options::GeneratorOptions;

/// Renders companion types with one set of options.
#[derive(Debug, Clone)]
pub struct Renderer<'a> {
    options: &'a GeneratorOptions,
    runtime: syn::Path,
}

impl<'a> Renderer<'a> {
    pub fn new(options: &'a GeneratorOptions) -> Result<Self, RenderError> {
        Ok(Self {
            options,
            runtime: parse_path(&options.runtime_path)?,
        })
    }

    /// Render one stub with its interceptor module.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn render(&self, companion: &CompanionType) -> Result<TokenStream, RenderError> {
        let ctx = Ctx::new(self, companion)?;
        let stub = types::stub(&ctx)?;
        let module = interceptors::module(&ctx)?;
        let impls = members::trait_impls(&ctx)?;
        Ok(quote! {
            #stub
            #module
            #impls
        })
    }

    /// Nest already rendered stubs in the well-known container of `owner`.
    pub fn container(
        &self,
        owner: &str,
        stubs: impl IntoIterator<Item = TokenStream>,
    ) -> Result<TokenStream, RenderError> {
        let name = ident(&naming::container_name(owner, &self.options.container_suffix))?;
        let stubs = stubs.into_iter();
        let doc = self.doc(&format!("Stubs declared by `{owner}`."));
        Ok(quote! {
            #doc
            pub mod #name {
                #[allow(unused_imports)]
                use super::*;
                #(#stubs)*
            }
        })
    }

    /// `#[doc = ..]` when docs are enabled.
    fn doc(&self, text: &str) -> TokenStream {
        if self.options.emit_docs {
            let text = format!(" {text}");
            quote!(#[doc = #text])
        } else {
            TokenStream::new()
        }
    }
}

/// Everything the rendering passes share for one companion type.
pub(crate) struct Ctx<'r> {
    renderer: &'r Renderer<'r>,
    pub companion: &'r CompanionType,
    pub stub: Ident,
    pub module: Ident,
}

impl<'r> Ctx<'r> {
    fn new(renderer: &'r Renderer<'r>, companion: &'r CompanionType) -> Result<Self, RenderError> {
        Ok(Self {
            renderer,
            companion,
            stub: ident(&companion.stub_name)?,
            module: ident(&companion.module)?,
        })
    }

    /// The runtime crate path.
    pub fn rt(&self) -> &syn::Path {
        &self.renderer.runtime
    }

    pub fn doc(&self, text: &str) -> TokenStream {
        self.renderer.doc(text)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Identifier for `name`, raw when it is a keyword.
pub(crate) fn ident(name: &str) -> Result<Ident, RenderError> {
    if !naming::is_valid_ident(name) {
        return Err(RenderError::InvalidIdent {
            name: name.to_string(),
        });
    }
    if naming::is_keyword(name) {
        Ok(Ident::new_raw(name, Span::call_site()))
    } else {
        Ok(Ident::new(name, Span::call_site()))
    }
}

pub(crate) fn parse_type(text: &str) -> Result<syn::Type, RenderError> {
    syn::parse_str(text).map_err(|_| RenderError::InvalidType {
        text: text.to_string(),
    })
}

pub(crate) fn parse_path(text: &str) -> Result<syn::Path, RenderError> {
    syn::parse_str(text).map_err(|_| RenderError::InvalidPath {
        text: text.to_string(),
    })
}

pub(crate) fn ty(ty: &TypeRef) -> Result<syn::Type, RenderError> {
    parse_type(&ty.to_string())
}

/// Type of a parameter as it appears in a signature.
pub(crate) fn signature_ty(param: &ParameterModel) -> Result<syn::Type, RenderError> {
    parse_type(&param.signature_type())
}

/// `name: Type` for each parameter.
pub(crate) fn fn_params(params: &[ParameterModel]) -> Result<Vec<TokenStream>, RenderError> {
    params
        .iter()
        .map(|p| {
            let name = ident(&p.name)?;
            let ty = signature_ty(p)?;
            Ok(quote!(#name: #ty))
        })
        .collect()
}

/// Parameter names, for forwarding calls.
pub(crate) fn arg_names(params: &[ParameterModel]) -> Result<Vec<Ident>, RenderError> {
    params.iter().map(|p| ident(&p.name)).collect()
}

/// Owned copy of an argument for recording.
pub(crate) fn owned_arg(param: &ParameterModel) -> Result<TokenStream, RenderError> {
    let name = ident(&param.name)?;
    Ok(match param.mode {
        PassingMode::ByValue => quote!(::std::clone::Clone::clone(&#name)),
        PassingMode::In | PassingMode::ByRef | PassingMode::Out => {
            quote!(::std::borrow::ToOwned::to_owned(&*#name))
        }
    })
}

/// The single owned argument, or a tuple of them.
pub(crate) fn owned_tuple_expr(params: &[ParameterModel]) -> Result<TokenStream, RenderError> {
    let items = params.iter().map(owned_arg).collect::<Result<Vec<_>, _>>()?;
    Ok(match items.as_slice() {
        [single] => single.clone(),
        many => quote!((#(#many),*)),
    })
}

/// `<T: bounds, U: bounds>`, or nothing.
pub(crate) fn generics(params: &[TypeParameterModel]) -> Result<TokenStream, RenderError> {
    if params.is_empty() {
        return Ok(TokenStream::new());
    }
    let params = params
        .iter()
        .map(|tp| {
            let name = ident(&tp.name)?;
            let bounds = tp
                .rust_bounds()
                .iter()
                .map(|b| {
                    syn::parse_str::<syn::TypeParamBound>(b)
                        .map_err(|_| RenderError::InvalidType { text: b.clone() })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if bounds.is_empty() {
                Ok(quote!(#name))
            } else {
                Ok(quote!(#name: #(#bounds)+*))
            }
        })
        .collect::<Result<Vec<_>, RenderError>>()?;
    Ok(quote!(<#(#params),*>))
}

/// `<T, U>`, or nothing.
pub(crate) fn generic_args(params: &[TypeParameterModel]) -> Result<TokenStream, RenderError> {
    if params.is_empty() {
        return Ok(TokenStream::new());
    }
    let names = params.iter().map(|tp| ident(&tp.name)).collect::<Result<Vec<_>, _>>()?;
    Ok(quote!(<#(#names),*>))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubforge_core::{ConstraintKind, Primitive};

    #[test]
    fn keywords_become_raw_identifiers() {
        assert_eq!(ident("type").unwrap().to_string(), "r#type");
        assert_eq!(ident("find").unwrap().to_string(), "find");
        assert!(matches!(ident("self"), Err(RenderError::InvalidIdent { .. })));
    }

    #[test]
    fn owned_args_follow_passing_mode() {
        let by_value = ParameterModel::new("id", TypeRef::Primitive(Primitive::I32));
        assert_eq!(
            owned_arg(&by_value).unwrap().to_string(),
            quote!(::std::clone::Clone::clone(&id)).to_string()
        );
        let borrowed = ParameterModel::new("name", TypeRef::text()).with_mode(PassingMode::In);
        assert_eq!(
            owned_arg(&borrowed).unwrap().to_string(),
            quote!(::std::borrow::ToOwned::to_owned(&*name)).to_string()
        );
    }

    #[test]
    fn generics_render_bounds() {
        let params = vec![
            TypeParameterModel::new("T")
                .with_constraint(ConstraintKind::Static)
                .with_constraint(ConstraintKind::Bound("Clone".into())),
            TypeParameterModel::new("U"),
        ];
        let parsed: syn::Generics = syn::parse2(generics(&params).unwrap()).unwrap();
        assert_eq!(parsed.params.len(), 2);
        assert_eq!(generic_args(&params).unwrap().to_string(), quote!(<T, U>).to_string());
        assert!(generics(&[]).unwrap().is_empty());
    }

    #[test]
    fn invalid_type_text_is_an_error() {
        assert!(matches!(
            parse_type("Vec<"),
            Err(RenderError::InvalidType { .. })
        ));
    }
}
