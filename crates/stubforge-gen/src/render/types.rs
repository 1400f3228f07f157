//! The stub struct and its inherent items.

use proc_macro2::TokenStream;
use quote::quote;

use super::{Ctx, arg_names, fn_params, ident, parse_path, parse_type};
use crate::error::RenderError;
use crate::ir::StubShape;

pub(super) fn stub(ctx: &Ctx<'_>) -> Result<TokenStream, RenderError> {
    let companion = ctx.companion;
    let stub = &ctx.stub;
    let module = &ctx.module;
    let rt = ctx.rt();

    let mut fields = Vec::new();
    let mut inits = Vec::new();
    let mut resets = Vec::new();
    for bundle in &companion.bundles {
        let field = ident(&bundle.field)?;
        let type_name = ident(&bundle.type_name)?;
        let doc = ctx.doc(&format!("Interceptors for `{}`.", bundle.source));
        fields.push(quote! {
            #doc
            pub #field: #module::#type_name
        });
        inits.push(quote!(#field: ::std::default::Default::default()));
        resets.push(quote!(self.#field.reset();));
    }
    if let Some(name) = &companion.runtime_defaults {
        let field = ident(name)?;
        let doc = ctx.doc("Last-resort defaults for generic members, looked up by type.");
        fields.push(quote! {
            #doc
            pub #field: #rt::DefaultProvider
        });
        inits.push(quote!(#field: ::std::default::Default::default()));
    }

    let conversions = companion
        .conversions
        .iter()
        .map(|c| {
            let name = ident(&c.fn_name)?;
            let trait_path = parse_path(&c.trait_path)?;
            let doc = ctx.doc(&format!("This stub viewed as `{}`.", c.trait_path));
            Ok(quote! {
                #doc
                pub fn #name(&self) -> &impl #trait_path {
                    self
                }
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    let reset_doc = ctx.doc("Reset every interceptor. Backing values and subscribers are kept.");
    let reset = quote! {
        #reset_doc
        pub fn reset_interceptors(&self) {
            #(#resets)*
        }
    };

    let struct_doc = ctx.doc(&format!("Generated stub `{}`.", companion.stub_name));
    Ok(match &companion.shape {
        StubShape::Interfaces => quote! {
            #struct_doc
            pub struct #stub {
                #(#fields,)*
            }

            impl #stub {
                pub fn new() -> Self {
                    Self {
                        #(#inits,)*
                    }
                }

                #reset
                #(#conversions)*
            }

            impl ::std::default::Default for #stub {
                fn default() -> Self {
                    Self::new()
                }
            }
        },
        StubShape::Class {
            base_type,
            constructors,
        } => {
            let base = parse_type(base_type)?;
            let ctors = constructors
                .iter()
                .map(|ctor| {
                    let name = ident(&ctor.name)?;
                    let params = fn_params(&ctor.params)?;
                    let args = arg_names(&ctor.params)?;
                    let doc = ctx.doc(&format!("Forwards to `{base_type}::{}`.", ctor.name));
                    Ok(quote! {
                        #doc
                        pub fn #name(#(#params),*) -> Self {
                            Self::from_base(<#base>::#name(#(#args),*))
                        }
                    })
                })
                .collect::<Result<Vec<_>, RenderError>>()?;
            let from_base_doc = ctx.doc("Wrap an existing base value.");
            quote! {
                #struct_doc
                pub struct #stub {
                    base: #base,
                    #(#fields,)*
                }

                impl #stub {
                    #(#ctors)*

                    #from_base_doc
                    pub fn from_base(base: #base) -> Self {
                        Self {
                            base,
                            #(#inits,)*
                        }
                    }

                    #reset
                    #(#conversions)*
                }

                impl ::std::ops::Deref for #stub {
                    type Target = #base;

                    fn deref(&self) -> &Self::Target {
                        &self.base
                    }
                }

                impl ::std::ops::DerefMut for #stub {
                    fn deref_mut(&mut self) -> &mut Self::Target {
                        &mut self.base
                    }
                }
            }
        }
    })
}
