//! The per-stub interceptor module.
//!
//! Interceptor state fields are `pub(super)` so the stub's trait impls can
//! record into them; tests read them through accessor methods of the same
//! name.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use stubforge_core::{EventShape, ParameterModel, TypeRef};

use super::{Ctx, generic_args, generics, ident, owned_tuple_expr, parse_type, signature_ty, ty};
use crate::error::RenderError;
use crate::generic::GenericDispatchDef;
use crate::handlers::{
    Backing, CallbackSlot, EventSurface, InterceptorDef, TrackingField, owned_tuple, raise_return,
};
use crate::ir::{Bundle, BundleEntry};
use crate::naming;

pub(super) fn module(ctx: &Ctx<'_>) -> Result<TokenStream, RenderError> {
    let module = &ctx.module;
    let mut items = Vec::new();
    for bundle in &ctx.companion.bundles {
        items.push(bundle_struct(ctx, bundle)?);
        for entry in &bundle.entries {
            items.push(match entry {
                BundleEntry::Plain(def) => interceptor(ctx, def)?,
                BundleEntry::Generic(dispatch) => registry(ctx, dispatch)?,
            });
        }
    }
    let doc = ctx.doc(&format!("Interceptor types of `{}`.", ctx.companion.stub_name));
    Ok(quote! {
        #doc
        #[allow(dead_code)]
        pub mod #module {
            #[allow(unused_imports)]
            use super::*;

            #(#items)*
        }
    })
}

fn bundle_struct(ctx: &Ctx<'_>, bundle: &Bundle) -> Result<TokenStream, RenderError> {
    let name = ident(&bundle.type_name)?;
    let mut fields = Vec::new();
    let mut resets = Vec::new();
    for entry in &bundle.entries {
        let field = ident(entry.field())?;
        let type_name = ident(entry.type_name())?;
        fields.push(quote!(pub #field: #type_name));
        resets.push(quote!(self.#field.reset();));
    }
    let doc = ctx.doc(&format!("One interceptor per member of `{}`.", bundle.source));
    Ok(quote! {
        #doc
        #[derive(Default)]
        pub struct #name {
            #(#fields,)*
        }

        impl #name {
            pub fn reset(&self) {
                #(#resets)*
            }
        }
    })
}

// ============================================================================
// Interceptors
// ============================================================================

/// Field declarations, accessor methods and reset statements of one interceptor.
struct Parts {
    fields: Vec<TokenStream>,
    inits: Vec<TokenStream>,
    methods: Vec<TokenStream>,
    resets: Vec<TokenStream>,
}

fn parts(ctx: &Ctx<'_>, def: &InterceptorDef) -> Result<Parts, RenderError> {
    let rt = ctx.rt();
    let mut parts = Parts {
        fields: Vec::new(),
        inits: Vec::new(),
        methods: Vec::new(),
        resets: Vec::new(),
    };

    for tracking in &def.tracking {
        let name = ident(tracking.name())?;
        match tracking {
            TrackingField::WasCalled => parts.methods.push(quote! {
                pub fn #name(&self) -> bool {
                    self.call_count.get() > 0
                }
            }),
            TrackingField::HasSubscribers => parts.methods.push(quote! {
                pub fn #name(&self) -> bool {
                    !self.subscribers.is_empty()
                }
            }),
            counter if counter.is_counter() => {
                parts.fields.push(quote!(pub(super) #name: #rt::Counter));
                parts.inits.push(quote!(#name: ::std::default::Default::default()));
                parts.methods.push(quote! {
                    pub fn #name(&self) -> usize {
                        self.#name.get()
                    }
                });
                parts.resets.push(quote!(self.#name.reset();));
            }
            TrackingField::AllRaises(payload) => {
                let item = ty(&owned_tuple(payload))?;
                parts.fields.push(quote!(pub(super) #name: #rt::History<#item>));
                parts.inits.push(quote!(#name: ::std::default::Default::default()));
                parts.methods.push(quote! {
                    pub fn #name(&self) -> ::std::vec::Vec<#item> {
                        self.#name.all()
                    }
                });
                parts.resets.push(quote!(self.#name.clear();));
            }
            recorded => {
                let Some(recorded_ty) = recorded.recorded_type() else {
                    continue;
                };
                let item = ty(&recorded_ty)?;
                parts.fields.push(quote!(pub(super) #name: #rt::LastValue<#item>));
                parts.inits.push(quote!(#name: ::std::default::Default::default()));
                parts.methods.push(quote! {
                    pub fn #name(&self) -> ::std::option::Option<#item> {
                        self.#name.get()
                    }
                });
                parts.resets.push(quote!(self.#name.clear();));
            }
        }
    }

    for slot in &def.slots {
        let name = ident(slot.kind.name())?;
        let callable = callback_bounds(ctx, slot)?;
        parts.fields.push(quote!(pub(super) #name: #rt::Slot<dyn #callable>));
        parts.inits.push(quote!(#name: ::std::default::Default::default()));
        parts.methods.push(quote! {
            pub fn #name(&self, callback: impl #callable + 'static) {
                self.#name.set(::std::rc::Rc::new(callback));
            }
        });
        parts.resets.push(quote!(self.#name.clear();));
    }

    match &def.backing {
        Some(Backing::Value(value_ty)) => {
            let value = ty(value_ty)?;
            parts.fields.push(quote!(pub(super) value: #rt::LastValue<#value>));
            parts.inits.push(quote!(value: ::std::default::Default::default()));
            parts.methods.push(quote! {
                pub fn value(&self) -> ::std::option::Option<#value> {
                    self.value.get()
                }

                pub fn set_value(&self, value: #value) {
                    self.value.set(value);
                }

                pub fn clear_value(&self) {
                    self.value.clear();
                }
            });
        }
        Some(Backing::Index { keys, value }) => {
            let key = ty(&owned_tuple(keys))?;
            let value = ty(value)?;
            let key_params = owned_params(keys)?;
            let key_expr = key_tuple(keys)?;
            let stored = ident(&naming::setter_value_name(keys.iter().map(|k| k.name.as_str())))?;
            parts.fields.push(quote!(pub(super) backing: #rt::IndexBacking<#key, #value>));
            parts.inits.push(quote!(backing: ::std::default::Default::default()));
            parts.methods.push(quote! {
                pub fn insert(&self, #(#key_params,)* #stored: #value) {
                    self.backing.insert(#key_expr, #stored);
                }

                pub fn lookup(&self, #(#key_params),*) -> ::std::option::Option<#value> {
                    self.backing.get(&#key_expr)
                }

                pub fn remove(&self, #(#key_params),*) -> ::std::option::Option<#value> {
                    self.backing.remove(&#key_expr)
                }

                pub fn stored_count(&self) -> usize {
                    self.backing.len()
                }
            });
        }
        None => {}
    }

    if let Some(surface) = &def.event {
        let handler = parse_type(&surface.handler_fn)?;
        parts.fields.push(quote!(pub(super) subscribers: #rt::Subscribers<#handler>));
        parts.inits.push(quote!(subscribers: ::std::default::Default::default()));
        parts.methods.push(quote! {
            pub fn subscriber_count(&self) -> usize {
                self.subscribers.len()
            }
        });
        parts.methods.push(raise(ctx, def, surface)?);
    }

    Ok(parts)
}

/// `Fn(&Stub, params..) -> R`.
fn callback_bounds(ctx: &Ctx<'_>, slot: &CallbackSlot) -> Result<TokenStream, RenderError> {
    let stub = &ctx.stub;
    let params = slot.params.iter().map(signature_ty).collect::<Result<Vec<_>, _>>()?;
    let ret = return_type(&slot.returns)?;
    Ok(quote!(Fn(&#stub #(, #params)*) #ret))
}

/// `-> R`, or nothing for `()`.
pub(super) fn return_type(returns: &TypeRef) -> Result<TokenStream, RenderError> {
    if returns.is_unit() {
        Ok(TokenStream::new())
    } else {
        let returns = ty(returns)?;
        Ok(quote!(-> #returns))
    }
}

/// Keys taken by value, for the backing helpers.
fn owned_params(keys: &[ParameterModel]) -> Result<Vec<TokenStream>, RenderError> {
    keys.iter()
        .map(|k| {
            let name = ident(&k.name)?;
            let key_ty = ty(&k.ty)?;
            Ok(quote!(#name: #key_ty))
        })
        .collect()
}

fn key_tuple(keys: &[ParameterModel]) -> Result<TokenStream, RenderError> {
    let names = keys.iter().map(|k| ident(&k.name)).collect::<Result<Vec<_>, _>>()?;
    Ok(match names.as_slice() {
        [single] => quote!(#single),
        many => quote!((#(#many),*)),
    })
}

fn raise(
    ctx: &Ctx<'_>,
    def: &InterceptorDef,
    surface: &EventSurface,
) -> Result<TokenStream, RenderError> {
    let params = super::fn_params(&surface.payload)?;
    let args: Vec<TokenStream> = surface
        .payload
        .iter()
        .map(|p| {
            let name = ident(&p.name)?;
            Ok(quote!(::std::clone::Clone::clone(&#name)))
        })
        .collect::<Result<_, RenderError>>()?;

    let mut record = vec![quote!(self.raise_count.bump();)];
    if def.has_tracking("last_raise_args") {
        let owned = owned_tuple_expr(&surface.payload)?;
        record.push(quote!(self.last_raise_args.set(#owned);));
    }
    if def.has_tracking("all_raises") {
        let owned = owned_tuple_expr(&surface.payload)?;
        record.push(quote!(self.all_raises.push(#owned);));
    }

    Ok(match surface.shape {
        EventShape::Async => {
            let doc = ctx.doc("Invoke every handler in subscription order, awaiting each before the next.");
            quote! {
                #doc
                pub async fn raise_async(&self, #(#params),*) {
                    #(#record)*
                    for handler in self.subscribers.snapshot() {
                        handler(#(#args),*).await;
                    }
                }
            }
        }
        EventShape::Returning if surface.returns.is_some() => {
            let result = raise_return(surface).map(|r| ty(&r)).transpose()?;
            let doc = ctx.doc("Invoke every handler in subscription order; yields the last handler's result.");
            quote! {
                #doc
                pub fn raise(&self, #(#params),*) -> #result {
                    #(#record)*
                    let mut result = ::std::option::Option::None;
                    for handler in self.subscribers.snapshot() {
                        result = ::std::option::Option::Some(handler(#(#args),*));
                    }
                    result
                }
            }
        }
        EventShape::Void | EventShape::Returning => {
            let doc = ctx.doc("Invoke every handler in subscription order.");
            quote! {
                #doc
                pub fn raise(&self, #(#params),*) {
                    #(#record)*
                    for handler in self.subscribers.snapshot() {
                        handler(#(#args),*);
                    }
                }
            }
        }
    })
}

fn interceptor(ctx: &Ctx<'_>, def: &InterceptorDef) -> Result<TokenStream, RenderError> {
    let name = ident(&def.type_name)?;
    let Parts {
        fields,
        methods,
        resets,
        ..
    } = parts(ctx, def)?;
    let doc = ctx.doc(&format!("Records calls to `{}` and holds its configuration.", def.member));
    Ok(quote! {
        #doc
        #[derive(Default)]
        pub struct #name {
            #(#fields,)*
        }

        impl #name {
            #(#methods)*

            pub fn reset(&self) {
                #(#resets)*
            }
        }
    })
}

// ============================================================================
// Generic Dispatch
// ============================================================================

fn registry(ctx: &Ctx<'_>, dispatch: &GenericDispatchDef) -> Result<TokenStream, RenderError> {
    let rt = ctx.rt();
    let name = ident(&dispatch.type_name)?;
    let nested = &dispatch.nested;
    let typed = ident(&nested.type_name)?;
    let params = generics(dispatch.key_params())?;
    let args = generic_args(dispatch.key_params())?;
    let key_types: Vec<Ident> = dispatch
        .key_params()
        .iter()
        .map(|tp| ident(&tp.name))
        .collect::<Result<_, _>>()?;

    let Parts {
        fields,
        inits,
        methods,
        resets,
    } = parts(ctx, nested)?;
    let doc = ctx.doc(&format!(
        "Per-type-argument interceptors of `{}`, created on first use.",
        nested.member
    ));
    let typed_doc = ctx.doc(&format!(
        "Records calls to `{}` for one tuple of type arguments.",
        nested.member
    ));

    Ok(quote! {
        #doc
        #[derive(Default)]
        pub struct #name {
            pub(super) registry: #rt::GenericRegistry,
        }

        impl #name {
            pub fn of #params(&self) -> ::std::rc::Rc<#typed #args> {
                self.registry.get_or_create(
                    #rt::TypeKey::new() #(.with::<#key_types>())*,
                    <#typed #args>::default,
                )
            }

            pub fn total_call_count(&self) -> usize {
                self.registry.total_call_count()
            }

            pub fn was_called(&self) -> bool {
                self.registry.was_called()
            }

            pub fn instance_count(&self) -> usize {
                self.registry.len()
            }

            pub fn reset(&self) {
                self.registry.reset();
            }
        }

        #typed_doc
        pub struct #typed #params {
            #(#fields,)*
            _marker: ::std::marker::PhantomData<fn() -> (#(#key_types,)*)>,
        }

        impl #params ::std::default::Default for #typed #args {
            fn default() -> Self {
                Self {
                    #(#inits,)*
                    _marker: ::std::marker::PhantomData,
                }
            }
        }

        impl #params #typed #args {
            #(#methods)*

            pub fn reset(&self) {
                #(#resets)*
            }
        }

        impl #params #rt::Tracked for #typed #args {
            fn call_count(&self) -> usize {
                self.call_count.get()
            }

            fn reset(&self) {
                #(#resets)*
            }
        }
    })
}
