//! Trait impls: one function per member, running its fallback chain.

use proc_macro2::TokenStream;
use quote::quote;
use stubforge_core::{PassingMode, Receiver, TypeRef};

use super::interceptors::return_type;
use super::{
    Ctx, arg_names, fn_params, generics, ident, owned_arg, owned_tuple_expr, parse_path,
    parse_type, ty,
};
use crate::defaults::{ConcreteType, DefaultValueStrategy};
use crate::error::RenderError;
use crate::handlers::{Backing, TrackingField};
use crate::ir::{Accessor, FallbackStep, InterceptorRef, MemberImpl, StubShape, TraitImpl};

pub(super) fn trait_impls(ctx: &Ctx<'_>) -> Result<TokenStream, RenderError> {
    let stub = &ctx.stub;
    let impls = ctx
        .companion
        .impls
        .iter()
        .map(|trait_impl| {
            let trait_path = parse_path(&trait_impl.trait_path)?;
            let fns = trait_impl
                .members
                .iter()
                .map(|member| member_fn(ctx, trait_impl, member))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(quote! {
                #[allow(unused_variables)]
                impl #trait_path for #stub {
                    #(#fns)*
                }
            })
        })
        .collect::<Result<Vec<_>, RenderError>>()?;
    Ok(quote!(#(#impls)*))
}

fn member_fn(ctx: &Ctx<'_>, trait_impl: &TraitImpl, member: &MemberImpl) -> Result<TokenStream, RenderError> {
    let name = ident(&member.fn_name)?;
    let generics = generics(&member.type_params)?;
    let receiver = match member.receiver {
        Receiver::Shared => quote!(&self),
        Receiver::Exclusive => quote!(&mut self),
    };
    let params = fn_params(&member.params)?;
    let ret = return_type(&member.returns)?;
    let body = Body::new(ctx, trait_impl, member).render()?;
    Ok(quote! {
        fn #name #generics(#receiver #(, #params)*) #ret {
            #body
        }
    })
}

/// Renders one function body from its chain.
struct Body<'c> {
    ctx: &'c Ctx<'c>,
    trait_impl: &'c TraitImpl,
    member: &'c MemberImpl,
    stmts: Vec<TokenStream>,
    tail: Option<TokenStream>,
}

impl<'c> Body<'c> {
    fn new(ctx: &'c Ctx<'c>, trait_impl: &'c TraitImpl, member: &'c MemberImpl) -> Self {
        Self {
            ctx,
            trait_impl,
            member,
            stmts: Vec::new(),
            tail: None,
        }
    }

    fn render(mut self) -> Result<TokenStream, RenderError> {
        let member = self.member;
        for step in &member.chain {
            match step {
                FallbackStep::DefaultOutParams(outs) => {
                    for (param, strategy) in outs {
                        let name = ident(&param.name)?;
                        let value = self.default_value(&param.ty, strategy)?;
                        self.stmts.push(quote!(*#name = #value;));
                    }
                }
                FallbackStep::Record => self.record()?,
                FallbackStep::Override => self.override_slot()?,
                FallbackStep::UserImplementation => self.user_implementation()?,
                FallbackStep::BackingLookup => self.backing_lookup()?,
                FallbackStep::BackingStore => self.backing_store()?,
                FallbackStep::ManageSubscribers => {
                    self.interceptor_ref()?;
                    let handler = arg_names(&member.params)?;
                    self.stmts.push(match member.accessor {
                        Accessor::Unsubscribe => quote!(interceptor.subscribers.remove(#(#handler),*);),
                        _ => quote!(interceptor.subscribers.add(#(#handler),*);),
                    });
                }
                FallbackStep::BaseImplementation => self.base_implementation()?,
                FallbackStep::Default(strategy) => {
                    if !(member.returns.is_unit() && strategy.is_resolvable()) {
                        self.tail = Some(self.default_value(&member.returns, strategy)?);
                    }
                }
                FallbackStep::RuntimeDefault => self.tail = Some(self.runtime_default()?),
            }
            if step.is_terminal() {
                break;
            }
        }
        let stmts = &self.stmts;
        let tail = &self.tail;
        Ok(quote! {
            #(#stmts)*
            #tail
        })
    }

    fn interceptor_ref(&self) -> Result<&'c InterceptorRef, RenderError> {
        self.member
            .interceptor
            .as_ref()
            .ok_or_else(|| RenderError::MissingInterceptor {
                member: self.member.member.clone(),
            })
    }

    fn record(&mut self) -> Result<(), RenderError> {
        let iref = self.interceptor_ref()?;
        let bundle = ident(&iref.bundle)?;
        let field = ident(&iref.field)?;
        if iref.generic {
            let args = self
                .member
                .type_params
                .iter()
                .map(|tp| ident(&tp.name))
                .collect::<Result<Vec<_>, _>>()?;
            self.stmts
                .push(quote!(let interceptor = self.#bundle.#field.of::<#(#args),*>();));
        } else {
            self.stmts.push(quote!(let interceptor = &self.#bundle.#field;));
        }

        let params = &self.member.params;
        for tracking in &iref.def.tracking {
            let stmt = match (self.member.accessor, tracking) {
                (Accessor::Getter, TrackingField::GetCount)
                | (Accessor::Setter, TrackingField::SetCount)
                | (Accessor::Call, TrackingField::CallCount)
                | (Accessor::Subscribe, TrackingField::SubscribeCount)
                | (Accessor::Unsubscribe, TrackingField::UnsubscribeCount) => {
                    let name = ident(tracking.name())?;
                    quote!(interceptor.#name.bump();)
                }
                (Accessor::Getter, TrackingField::LastGetKey(keys)) => {
                    let owned = owned_tuple_expr(keys)?;
                    quote!(interceptor.last_get_key.set(#owned);)
                }
                (Accessor::Setter, TrackingField::LastSetValue(_)) => {
                    let value = params.last().map(owned_arg).transpose()?;
                    quote!(interceptor.last_set_value.set(#value);)
                }
                (Accessor::Setter, TrackingField::LastSetEntry { .. }) => {
                    let owned = owned_tuple_expr(params)?;
                    quote!(interceptor.last_set_entry.set(#owned);)
                }
                (Accessor::Call, TrackingField::LastCallArg(param)) => {
                    let owned = owned_arg(param)?;
                    quote!(interceptor.last_call_arg.set(#owned);)
                }
                (Accessor::Call, TrackingField::LastCallArgs(recorded)) => {
                    let owned = owned_tuple_expr(recorded)?;
                    quote!(interceptor.last_call_args.set(#owned);)
                }
                _ => continue,
            };
            self.stmts.push(stmt);
        }
        Ok(())
    }

    fn override_slot(&mut self) -> Result<(), RenderError> {
        let Some(slot) = self.interceptor_ref()?.slot else {
            return Ok(());
        };
        let slot = ident(slot.name())?;
        let args = self
            .member
            .params
            .iter()
            .filter(|p| p.mode != PassingMode::Out)
            .map(|p| ident(&p.name))
            .collect::<Result<Vec<_>, _>>()?;
        self.stmts.push(quote! {
            if let ::std::option::Option::Some(callback) = interceptor.#slot.get() {
                return callback(&*self #(, #args)*);
            }
        });
        Ok(())
    }

    fn turbofish(&self) -> Result<TokenStream, RenderError> {
        if self.member.type_params.is_empty() {
            return Ok(TokenStream::new());
        }
        let args = self
            .member
            .type_params
            .iter()
            .map(|tp| ident(&tp.name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(quote!(::<#(#args),*>))
    }

    fn user_implementation(&mut self) -> Result<(), RenderError> {
        let name = ident(&self.member.fn_name)?;
        let turbofish = self.turbofish()?;
        let args = arg_names(&self.member.params)?;
        self.tail = Some(quote!(Self::#name #turbofish(self #(, #args)*)));
        Ok(())
    }

    fn base_implementation(&mut self) -> Result<(), RenderError> {
        let StubShape::Class { base_type, .. } = &self.ctx.companion.shape else {
            return Err(RenderError::MissingBase {
                member: self.member.member.clone(),
            });
        };
        let base = parse_type(base_type)?;
        let trait_path = parse_path(&self.trait_impl.trait_path)?;
        let name = ident(&self.member.fn_name)?;
        let turbofish = self.turbofish()?;
        let args = arg_names(&self.member.params)?;
        let receiver = match self.member.receiver {
            Receiver::Shared => quote!(&self.base),
            Receiver::Exclusive => quote!(&mut self.base),
        };
        self.tail = Some(quote!(<#base as #trait_path>::#name #turbofish(#receiver #(, #args)*)));
        Ok(())
    }

    fn backing_lookup(&mut self) -> Result<(), RenderError> {
        let iref = self.interceptor_ref()?;
        let stmt = match &iref.def.backing {
            Some(Backing::Value(_)) => quote! {
                if let ::std::option::Option::Some(value) = interceptor.value.get() {
                    return value;
                }
            },
            Some(Backing::Index { keys, .. }) => {
                let key = owned_tuple_expr(keys)?;
                quote! {
                    if let ::std::option::Option::Some(value) = interceptor.backing.get(&#key) {
                        return value;
                    }
                }
            }
            None => return Ok(()),
        };
        self.stmts.push(stmt);
        Ok(())
    }

    fn backing_store(&mut self) -> Result<(), RenderError> {
        let iref = self.interceptor_ref()?;
        let params = &self.member.params;
        let Some((value, keys)) = params.split_last() else {
            return Ok(());
        };
        let value = ident(&value.name)?;
        let stmt = match &iref.def.backing {
            Some(Backing::Value(_)) => quote!(interceptor.value.set(#value);),
            Some(Backing::Index { .. }) => {
                let key = owned_tuple_expr(keys)?;
                quote!(interceptor.backing.insert(#key, #value);)
            }
            None => return Ok(()),
        };
        self.stmts.push(stmt);
        Ok(())
    }

    /// Expression producing a default of `target`.
    fn default_value(
        &self,
        target: &TypeRef,
        strategy: &DefaultValueStrategy,
    ) -> Result<TokenStream, RenderError> {
        let rt = self.ctx.rt();
        Ok(match (strategy, target) {
            (DefaultValueStrategy::Unresolvable, _) => {
                let member = &self.member.member;
                let hint = &self.member.hint;
                quote!(#rt::unconfigured(#member, #hint))
            }
            (_, TypeRef::Future(payload)) => {
                let payload = payload.as_deref().cloned().unwrap_or(TypeRef::Unit);
                let inner = self.default_value(&payload, strategy)?;
                quote!(#rt::completed(#inner))
            }
            (DefaultValueStrategy::UseTypeDefault, _) => quote!(::std::default::Default::default()),
            (DefaultValueStrategy::ConstructConcrete(ConcreteType::Constructible(concrete)), _) => {
                let concrete = ty(concrete)?;
                quote!(<#concrete>::new())
            }
            (DefaultValueStrategy::ConstructConcrete(collection), _) => {
                let concrete = parse_type(&collection.type_name())?;
                quote!(::std::convert::Into::into(<#concrete>::new()))
            }
        })
    }

    fn runtime_default(&self) -> Result<TokenStream, RenderError> {
        let field = self
            .ctx
            .companion
            .runtime_defaults
            .as_deref()
            .map(ident)
            .transpose()?;
        let member = &self.member.member;
        let hint = &self.member.hint;
        let (payload, wrap) = match &self.member.returns {
            TypeRef::Future(payload) => (payload.as_deref().cloned().unwrap_or(TypeRef::Unit), true),
            other => (other.clone(), false),
        };
        let payload = ty(&payload)?;
        let provided = match field {
            Some(field) => quote!(self.#field.provide_or_fail::<#payload>(#member, #hint)),
            None => {
                let rt = self.ctx.rt();
                quote!(#rt::unconfigured(#member, #hint))
            }
        };
        if wrap {
            let rt = self.ctx.rt();
            Ok(quote!(#rt::completed(#provided)))
        } else {
            Ok(provided)
        }
    }
}
