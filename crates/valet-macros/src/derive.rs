//! `#[derive(Bind)]` expansion.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{bindable_fields, ContainerAttrs};

/// Expands the derive into a `Bind` impl backed by a lazily built plan.
pub fn expand_bind(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let container = ContainerAttrs::from_attrs(&input.attrs)?;
    let fields = bindable_fields(&input)?;

    let krate = &container.krate;
    let ident = &input.ident;

    let steps = fields.iter().map(|field| {
        let name = &field.field_name;
        let annotation = &field.annotation;
        let member = &field.ident;
        quote! {
            .field(#name, #annotation, |__target: &mut #ident| &mut __target.#member)
        }
    });

    Ok(quote! {
        impl #krate::Bind for #ident {
            fn plan() -> &'static #krate::BindPlan<Self> {
                static PLAN: ::std::sync::OnceLock<#krate::BindPlan<#ident>> =
                    ::std::sync::OnceLock::new();
                PLAN.get_or_init(|| #krate::BindPlan::new() #(#steps)*)
            }
        }
    })
}
