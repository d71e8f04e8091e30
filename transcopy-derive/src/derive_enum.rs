//! Enum-specific `DeepCopy` derivation.
//!
//! This module generates match arms for each variant. Properties of all
//! variants share one list, numbered in declaration order, so each field has
//! a unique property index.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DataEnum, Result};

use crate::{
    field::{collect_fields, FieldModel},
    transform::{generate_positional_rebuild, DeriveContext},
};

pub(crate) struct EnumDeriveOutput {
    pub(crate) body: TokenStream,
    pub(crate) properties: Vec<TokenStream>,
    pub(crate) copied_generics: Vec<Ident>,
    pub(crate) defaulted_types: Vec<syn::Type>,
}

pub(crate) fn derive_enum(
    data: &DataEnum,
    generics: &syn::Generics,
    root: &TokenStream,
) -> Result<EnumDeriveOutput> {
    let mut arms = Vec::new();
    let mut properties = Vec::new();
    let mut copied_generics = Vec::new();
    let mut defaulted_types = Vec::new();
    let mut ctx = DeriveContext {
        generics,
        copied_generics: &mut copied_generics,
        defaulted_types: &mut defaulted_types,
    };

    for variant in &data.variants {
        let variant_ident = &variant.ident;
        let fields = collect_fields(&variant.fields, properties.len())?;
        properties.extend(fields.iter().map(|field| field.property(root)));

        let target = quote! { Self::#variant_ident };
        let patterns = fields.iter().map(FieldModel::pattern);
        let rebuild = generate_positional_rebuild(&mut ctx, &target, &fields);
        arms.push(quote! {
            #target { #(#patterns),* } => { #rebuild }
        });
    }

    let body = if data.variants.is_empty() {
        quote! {
            copier.composite::<Self>(cx)?;
            match *self {}
        }
    } else if properties.is_empty() {
        quote! {
            copier.composite::<Self>(cx)?;
            match self {
                #(#arms)*
            }
        }
    } else {
        quote! {
            let builder = copier.composite::<Self>(cx)?;
            match self {
                #(#arms)*
            }
        }
    };

    Ok(EnumDeriveOutput {
        body,
        properties,
        copied_generics,
        defaulted_types,
    })
}
