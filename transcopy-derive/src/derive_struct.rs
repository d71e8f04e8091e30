//! Struct-specific `DeepCopy` derivation.
//!
//! Named, tuple, and unit structs share one code path: fields are bound and
//! rebuilt with braced syntax (`Self { 0: field_0 }` for tuple structs).

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DataStruct, Result};

use crate::{
    container::RebuildMode,
    field::{collect_fields, FieldModel},
    transform::{
        generate_constructor_rebuild, generate_default_rebuild, generate_positional_rebuild,
        DeriveContext,
    },
};

pub(crate) struct StructDeriveOutput {
    pub(crate) body: TokenStream,
    pub(crate) properties: Vec<TokenStream>,
    pub(crate) copied_generics: Vec<Ident>,
    pub(crate) defaulted_types: Vec<syn::Type>,
}

pub(crate) fn derive_struct(
    data: &DataStruct,
    generics: &syn::Generics,
    rebuild: &RebuildMode,
    root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let fields = collect_fields(&data.fields, 0)?;
    let properties = fields.iter().map(|field| field.property(root)).collect();

    let mut copied_generics = Vec::new();
    let mut defaulted_types = Vec::new();
    let mut ctx = DeriveContext {
        generics,
        copied_generics: &mut copied_generics,
        defaulted_types: &mut defaulted_types,
    };

    let rebuild = match rebuild {
        RebuildMode::Positional => generate_positional_rebuild(&mut ctx, &quote! { Self }, &fields),
        RebuildMode::DefaultThenAssign => generate_default_rebuild(&mut ctx, &fields),
        RebuildMode::Constructor(path) => generate_constructor_rebuild(&mut ctx, path, &fields),
    };

    let body = if fields.is_empty() {
        quote! {
            copier.composite::<Self>(cx)?;
            #rebuild
        }
    } else {
        let patterns = fields.iter().map(FieldModel::pattern);
        quote! {
            let builder = copier.composite::<Self>(cx)?;
            let Self { #(#patterns),* } = self;
            #rebuild
        }
    };

    Ok(StructDeriveOutput {
        body,
        properties,
        copied_generics,
        defaulted_types,
    })
}
