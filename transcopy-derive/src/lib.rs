//! Derive macro for `transcopy`.
//!
//! This crate generates the copy code behind `#[derive(DeepCopy)]`. It:
//! - reads `#[deep_copy(...)]` and `#[sensitive]` attributes
//! - emits a `Composite` impl holding the type's property descriptor
//! - emits a `DeepCopy` impl that copies each field through a `CompositeBuilder`
//!
//! It does **not** copy anything itself. Traversal, transforms, and
//! diagnostics live in the main `transcopy` crate and run at runtime.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]


#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, parse_quote, spanned::Spanned, Data, DeriveInput, Ident, Result};

mod container;
mod derive_enum;
mod derive_struct;
mod field;
mod generics;
mod transform;
mod types;
use container::{parse_container_options, ContainerOptions, RebuildMode};
use derive_enum::derive_enum;
use derive_struct::derive_struct;
use generics::{add_deep_copy_bounds, add_default_predicates, add_static_bounds};

/// Derives `transcopy::DeepCopy` and `transcopy::Composite` for structs and enums.
///
/// # Container Attributes
///
/// These attributes are placed on the struct/enum itself:
///
/// - `#[deep_copy(immutable)]` - The type joins the immutable set: copies are
///   `Clone::clone` and are never passed through the set mutation guard. Use
///   this for fieldless enums and scalar newtypes. Requires `Clone`.
/// - `#[deep_copy(rebuild = "default")]` - Rebuild from `Default::default()` and
///   assign writable fields. Read-only fields are reported as lost. Structs only.
/// - `#[deep_copy(constructor = "path")]` - Rebuild by calling `path` with every
///   non-skipped field in declaration order. Structs only.
/// - `#[deep_copy(opaque)]` - The type cannot be rebuilt safely; copying it
///   fails with `CopyError::NoUsableConstructor`.
///
/// Without a container attribute the value is rebuilt as a literal of all its
/// fields.
///
/// # Field Attributes
///
/// - **No annotation**: The field is copied and passed to the transform.
/// - `#[sensitive]`: Adds the `sensitive` tag, checked by
///   `Property::is_sensitive` and `transform::on_sensitive`.
/// - `#[deep_copy(tag = "name")]`: Adds an arbitrary tag. May be repeated.
/// - `#[deep_copy(read_only)]`: The field is copied but cannot be assigned;
///   only literal and constructor rebuilds restore it.
/// - `#[deep_copy(skip)]`: The field is not copied. It is rebuilt with
///   `Default::default()` and reported as skipped. Use this for closures,
///   handles, and other values that cannot be copied generically.
///
/// Unions and types with lifetime parameters are rejected at compile time.
///
/// # Generated Bounds
///
/// Every type parameter gets `'static`. Parameters used by copied fields also
/// get `DeepCopy`; parameters used only inside `PhantomData` do not. Maps
/// keyed by a type parameter need the key bounds (`Eq + Hash + Debug` or
/// `Ord + Debug`) declared on the type itself.
#[proc_macro_derive(DeepCopy, attributes(deep_copy, sensitive))]
pub fn derive_deep_copy(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the transcopy crate root.
///
/// Handles crate renaming (e.g., `copy = { package = "transcopy", ... }`).
/// Inside transcopy itself the crate is reachable as `::transcopy` through
/// its `extern crate self` alias, which also covers its doctests.
fn crate_root() -> TokenStream {
    match crate_name("transcopy") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::transcopy },
    }
}

struct DeriveOutput {
    body: TokenStream,
    properties: Vec<TokenStream>,
    copied_generics: Vec<Ident>,
    defaulted_types: Vec<syn::Type>,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let options = parse_container_options(&attrs)?;
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "`DeepCopy` cannot be derived for types with lifetime parameters; copies must own their data",
        ));
    }

    let root = crate_root();
    let (_, ty_generics, _) = generics.split_for_impl();
    let self_ty: syn::Type = parse_quote!(#ident #ty_generics);

    let output = match &data {
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "`DeepCopy` cannot be derived for unions",
            ));
        }
        _ if options.immutable => {
            return Ok(expand_immutable(&ident, &generics, &self_ty, &root));
        }
        Data::Struct(data) => {
            let output = derive_struct(data, &generics, &options.rebuild, &root)?;
            DeriveOutput {
                body: output.body,
                properties: output.properties,
                copied_generics: output.copied_generics,
                defaulted_types: output.defaulted_types,
            }
        }
        Data::Enum(data) => {
            if !matches!(options.rebuild, RebuildMode::Positional) {
                return Err(syn::Error::new(
                    ident.span(),
                    "enums are rebuilt from their variants; `rebuild` and `constructor` apply to structs only",
                ));
            }
            let output = derive_enum(data, &generics, &root)?;
            DeriveOutput {
                body: output.body,
                properties: output.properties,
                copied_generics: output.copied_generics,
                defaulted_types: output.defaulted_types,
            }
        }
    };

    let ContainerOptions {
        opaque, rebuild, ..
    } = options;
    let mut bounded = add_static_bounds(generics.clone());
    if !opaque {
        bounded = add_deep_copy_bounds(bounded, &output.copied_generics, &root);
        bounded = add_default_predicates(bounded, &output.defaulted_types);
        if matches!(rebuild, RebuildMode::DefaultThenAssign) && generics.type_params().count() > 0
        {
            bounded = add_default_predicates(bounded, &[self_ty]);
        }
    }
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    let rebuild_tokens = match (opaque, &rebuild) {
        (true, _) => quote! { #root::Rebuild::Unsupported },
        (false, RebuildMode::Positional) => quote! { #root::Rebuild::Positional },
        (false, RebuildMode::DefaultThenAssign) => quote! { #root::Rebuild::DefaultThenAssign },
        (false, RebuildMode::Constructor(_)) => quote! { #root::Rebuild::Constructor },
    };
    let body = if opaque {
        quote! { ::core::result::Result::Err(copier.no_constructor::<Self>(cx)) }
    } else {
        output.body
    };
    let type_name = ident.to_string();
    let properties = &output.properties;

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #root::Composite for #ident #ty_generics #where_clause {
            const DESCRIPTOR: #root::Descriptor = #root::Descriptor {
                type_name: #type_name,
                properties: &[#(#properties),*],
                rebuild: #rebuild_tokens,
            };
        }

        #[automatically_derived]
        impl #impl_generics #root::DeepCopy for #ident #ty_generics #where_clause {
            const SHAPE: #root::Shape = #root::Shape::Composite;

            fn deep_copy(
                &self,
                copier: &#root::Copier<'_>,
                cx: &#root::Context<'_>,
            ) -> ::core::result::Result<Self, #root::CopyError> {
                #body
            }
        }
    })
}

fn expand_immutable(
    ident: &Ident,
    generics: &syn::Generics,
    self_ty: &syn::Type,
    root: &TokenStream,
) -> TokenStream {
    let mut bounded = add_static_bounds(generics.clone());
    if generics.type_params().count() > 0 {
        bounded
            .make_where_clause()
            .predicates
            .push(parse_quote!(#self_ty: ::core::clone::Clone));
    }
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics #root::DeepCopy for #ident #ty_generics #where_clause {
            const SHAPE: #root::Shape = #root::Shape::Immutable;

            fn deep_copy(
                &self,
                _copier: &#root::Copier<'_>,
                _cx: &#root::Context<'_>,
            ) -> ::core::result::Result<Self, #root::CopyError> {
                ::core::result::Result::Ok(::core::clone::Clone::clone(self))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn expand_err(tokens: TokenStream) -> String {
        let input: DeriveInput = syn::parse2(tokens).unwrap();
        expand(input).unwrap_err().to_string()
    }

    fn expand_ok(tokens: TokenStream) -> String {
        let input: DeriveInput = syn::parse2(tokens).unwrap();
        expand(input).unwrap().to_string()
    }

    #[test]
    fn unions_are_rejected() {
        let err = expand_err(quote! {
            union Bits { int: u32, float: f32 }
        });
        assert!(err.contains("cannot be derived for unions"));
    }

    #[test]
    fn lifetimes_are_rejected() {
        let err = expand_err(quote! {
            struct View<'a> { text: &'a str }
        });
        assert!(err.contains("lifetime parameters"));
    }

    #[test]
    fn enums_reject_struct_rebuild_strategies() {
        let err = expand_err(quote! {
            #[deep_copy(rebuild = "default")]
            enum Mode { On, Off }
        });
        assert!(err.contains("apply to structs only"));
    }

    #[test]
    fn immutable_types_clone() {
        let tokens = expand_ok(quote! {
            #[deep_copy(immutable)]
            enum Level { Low, High }
        });
        assert!(tokens.contains("Shape :: Immutable"));
        assert!(!tokens.contains("Composite"));
    }

    #[test]
    fn opaque_types_report_no_constructor() {
        let tokens = expand_ok(quote! {
            #[deep_copy(opaque)]
            struct Socket { fd: i32 }
        });
        assert!(tokens.contains("Rebuild :: Unsupported"));
        assert!(tokens.contains("no_constructor"));
    }

    #[test]
    fn generic_default_rebuild_requires_default_self() {
        let tokens = expand_ok(quote! {
            #[deep_copy(rebuild = "default")]
            struct Slot<T> { value: T }
        });
        assert!(tokens.contains("Slot < T > : :: core :: default :: Default"));
    }
}
