//! Generic type parameter handling and trait bound management.
//!
//! Every type parameter gets `'static`, since copies are handed to the
//! transform as `dyn Any`. `DeepCopy` bounds are added only for parameters
//! used by copied fields.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` fields are skipped when collecting generics:
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,  // T should NOT require DeepCopy
//! }
//! ```
//!
//! `PhantomData<T>` is copied as an immutable marker, so `TypedId<Socket>`
//! stays copyable even though `Socket` itself is not.

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            if let Some(qself) = &path.qself {
                collect_generics_from_type(&qself.ty, generics, result);
            }
            for segment in &path.path.segments {
                if segment.ident == "PhantomData" {
                    return;
                }

                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner_ty) = arg {
                            collect_generics_from_type(inner_ty, generics, result);
                        }
                    }
                }

                // Check if this type identifier matches a generic parameter
                for param in generics.type_params() {
                    if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                        result.push(param.ident.clone());
                    }
                }
            }
        }
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Slice(slice) => collect_generics_from_type(&slice.elem, generics, result),
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        syn::Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        syn::Type::Reference(reference) => {
            collect_generics_from_type(&reference.elem, generics, result);
        }
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result);
            }
        }
        _ => {}
    }
}

/// Returns `true` if `ty` mentions any type parameter of `generics`.
pub(crate) fn uses_generics(ty: &syn::Type, generics: &syn::Generics) -> bool {
    let mut found = Vec::new();
    collect_generics_from_type(ty, generics, &mut found);
    !found.is_empty()
}

/// Adds `'static` to every type parameter.
pub(crate) fn add_static_bounds(mut generics: syn::Generics) -> syn::Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
    }
    generics
}

/// Adds `DeepCopy` bounds to generic parameters used in copied fields.
pub(crate) fn add_deep_copy_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    root: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#root::DeepCopy));
        }
    }
    generics
}

/// Adds a `where #ty: Default` predicate for each type.
pub(crate) fn add_default_predicates(
    mut generics: syn::Generics,
    types: &[syn::Type],
) -> syn::Generics {
    if types.is_empty() {
        return generics;
    }
    let where_clause = generics.make_where_clause();
    for ty in types {
        where_clause
            .predicates
            .push(parse_quote!(#ty: ::core::default::Default));
    }
    generics
}
