//! Shared rebuild code generation for struct and enum derivation.
//!
//! Generated bodies run inside `DeepCopy::deep_copy` with `builder` bound to
//! the type's `CompositeBuilder` and every non-skipped field bound by
//! reference to its `FieldModel::binding`.

use proc_macro2::{Ident, TokenStream};
use quote::{quote, quote_spanned};

use crate::{
    field::{Access, FieldModel},
    generics::{collect_generics_from_type, uses_generics},
};

/// Accumulated state during field processing.
pub(crate) struct DeriveContext<'a> {
    pub(crate) generics: &'a syn::Generics,
    /// Type parameters used by copied fields; they need `DeepCopy`.
    pub(crate) copied_generics: &'a mut Vec<Ident>,
    /// Generic field types rebuilt from `Default`.
    pub(crate) defaulted_types: &'a mut Vec<syn::Type>,
}

impl DeriveContext<'_> {
    fn record_copied(&mut self, field: &FieldModel) {
        collect_generics_from_type(&field.ty, self.generics, self.copied_generics);
    }

    fn record_defaulted(&mut self, field: &FieldModel) {
        if uses_generics(&field.ty, self.generics) {
            self.defaulted_types.push(field.ty.clone());
        }
    }
}

fn copy_statement(field: &FieldModel) -> TokenStream {
    let index = field.index;
    let binding = &field.binding;
    quote_spanned! { field.span =>
        let #binding = builder.property(#index, #binding)?;
    }
}

/// Rebuilds `target` (`Self` or `Self::Variant`) as a literal of every field.
///
/// Skipped fields get `Default::default()`.
pub(crate) fn generate_positional_rebuild(
    ctx: &mut DeriveContext<'_>,
    target: &TokenStream,
    fields: &[FieldModel],
) -> TokenStream {
    let mut statements = Vec::new();
    let mut initializers = Vec::new();

    for field in fields {
        let index = field.index;
        let member = &field.member;
        let binding = &field.binding;
        if field.is_skipped() {
            ctx.record_defaulted(field);
            statements.push(quote_spanned! { field.span =>
                builder.skip(#index);
                let #binding = ::core::default::Default::default();
            });
        } else {
            ctx.record_copied(field);
            statements.push(copy_statement(field));
        }
        initializers.push(quote! { #member: #binding });
    }

    quote! {
        #(#statements)*
        ::core::result::Result::Ok(#target { #(#initializers),* })
    }
}

/// Calls `constructor` with the non-skipped fields in declaration order.
pub(crate) fn generate_constructor_rebuild(
    ctx: &mut DeriveContext<'_>,
    constructor: &syn::Path,
    fields: &[FieldModel],
) -> TokenStream {
    let mut statements = Vec::new();
    let mut arguments = Vec::new();

    for field in fields {
        let index = field.index;
        if field.is_skipped() {
            statements.push(quote! { builder.skip(#index); });
        } else {
            ctx.record_copied(field);
            statements.push(copy_statement(field));
            arguments.push(&field.binding);
        }
    }

    quote! {
        #(#statements)*
        ::core::result::Result::Ok(#constructor(#(#arguments),*))
    }
}

/// Starts from `Default::default()` and assigns writable fields.
///
/// Read-only fields are still copied and transformed, then discarded with a
/// warning. Skipped fields keep the default instance's value.
pub(crate) fn generate_default_rebuild(
    ctx: &mut DeriveContext<'_>,
    fields: &[FieldModel],
) -> TokenStream {
    let mut statements = Vec::new();
    let mut assigns = false;

    for field in fields {
        let index = field.index;
        let member = &field.member;
        let binding = &field.binding;
        match field.options.access {
            Access::ReadWrite => {
                ctx.record_copied(field);
                assigns = true;
                statements.push(quote_spanned! { field.span =>
                    rebuilt.#member = builder.property(#index, #binding)?;
                });
            }
            Access::ReadOnly => {
                ctx.record_copied(field);
                statements.push(quote_spanned! { field.span =>
                    builder.discard(#index, builder.property(#index, #binding)?);
                });
            }
            Access::Skipped => {
                statements.push(quote! { builder.skip(#index); });
            }
        }
    }

    let binding = if assigns {
        quote! { let mut rebuilt: Self = ::core::default::Default::default(); }
    } else {
        quote! { let rebuilt: Self = ::core::default::Default::default(); }
    };

    quote! {
        #binding
        #(#statements)*
        ::core::result::Result::Ok(rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;
    use crate::field::collect_fields;

    fn fields_of(input: TokenStream) -> (syn::Generics, Vec<FieldModel>) {
        let input: DeriveInput = syn::parse2(input).unwrap();
        let syn::Data::Struct(data) = input.data else {
            panic!("expected a struct");
        };
        let fields = collect_fields(&data.fields, 0).unwrap();
        (input.generics, fields)
    }

    #[test]
    fn positional_rebuild_defaults_skipped_fields() {
        let (generics, fields) = fields_of(quote! {
            struct Job<T> {
                name: String,
                #[deep_copy(skip)]
                callback: Vec<T>,
            }
        });
        let mut copied = Vec::new();
        let mut defaulted = Vec::new();
        let mut ctx = DeriveContext {
            generics: &generics,
            copied_generics: &mut copied,
            defaulted_types: &mut defaulted,
        };
        let body = generate_positional_rebuild(&mut ctx, &quote! { Self }, &fields).to_string();

        assert!(body.contains("builder . property (0usize , field_0)"));
        assert!(body.contains("builder . skip (1usize)"));
        assert!(body.contains("callback : field_1"));
        assert!(copied.is_empty());
        assert_eq!(defaulted.len(), 1);
    }

    #[test]
    fn constructor_rebuild_passes_copied_fields_only() {
        let (generics, fields) = fields_of(quote! {
            struct Range<T>(T, #[deep_copy(skip)] u8, T);
        });
        let mut copied = Vec::new();
        let mut defaulted = Vec::new();
        let mut ctx = DeriveContext {
            generics: &generics,
            copied_generics: &mut copied,
            defaulted_types: &mut defaulted,
        };
        let path: syn::Path = syn::parse_quote!(Range::new);
        let body = generate_constructor_rebuild(&mut ctx, &path, &fields).to_string();

        assert!(body.contains("Range :: new (field_0 , field_2)"));
        assert_eq!(copied, ["T"]);
        assert!(defaulted.is_empty());
    }

    #[test]
    fn default_rebuild_discards_read_only_fields() {
        let (generics, fields) = fields_of(quote! {
            struct Settings {
                theme: String,
                #[deep_copy(read_only)]
                created: u64,
            }
        });
        let mut copied = Vec::new();
        let mut defaulted = Vec::new();
        let mut ctx = DeriveContext {
            generics: &generics,
            copied_generics: &mut copied,
            defaulted_types: &mut defaulted,
        };
        let body = generate_default_rebuild(&mut ctx, &fields).to_string();

        assert!(body.contains("let mut rebuilt"));
        assert!(body.contains("rebuilt . theme = builder . property (0usize , field_0) ?"));
        assert!(body.contains("builder . discard (1usize"));
    }
}
