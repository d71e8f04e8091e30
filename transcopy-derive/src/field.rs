//! Parsing of field attributes and the per-field model.
//!
//! Field attributes map to property metadata:
//!
//! | Attribute | Effect |
//! |-----------|--------|
//! | None | Read-write property, no tags |
//! | `#[sensitive]` | Adds the `sensitive` tag |
//! | `#[deep_copy(tag = "x")]` | Adds the tag `x` |
//! | `#[deep_copy(read_only)]` | Read-only property |
//! | `#[deep_copy(skip)]` | Not copied; rebuilt from `Default` |

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{ext::IdentExt, spanned::Spanned, Attribute, Fields, Ident, LitStr, Member, Meta, Result};

use crate::types::type_label;

const SENSITIVE_TAG: &str = "sensitive";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    ReadWrite,
    ReadOnly,
    Skipped,
}

#[derive(Clone, Debug)]
pub(crate) struct FieldOptions {
    pub(crate) access: Access,
    pub(crate) tags: Vec<String>,
}

fn push_tag(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

pub(crate) fn parse_field_options(attrs: &[Attribute]) -> Result<FieldOptions> {
    let mut tags = Vec::new();
    let mut sensitive = false;
    let mut skip = None;
    let mut read_only = None;

    for attr in attrs {
        if attr.path().is_ident("sensitive") {
            if !matches!(attr.meta, Meta::Path(_)) {
                return Err(syn::Error::new(
                    attr.span(),
                    "#[sensitive] takes no arguments; use #[deep_copy(tag = \"...\")] for other tags",
                ));
            }
            if sensitive {
                return Err(syn::Error::new(
                    attr.span(),
                    "multiple #[sensitive] attributes specified on the same field",
                ));
            }
            sensitive = true;
            push_tag(&mut tags, SENSITIVE_TAG.to_string());
            continue;
        }
        if !attr.path().is_ident("deep_copy") {
            continue;
        }

        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new(
                attr.span(),
                "expected a list of options, e.g. #[deep_copy(skip)]",
            ));
        };
        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = Some(meta.path.span());
                Ok(())
            } else if meta.path.is_ident("read_only") {
                read_only = Some(meta.path.span());
                Ok(())
            } else if meta.path.is_ident("tag") {
                let value: LitStr = meta.value()?.parse()?;
                let tag = value.value();
                if tag.is_empty() {
                    return Err(syn::Error::new(value.span(), "tags must not be empty"));
                }
                push_tag(&mut tags, tag);
                Ok(())
            } else {
                Err(meta.error(format!(
                    "unknown field option `{}`; expected `skip`, `read_only`, or `tag`",
                    meta.path
                        .get_ident()
                        .map_or_else(|| "?".to_string(), ToString::to_string)
                )))
            }
        })?;
    }

    let access = match (skip, read_only) {
        (Some(span), Some(_)) => {
            return Err(syn::Error::new(
                span,
                "`skip` and `read_only` cannot be combined",
            ))
        }
        (Some(_), None) => Access::Skipped,
        (None, Some(_)) => Access::ReadOnly,
        (None, None) => Access::ReadWrite,
    };

    Ok(FieldOptions { access, tags })
}

/// One field of a struct or variant, with its property index.
pub(crate) struct FieldModel {
    /// Index into the type's property list; unique across enum variants.
    pub(crate) index: usize,
    pub(crate) member: Member,
    /// Local name the field is bound to in generated code.
    pub(crate) binding: Ident,
    pub(crate) name: String,
    pub(crate) ty: syn::Type,
    pub(crate) options: FieldOptions,
    pub(crate) span: Span,
}

impl FieldModel {
    pub(crate) fn is_skipped(&self) -> bool {
        self.options.access == Access::Skipped
    }

    /// `member: binding`, or `member: _` for skipped fields.
    pub(crate) fn pattern(&self) -> TokenStream {
        let member = &self.member;
        let binding = &self.binding;
        if self.is_skipped() {
            quote! { #member: _ }
        } else {
            quote! { #member: #binding }
        }
    }

    /// The `Property` literal describing this field.
    pub(crate) fn property(&self, root: &TokenStream) -> TokenStream {
        let name = &self.name;
        let type_name = type_label(&self.ty);
        let tags = &self.options.tags;
        let access = match self.options.access {
            Access::ReadWrite => quote! { #root::Access::ReadWrite },
            Access::ReadOnly => quote! { #root::Access::ReadOnly },
            Access::Skipped => quote! { #root::Access::Skipped },
        };
        quote! {
            #root::Property {
                name: #name,
                type_name: #type_name,
                tags: &[#(#tags),*],
                access: #access,
            }
        }
    }
}

/// Builds the field models of `fields`, numbering properties from `first_index`.
pub(crate) fn collect_fields(fields: &Fields, first_index: usize) -> Result<Vec<FieldModel>> {
    fields
        .iter()
        .enumerate()
        .map(|(position, field)| {
            let index = first_index + position;
            let (member, name) = match &field.ident {
                Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
                None => (Member::Unnamed(position.into()), position.to_string()),
            };
            Ok(FieldModel {
                index,
                member,
                binding: format_ident!("field_{index}"),
                name,
                ty: field.ty.clone(),
                options: parse_field_options(&field.attrs)?,
                span: field.span(),
            })
        })
        .collect()
}
