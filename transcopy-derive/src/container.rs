//! Container-level attribute parsing for `#[derive(DeepCopy)]`.
//!
//! This module handles attributes on the struct/enum itself, not on fields.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr, Meta, Result};

/// How the derive rebuilds a copied value.
#[derive(Clone, Debug, Default)]
pub(crate) enum RebuildMode {
    /// Struct or variant literal with every field.
    #[default]
    Positional,
    /// `Default::default()`, then assignment of writable fields.
    DefaultThenAssign,
    /// A constructor function called with the non-skipped fields.
    Constructor(syn::Path),
}

/// Options parsed from container-level `#[deep_copy(...)]` attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    /// The type joins the immutable set and is copied with `Clone`.
    pub(crate) immutable: bool,
    /// The type cannot be rebuilt; copying it is an error.
    pub(crate) opaque: bool,
    pub(crate) rebuild: RebuildMode,
}

fn set_rebuild(
    options: &mut ContainerOptions,
    seen: &mut Option<Span>,
    next: RebuildMode,
    span: Span,
) -> Result<()> {
    if seen.is_some() {
        return Err(syn::Error::new(
            span,
            "only one of `rebuild` or `constructor` may be specified",
        ));
    }
    *seen = Some(span);
    options.rebuild = next;
    Ok(())
}

/// Parses container-level `#[deep_copy(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();
    let mut rebuild_span = None;
    let mut immutable_span = None;
    let mut opaque_span = None;

    for attr in attrs {
        if attr.path().is_ident("sensitive") {
            return Err(syn::Error::new(
                attr.span(),
                "#[sensitive] applies to fields, not to types",
            ));
        }
        if !attr.path().is_ident("deep_copy") {
            continue;
        }

        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new(
                attr.span(),
                "expected a list of options, e.g. #[deep_copy(opaque)]",
            ));
        };
        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("immutable") {
                options.immutable = true;
                immutable_span = Some(meta.path.span());
                Ok(())
            } else if meta.path.is_ident("opaque") {
                options.opaque = true;
                opaque_span = Some(meta.path.span());
                Ok(())
            } else if meta.path.is_ident("rebuild") {
                let value: LitStr = meta.value()?.parse()?;
                let mode = match value.value().as_str() {
                    "positional" => RebuildMode::Positional,
                    "default" => RebuildMode::DefaultThenAssign,
                    other => {
                        return Err(syn::Error::new(
                            value.span(),
                            format!(
                                "unknown rebuild strategy `{other}`; expected `positional` or `default`"
                            ),
                        ))
                    }
                };
                set_rebuild(&mut options, &mut rebuild_span, mode, value.span())
            } else if meta.path.is_ident("constructor") {
                let value: LitStr = meta.value()?.parse()?;
                let path: syn::Path = value.parse()?;
                set_rebuild(
                    &mut options,
                    &mut rebuild_span,
                    RebuildMode::Constructor(path),
                    value.span(),
                )
            } else {
                Err(meta.error(format!(
                    "unknown container option `{}`; expected `immutable`, `opaque`, `rebuild`, or `constructor`",
                    meta.path
                        .get_ident()
                        .map_or_else(|| "?".to_string(), ToString::to_string)
                )))
            }
        })?;
    }

    if let Some(span) = immutable_span {
        if opaque_span.is_some() || rebuild_span.is_some() {
            return Err(syn::Error::new(
                span,
                "`immutable` cannot be combined with other container options",
            ));
        }
    }
    if let (Some(span), Some(_)) = (opaque_span, rebuild_span) {
        return Err(syn::Error::new(
            span,
            "`opaque` types are never rebuilt; remove `rebuild` and `constructor`",
        ));
    }

    Ok(options)
}
