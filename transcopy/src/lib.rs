//! Deep copies of object graphs with a per-value transform hook.
//!
//! This crate separates:
//! - **Traversal**: how each type is copied, declared by its [`Shape`].
//! - **Transformation**: what happens to each copied value, decided by a
//!   caller-supplied function.
//!
//! The copier walks the graph depth-first. Every property value and every
//! collection element is copied first and then handed to the transform
//! together with the metadata of the property that contains it. The root value
//! itself is never transformed.
//!
//! Key rules:
//! - Use `#[derive(DeepCopy)]` on structs and enums that should be copied.
//! - Use `#[sensitive]` or `#[deep_copy(tag = "...")]` on fields a transform
//!   should recognize.
//! - Scalars and strings are returned unchanged unless the transform replaces
//!   them.
//! - The transform must return a value of the type it received.
//!
//! What this crate does:
//! - copies structs, enums, std collections, and smart pointers recursively
//! - bounds recursion depth and, optionally, detects `Rc`/`Arc` cycles
//! - reports fidelity losses as warnings through a [`DiagnosticsSink`]
//!
//! What it does not do:
//! - decide which values to transform
//! - implement encryption or redaction primitives
//!
//! The `DeepCopy` derive macro lives in `transcopy-derive` and is re-exported
//! when the `derive` feature is enabled.

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
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use transcopy_derive::DeepCopy;

// Generated code names this crate `::transcopy`, including inside it.
#[allow(unused_extern_crates)]
extern crate self as transcopy;

// Module declarations
mod scalars;

mod collections;
mod composite;
mod context;
mod copier;
mod diagnostics;
mod error;
mod options;
mod shape;
#[cfg(feature = "slog")]
pub mod slog;
pub mod transform;
mod value;

// Re-exports
pub use composite::{Access, Composite, CompositeBuilder, Descriptor, Property, Rebuild, SENSITIVE};
pub use context::{Context, Path};
pub use copier::{Copier, CopierBuilder, DeepCopy, TransformFn};
pub use diagnostics::{CollectingSink, DiagnosticsSink, TracingSink, Warning, WarningKind};
pub use error::{BoxError, CopyError};
pub use options::{CopyOptions, MAX_DEPTH};
pub use shape::{classify, Shape};
pub use value::Value;

/// Deep-copies `source`, passing every property value and collection element
/// through `transform`.
///
/// Uses [`CopyOptions::default`] and reports warnings through
/// [`TracingSink`]. Build a [`Copier`] to change either.
///
/// ```rust
/// use std::collections::HashMap;
///
/// let balances = HashMap::from([("alice".to_string(), 10_i64)]);
/// let hidden = transcopy::deep_copy_and_apply(&balances, |_, value| {
///     Ok(value.map(|_: i64| 0_i64))
/// })
/// .unwrap();
/// assert_eq!(hidden["alice"], 0);
/// ```
pub fn deep_copy_and_apply<T, F>(source: &T, transform: F) -> Result<T, CopyError>
where
    T: DeepCopy,
    F: Fn(Option<&Property>, Value) -> Result<Value, BoxError>,
{
    Copier::new(transform, &TracingSink, CopyOptions::default()).copy(source)
}

/// Deep-copies `source` without changing any value.
pub fn deep_copy<T: DeepCopy>(source: &T) -> Result<T, CopyError> {
    deep_copy_and_apply(source, transform::identity)
}
