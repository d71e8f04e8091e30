//! The graph copier: depth bound, classification, dispatch, and transform
//! invocation.
//!
//! ## Transform placement
//!
//! The transform runs once per property value and once per collection
//! element, after the value has been copied and at the point where its
//! container references it. The root value is never transformed; only its
//! descendants are.

use std::{any::type_name, collections::BTreeMap};

use tracing::{debug, trace};

use crate::{
    composite::Property,
    context::{Context, Frame},
    diagnostics::{DiagnosticsSink, TracingSink, WarningKind},
    error::{BoxError, CopyError},
    options::CopyOptions,
    shape::{classify, Shape},
    value::Value,
};

/// The caller-supplied transform.
///
/// Receives the metadata of the containing property (if any) and the copied
/// value, and returns the value to embed in the result.
pub type TransformFn<'a> = dyn Fn(Option<&Property>, Value) -> Result<Value, BoxError> + 'a;

/// A type that can be deep-copied by a [`Copier`].
///
/// Implemented for the immutable scalars, std collections, and smart
/// pointers, and by `#[derive(DeepCopy)]` for structs and enums.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be deep-copied",
    label = "this type has no copy strategy",
    note = "use `#[derive(DeepCopy)]` on the type definition",
    note = "scalar newtypes can use `#[deep_copy(immutable)]` or `transcopy::impl_immutable!`"
)]
pub trait DeepCopy: Sized + 'static {
    /// How the copier treats values of this type.
    const SHAPE: Shape;

    /// Whether a value of this type may be `None`.
    ///
    /// Nullable types skip shape rejection in [`classify`]; an absent value
    /// has nothing to reject, and a present one is classified when the
    /// wrapper copies it.
    const NULLABLE: bool = false;

    /// Copies `self`. Implementations recurse through [`Copier::copy_node`]
    /// and [`Copier::copy_element`], never by calling `deep_copy` directly.
    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError>;
}

/// Runs deep copies with a fixed transform, sink, and options.
pub struct Copier<'a> {
    transform: Box<TransformFn<'a>>,
    sink: &'a dyn DiagnosticsSink,
    options: CopyOptions,
}

impl<'a> Copier<'a> {
    pub fn new<F>(transform: F, sink: &'a dyn DiagnosticsSink, options: CopyOptions) -> Self
    where
        F: Fn(Option<&Property>, Value) -> Result<Value, BoxError> + 'a,
    {
        Self {
            transform: Box::new(transform),
            sink,
            options,
        }
    }

    #[must_use]
    pub fn builder() -> CopierBuilder<'a> {
        CopierBuilder::default()
    }

    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Copies `source` starting at depth 0 and path `root`.
    ///
    /// The root itself is not passed to the transform.
    pub fn copy<T: DeepCopy>(&self, source: &T) -> Result<T, CopyError> {
        let shape = T::SHAPE;
        debug!(
            type_name = type_name::<T>(),
            %shape,
            max_depth = self.options.max_depth(),
            "deep copy started"
        );
        let result = self.copy_node(source, &Context::root());
        match &result {
            Ok(_) => debug!(type_name = type_name::<T>(), "deep copy finished"),
            Err(err) => debug!(type_name = type_name::<T>(), error = %err, "deep copy failed"),
        }
        result
    }

    /// Copies one node without transforming it.
    ///
    /// Checks the depth bound, classifies `T`, then dispatches to its
    /// [`DeepCopy`] impl.
    pub fn copy_node<T: DeepCopy>(&self, value: &T, cx: &Context<'_>) -> Result<T, CopyError> {
        if cx.depth() > self.options.max_depth() {
            return Err(CopyError::DepthExceeded {
                path: cx.path().to_string(),
                max_depth: self.options.max_depth(),
            });
        }
        let shape = classify::<T>(cx)?;
        trace!(path = %cx.path(), depth = cx.depth(), %shape, "copying node");
        value.deep_copy(self, cx)
    }

    /// Copies a collection element and applies the transform to it.
    ///
    /// `cx` is the element's own context (see [`Context::enter_index`] and
    /// [`Context::enter_key`]).
    pub fn copy_element<T: DeepCopy>(&self, value: &T, cx: &Context<'_>) -> Result<T, CopyError> {
        let copied = self.copy_node(value, cx)?;
        self.apply(copied, cx)
    }

    /// Runs the transform on an already-copied value.
    pub fn apply<T: DeepCopy>(&self, value: T, cx: &Context<'_>) -> Result<T, CopyError> {
        let transformed = (self.transform)(cx.property(), Value::new(value)).map_err(|source| {
            CopyError::Transform {
                path: cx.path().to_string(),
                member: cx.path().member(),
                type_name: type_name::<T>(),
                source,
            }
        })?;
        transformed
            .into_inner::<T>()
            .map_err(|found| CopyError::TransformType {
                path: cx.path().to_string(),
                expected: type_name::<T>(),
                found: found.type_name(),
            })
    }

    /// Copies the target of a shared pointer located at `ptr`.
    ///
    /// With cycle detection enabled, a pointer already on the ancestor chain
    /// fails with [`CopyError::CycleDetected`]; otherwise this is
    /// [`Copier::copy_node`].
    pub fn copy_shared<T: DeepCopy>(
        &self,
        ptr: *const (),
        value: &T,
        cx: &Context<'_>,
    ) -> Result<T, CopyError> {
        if !self.options.detect_cycles() {
            return self.copy_node(value, cx);
        }
        if cx.visits(ptr) {
            return Err(CopyError::CycleDetected {
                path: cx.path().to_string(),
            });
        }
        let frame = Frame {
            ptr,
            parent: cx.frames(),
        };
        let cx = cx.with_frame(&frame);
        self.copy_node(value, &cx)
    }

    /// Sends a warning about the node at `cx` to the diagnostics sink.
    ///
    /// `details` become tags alongside `path`.
    pub fn warn(
        &self,
        kind: WarningKind,
        cx: &Context<'_>,
        message: &str,
        details: &[(&str, &str)],
    ) {
        let mut tags = BTreeMap::new();
        tags.insert("path".to_string(), cx.path().to_string());
        for (key, value) in details {
            tags.insert((*key).to_string(), (*value).to_string());
        }
        self.sink.add_warning(message, kind, &tags);
    }
}

/// Builder for a [`Copier`].
///
/// `build` fails with [`CopyError::MissingTransform`] if no transform was
/// supplied. The sink defaults to [`TracingSink`].
#[must_use]
pub struct CopierBuilder<'a> {
    transform: Option<Box<TransformFn<'a>>>,
    sink: Option<&'a dyn DiagnosticsSink>,
    options: CopyOptions,
}

impl Default for CopierBuilder<'_> {
    fn default() -> Self {
        Self {
            transform: None,
            sink: None,
            options: CopyOptions::default(),
        }
    }
}

impl<'a> CopierBuilder<'a> {
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Option<&Property>, Value) -> Result<Value, BoxError> + 'a,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn diagnostics(mut self, sink: &'a dyn DiagnosticsSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn options(mut self, options: CopyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Copier<'a>, CopyError> {
        let transform = self.transform.ok_or(CopyError::MissingTransform)?;
        Ok(Copier {
            transform,
            sink: self.sink.unwrap_or(&TracingSink),
            options: self.options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn identity(_: Option<&Property>, value: Value) -> Result<Value, BoxError> {
        Ok(value)
    }

    #[test]
    fn builder_without_transform_fails() {
        let err = Copier::builder().build().err().unwrap();
        assert!(matches!(err, CopyError::MissingTransform));
    }

    #[test]
    fn root_is_never_transformed() {
        let copier = Copier::builder()
            .transform(|_, _| Ok(Value::new("changed".to_string())))
            .build()
            .unwrap();
        let copy = copier.copy(&"hello".to_string()).unwrap();
        assert_eq!(copy, "hello");
    }

    #[test]
    fn elements_of_a_root_collection_see_no_property() {
        let copier = Copier::builder()
            .transform(|property, value| {
                assert!(property.is_none());
                Ok(value.map(|n: i32| n + 1))
            })
            .build()
            .unwrap();
        assert_eq!(copier.copy(&vec![1, 2, 3]).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn depth_bound_is_checked_before_dispatch() {
        let copier = Copier::builder()
            .transform(identity)
            .options(CopyOptions::new().with_max_depth(1))
            .build()
            .unwrap();
        assert!(copier.copy(&vec![1_u8]).is_ok());
        let err = copier.copy(&vec![vec![1_u8]]).unwrap_err();
        match err {
            CopyError::DepthExceeded { path, max_depth } => {
                assert_eq!(path, "root[0][0]");
                assert_eq!(max_depth, 1);
            }
            other => panic!("expected DepthExceeded, got {other:?}"),
        }
    }

    #[test]
    fn transform_returning_another_type_is_rejected() {
        let copier = Copier::builder()
            .transform(|_, _| Ok(Value::new(0_u64)))
            .build()
            .unwrap();
        let err = copier.copy(&vec!["a".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            CopyError::TransformType { ref path, found: "u64", .. } if path == "root[0]"
        ));
    }

    #[test]
    fn warnings_carry_the_path_tag() {
        let sink = CollectingSink::new();
        let copier = Copier::builder()
            .transform(identity)
            .diagnostics(&sink)
            .build()
            .unwrap();
        let cx = Context::root();
        copier.warn(
            WarningKind::TypeFidelityLoss,
            &cx.enter_index(2),
            "lost",
            &[("declared", "Cow")],
        );
        let warnings = sink.take();
        assert_eq!(warnings[0].path(), "root[2]");
        assert_eq!(warnings[0].tag("declared"), Some("Cow"));
    }
}
