//! Composite objects: property metadata and reconstruction.
//!
//! `#[derive(DeepCopy)]` registers a [`Descriptor`] per type and generates a
//! copy body that drives a [`CompositeBuilder`]:
//!
//! 1. [`Copier::composite`] checks that the type can be rebuilt at all.
//! 2. [`CompositeBuilder::property`] copies each property and runs the
//!    transform on it; [`CompositeBuilder::skip`] reports properties that
//!    cannot be copied generically.
//! 3. The generated code rebuilds the value using the type's [`Rebuild`]
//!    strategy, passing read-only values it cannot restore to
//!    [`CompositeBuilder::discard`].

use std::any::type_name;

use crate::{
    context::Context, copier::Copier, diagnostics::WarningKind, error::CopyError, DeepCopy,
};

/// Tag carried by properties marked `#[sensitive]`.
pub const SENSITIVE: &str = "sensitive";

/// How a property participates in reconstruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// Copied, transformed, and restored.
    ReadWrite,
    /// Copied and transformed, but only restored by a positional rebuild.
    ReadOnly,
    /// Cannot be copied generically; rebuilt from `Default`.
    Skipped,
}

/// Static metadata for one field of a composite type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Property {
    /// Field name; positional fields use their index (`"0"`, `"1"`).
    pub name: &'static str,
    /// Declared field type as written in the source.
    pub type_name: &'static str,
    /// Markers such as [`SENSITIVE`].
    pub tags: &'static [&'static str],
    pub access: Access,
}

impl Property {
    /// Returns `true` if the property carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }

    /// Returns `true` for properties marked `#[sensitive]`.
    pub fn is_sensitive(&self) -> bool {
        self.has_tag(SENSITIVE)
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }
}

/// Reconstruction strategy, chosen once when the type is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rebuild {
    /// Every property is passed to the type's literal (or variant) in order.
    Positional,
    /// A constructor function receives every non-skipped property in order.
    Constructor,
    /// `Default::default()` followed by assignment of writable properties.
    DefaultThenAssign,
    /// The type cannot be copied safely.
    Unsupported,
}

/// Compile-time descriptor of a composite type.
#[derive(Clone, Copy, Debug)]
pub struct Descriptor {
    pub type_name: &'static str,
    /// Properties in declaration order. Enum variants are flattened.
    pub properties: &'static [Property],
    pub rebuild: Rebuild,
}

impl Descriptor {
    /// Properties carrying `tag`.
    pub fn tagged(&self, tag: &'static str) -> impl Iterator<Item = &'static Property> {
        let properties: &'static [Property] = self.properties;
        properties
            .iter()
            .filter(move |property| property.has_tag(tag))
    }
}

/// A struct or enum with a registered [`Descriptor`].
///
/// Implemented by `#[derive(DeepCopy)]`.
pub trait Composite: DeepCopy {
    const DESCRIPTOR: Descriptor;
}

/// Drives the copy of one composite value.
pub struct CompositeBuilder<'b> {
    copier: &'b Copier<'b>,
    cx: &'b Context<'b>,
    descriptor: Descriptor,
}

impl<'b> CompositeBuilder<'b> {
    /// Copies the value of property `index` and applies the transform to it.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the descriptor's properties; generated
    /// code only passes indices it registered.
    pub fn property<T: DeepCopy>(&self, index: usize, value: &T) -> Result<T, CopyError> {
        let property = &self.descriptor.properties[index];
        let cx = self.cx.enter_property(property);
        let copied = self.copier.copy_node(value, &cx)?;
        self.copier.apply(copied, &cx)
    }

    /// Reports that property `index` was not copied.
    ///
    /// The rebuilt value holds the field's default instead.
    pub fn skip(&self, index: usize) {
        let property = &self.descriptor.properties[index];
        self.warn(
            WarningKind::IndexedPropertySkipped,
            property,
            &format!(
                "property `{}` of `{}` cannot be copied generically and was reset to its default",
                property.name, self.descriptor.type_name
            ),
        );
    }

    /// Drops the copied value of read-only property `index` and reports it.
    ///
    /// Used by default-then-assign rebuilds, which cannot restore read-only
    /// properties.
    pub fn discard<T>(&self, index: usize, value: T) {
        drop(value);
        let property = &self.descriptor.properties[index];
        self.warn(
            WarningKind::ReadOnlyPropertyLost,
            property,
            &format!(
                "read-only property `{}` of `{}` is not restored by its default-then-assign rebuild",
                property.name, self.descriptor.type_name
            ),
        );
    }

    fn warn(&self, kind: WarningKind, property: &Property, message: &str) {
        let cx = self.cx.enter_property(property);
        self.copier.warn(
            kind,
            &cx,
            message,
            &[
                ("type", self.descriptor.type_name),
                ("property", property.name),
            ],
        );
    }
}

impl<'a> Copier<'a> {
    /// Starts copying a composite value of type `T`.
    ///
    /// Fails with [`CopyError::NoUsableConstructor`] when `T` declares
    /// [`Rebuild::Unsupported`].
    pub fn composite<'b, T: Composite>(
        &'b self,
        cx: &'b Context<'b>,
    ) -> Result<CompositeBuilder<'b>, CopyError> {
        let descriptor = T::DESCRIPTOR;
        if descriptor.rebuild == Rebuild::Unsupported {
            return Err(self.no_constructor::<T>(cx));
        }
        Ok(CompositeBuilder {
            copier: self,
            cx,
            descriptor,
        })
    }

    /// The error reported for a type with no safe reconstruction.
    pub fn no_constructor<T: Composite>(&self, cx: &Context<'_>) -> CopyError {
        CopyError::NoUsableConstructor {
            path: cx.path().to_string(),
            type_name: type_name::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: Property = Property {
        name: "password",
        type_name: "String",
        tags: &[SENSITIVE, "vault"],
        access: Access::ReadWrite,
    };

    const LENGTH: Property = Property {
        name: "length",
        type_name: "usize",
        tags: &[],
        access: Access::ReadOnly,
    };

    #[test]
    fn tags_are_matched_exactly() {
        assert!(PASSWORD.is_sensitive());
        assert!(PASSWORD.has_tag("vault"));
        assert!(!PASSWORD.has_tag("Vault"));
        assert!(!LENGTH.is_sensitive());
    }

    #[test]
    fn only_read_write_properties_are_writable() {
        assert!(PASSWORD.is_writable());
        assert!(!LENGTH.is_writable());
    }

    #[test]
    fn descriptor_lists_tagged_properties() {
        let descriptor = Descriptor {
            type_name: "Credentials",
            properties: &[PASSWORD, LENGTH],
            rebuild: Rebuild::Positional,
        };
        let names: Vec<_> = descriptor.tagged(SENSITIVE).map(|p| p.name).collect();
        assert_eq!(names, ["password"]);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        owner: String,
        balance: i64,
        history: Vec<i64>,
    }

    // Hand-written equivalent of the derive output for a
    // `#[deep_copy(rebuild = "default")]` struct with a skipped field.
    impl Composite for Account {
        const DESCRIPTOR: Descriptor = Descriptor {
            type_name: "Account",
            properties: &[
                Property {
                    name: "owner",
                    type_name: "String",
                    tags: &[SENSITIVE],
                    access: Access::ReadWrite,
                },
                Property {
                    name: "balance",
                    type_name: "i64",
                    tags: &[],
                    access: Access::ReadOnly,
                },
                Property {
                    name: "history",
                    type_name: "Vec<i64>",
                    tags: &[],
                    access: Access::Skipped,
                },
            ],
            rebuild: Rebuild::DefaultThenAssign,
        };
    }

    impl DeepCopy for Account {
        const SHAPE: crate::Shape = crate::Shape::Composite;

        fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
            let builder = copier.composite::<Self>(cx)?;
            let Self {
                owner: field_0,
                balance: field_1,
                history: _,
            } = self;
            let mut rebuilt: Self = Default::default();
            rebuilt.owner = builder.property(0, field_0)?;
            builder.discard(1, builder.property(1, field_1)?);
            builder.skip(2);
            Ok(rebuilt)
        }
    }

    #[test]
    fn builder_reports_skipped_and_discarded_properties() {
        let sink = crate::CollectingSink::new();
        let copier = Copier::builder()
            .transform(|property, value| {
                assert!(property.is_some());
                Ok(value)
            })
            .diagnostics(&sink)
            .build()
            .unwrap();
        let source = Account {
            owner: "ana".to_string(),
            balance: 12,
            history: vec![1, 2],
        };

        let copy = copier.copy(&source).unwrap();
        assert_eq!(
            copy,
            Account {
                owner: "ana".to_string(),
                balance: 0,
                history: Vec::new(),
            }
        );

        let lost = sink.of_kind(WarningKind::ReadOnlyPropertyLost);
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].path(), "root.balance");
        assert_eq!(lost[0].tag("type"), Some("Account"));

        let skipped = sink.of_kind(WarningKind::IndexedPropertySkipped);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].tag("property"), Some("history"));
    }

    #[test]
    fn unsupported_types_fail_before_copying() {
        #[derive(Debug)]
        struct Handle;

        impl Composite for Handle {
            const DESCRIPTOR: Descriptor = Descriptor {
                type_name: "Handle",
                properties: &[],
                rebuild: Rebuild::Unsupported,
            };
        }

        impl DeepCopy for Handle {
            const SHAPE: crate::Shape = crate::Shape::Composite;

            fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
                copier.composite::<Self>(cx).map(|_| Self)
            }
        }

        let err = crate::deep_copy(&vec![Handle]).unwrap_err();
        assert!(matches!(
            err,
            CopyError::NoUsableConstructor { ref path, .. } if path == "root[0]"
        ));
    }
}
