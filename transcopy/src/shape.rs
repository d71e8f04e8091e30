//! Copy strategies and the type classifier.
//!
//! Every [`DeepCopy`](crate::DeepCopy) type declares a [`Shape`] at compile
//! time. The shape decides how the graph copier treats a value:
//!
//! | Shape | Examples | Behavior |
//! |-------|----------|----------|
//! | `Nullable` | `Option<i32>` | Returned unchanged |
//! | `Immutable` | `bool`, `u64`, `String`, `Duration` | Returned unchanged |
//! | `Array` | `[T; N]`, `Box<[T]>` | Element-wise; rank > 1 rejected |
//! | `LegacyList` | `VecDeque<T>`, `LinkedList<T>` | Rebuilt via `Default` + append |
//! | `Map` | `HashMap<K, V>`, `BTreeMap<K, V>` | Values copied, keys cloned |
//! | `Set` | `HashSet<T>`, `BTreeSet<T>` | Elements copied under the mutation guard |
//! | `List` | `Vec<T>`, `Cow<'static, [T]>` | Rebuilt as an owned sequence |
//! | `Composite` | `#[derive(DeepCopy)]` structs and enums | Property by property |
//!
//! Transparent wrappers (`Box`, `Rc`, `Arc`, `RefCell`, `Cow`, and `Option`
//! over a non-immutable type) report the shape of what they wrap.

use std::fmt;

use crate::{context::Context, error::CopyError, DeepCopy};

/// The copy strategy of a type, in classification order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// An optional wrapper around an immutable value.
    Nullable,
    /// A member of the immutable type set.
    Immutable,
    /// A fixed-length array. `rank` counts nested array dimensions.
    Array {
        /// Number of array dimensions (1 for `[T; N]`, 2 for `[[T; N]; M]`).
        rank: usize,
    },
    /// A sequence rebuilt through its no-argument constructor.
    LegacyList,
    /// A keyed map.
    Map {
        /// Whether the key type belongs to the immutable type set.
        key_immutable: bool,
    },
    /// A collection of unique elements.
    Set {
        /// Whether the element type belongs to the immutable type set.
        element_immutable: bool,
    },
    /// An ordered sequence.
    List,
    /// A struct or enum copied property by property.
    Composite,
}

impl Shape {
    /// Returns `true` for shapes that are copied by returning the value unchanged.
    pub const fn is_immutable(self) -> bool {
        matches!(self, Self::Nullable | Self::Immutable)
    }

    /// Shape of an `Option` around a value of shape `inner`.
    pub const fn nullable(inner: Self) -> Self {
        if inner.is_immutable() {
            Self::Nullable
        } else {
            inner
        }
    }

    /// Shape of an array whose elements have shape `element`.
    pub const fn array_of(element: Self) -> Self {
        match element {
            Self::Array { rank } => Self::Array { rank: rank + 1 },
            _ => Self::Array { rank: 1 },
        }
    }

    /// Shape of a map whose keys have shape `key`.
    pub const fn map_keyed_by(key: Self) -> Self {
        Self::Map {
            key_immutable: key.is_immutable(),
        }
    }

    /// Shape of a set whose elements have shape `element`.
    pub const fn set_of(element: Self) -> Self {
        Self::Set {
            element_immutable: element.is_immutable(),
        }
    }

    /// Short lowercase label used in logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nullable => "nullable",
            Self::Immutable => "immutable",
            Self::Array { .. } => "array",
            Self::LegacyList => "legacy_list",
            Self::Map { .. } => "map",
            Self::Set { .. } => "set",
            Self::List => "list",
            Self::Composite => "composite",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array { rank } if *rank > 1 => write!(f, "{rank}-dimensional array"),
            other => f.write_str(other.label()),
        }
    }
}

/// Classifies `T` and rejects shapes that cannot be copied.
///
/// Multi-dimensional arrays and maps keyed by non-immutable types fail with
/// [`CopyError::Unsupported`]; every other shape is returned as-is.
/// [Nullable](DeepCopy::NULLABLE) types are never rejected here: `None`
/// copies to `None`, and the value inside `Some` is classified on its own.
pub fn classify<T: DeepCopy>(cx: &Context<'_>) -> Result<Shape, CopyError> {
    if T::NULLABLE {
        return Ok(T::SHAPE);
    }
    match T::SHAPE {
        Shape::Array { rank } if rank > 1 => Err(CopyError::Unsupported {
            path: cx.path().to_string(),
            type_name: std::any::type_name::<T>(),
            reason: format!("{rank}-dimensional arrays are not supported"),
        }),
        Shape::Map {
            key_immutable: false,
        } => Err(CopyError::Unsupported {
            path: cx.path().to_string(),
            type_name: std::any::type_name::<T>(),
            reason: "map keys must belong to the immutable type set".to_string(),
        }),
        shape => Ok(shape),
    }
}
