//! The immutable type set and transparent wrappers.
//!
//! Immutable values are cloned unchanged. Wrappers (`Option`, `Box`, `Rc`,
//! `Arc`, `RefCell`, `Cell`, `Cow`) copy what they wrap in the same context:
//! they neither consume depth nor invoke the transform, so the transform sees
//! the wrapper once, at the property or element that holds it.

use std::{
    any::type_name,
    borrow::Cow,
    cell::{Cell, RefCell},
    marker::PhantomData,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    num::{
        NonZeroI128, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI8, NonZeroIsize, NonZeroU128,
        NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU8, NonZeroUsize,
    },
    rc::Rc,
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use crate::{
    context::Context, copier::Copier, diagnostics::WarningKind, error::CopyError, shape::Shape,
    DeepCopy,
};

/// Adds types to the immutable type set.
///
/// Each type must implement `Clone`; copies are plain clones and are never
/// passed through the set mutation guard. Use this for local scalar types
/// such as identifiers and fixed-point numbers.
///
/// ```rust
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// struct AccountNumber(u64);
///
/// transcopy::impl_immutable!(AccountNumber);
///
/// let copy = transcopy::deep_copy(&AccountNumber(7)).unwrap();
/// assert_eq!(copy, AccountNumber(7));
/// ```
#[macro_export]
macro_rules! impl_immutable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::DeepCopy for $ty {
                const SHAPE: $crate::Shape = $crate::Shape::Immutable;

                fn deep_copy(
                    &self,
                    _copier: &$crate::Copier<'_>,
                    _cx: &$crate::Context<'_>,
                ) -> ::core::result::Result<Self, $crate::CopyError> {
                    ::core::result::Result::Ok(::core::clone::Clone::clone(self))
                }
            }
        )+
    };
}

impl_immutable!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, (),
    String, &'static str,
);
impl_immutable!(
    NonZeroI8,
    NonZeroI16,
    NonZeroI32,
    NonZeroI64,
    NonZeroI128,
    NonZeroIsize,
    NonZeroU8,
    NonZeroU16,
    NonZeroU32,
    NonZeroU64,
    NonZeroU128,
    NonZeroUsize,
);
impl_immutable!(Duration, Instant, SystemTime);
impl_immutable!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

#[cfg(feature = "chrono")]
impl_immutable!(
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::Duration,
    chrono::Weekday,
    chrono::Month,
    chrono::FixedOffset,
    chrono::Utc,
);

#[cfg(feature = "chrono")]
impl<Tz> DeepCopy for chrono::DateTime<Tz>
where
    Tz: chrono::TimeZone + 'static,
{
    const SHAPE: Shape = Shape::Immutable;

    fn deep_copy(&self, _copier: &Copier<'_>, _cx: &Context<'_>) -> Result<Self, CopyError> {
        Ok(self.clone())
    }
}

impl<T> DeepCopy for PhantomData<T>
where
    T: ?Sized + 'static,
{
    const SHAPE: Shape = Shape::Immutable;

    fn deep_copy(&self, _copier: &Copier<'_>, _cx: &Context<'_>) -> Result<Self, CopyError> {
        Ok(Self)
    }
}

impl<T> DeepCopy for Option<T>
where
    T: DeepCopy,
{
    const SHAPE: Shape = Shape::nullable(T::SHAPE);
    const NULLABLE: bool = true;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        self.as_ref()
            .map(|value| copier.copy_node(value, cx))
            .transpose()
    }
}

impl<T> DeepCopy for Box<T>
where
    T: DeepCopy,
{
    const SHAPE: Shape = T::SHAPE;
    const NULLABLE: bool = T::NULLABLE;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        copier.copy_node(&**self, cx).map(Box::new)
    }
}

impl<T> DeepCopy for Rc<T>
where
    T: DeepCopy,
{
    const SHAPE: Shape = T::SHAPE;
    const NULLABLE: bool = T::NULLABLE;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        copier
            .copy_shared(Rc::as_ptr(self).cast(), &**self, cx)
            .map(Rc::new)
    }
}

impl<T> DeepCopy for Arc<T>
where
    T: DeepCopy,
{
    const SHAPE: Shape = T::SHAPE;
    const NULLABLE: bool = T::NULLABLE;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        copier
            .copy_shared(Arc::as_ptr(self).cast(), &**self, cx)
            .map(Arc::new)
    }
}

impl<T> DeepCopy for RefCell<T>
where
    T: DeepCopy,
{
    const SHAPE: Shape = T::SHAPE;
    const NULLABLE: bool = T::NULLABLE;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        let borrowed = self.try_borrow().map_err(|_| CopyError::Borrowed {
            path: cx.path().to_string(),
            type_name: type_name::<Self>(),
        })?;
        copier.copy_node(&*borrowed, cx).map(RefCell::new)
    }
}

impl<T> DeepCopy for Cell<T>
where
    T: DeepCopy + Copy,
{
    const SHAPE: Shape = T::SHAPE;
    const NULLABLE: bool = T::NULLABLE;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        copier.copy_node(&self.get(), cx).map(Cell::new)
    }
}

/// `Cow` copies always own their data.
///
/// A borrowed immutable value is shared unchanged. Any other borrowed value is
/// materialized as `Cow::Owned`; since the source was declared as a view
/// rather than an owned value, that emits a
/// [`TypeFidelityLoss`](WarningKind::TypeFidelityLoss) warning.
impl<B> DeepCopy for Cow<'static, B>
where
    B: ToOwned + ?Sized + 'static,
    B::Owned: DeepCopy,
{
    const SHAPE: Shape = <B::Owned as DeepCopy>::SHAPE;
    const NULLABLE: bool = <B::Owned as DeepCopy>::NULLABLE;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        match self {
            Cow::Owned(owned) => copier.copy_node(owned, cx).map(Cow::Owned),
            Cow::Borrowed(borrowed) if Self::SHAPE.is_immutable() => Ok(Cow::Borrowed(*borrowed)),
            Cow::Borrowed(borrowed) => {
                let owned = B::to_owned(borrowed);
                let copied = copier.copy_node(&owned, cx)?;
                copier.warn(
                    WarningKind::TypeFidelityLoss,
                    cx,
                    "borrowed view was materialized as an owned value",
                    &[
                        ("declared", type_name::<Self>()),
                        ("materialized", type_name::<B::Owned>()),
                    ],
                );
                Ok(Cow::Owned(copied))
            }
        }
    }
}
