//! Collection copiers.
//!
//! Every element is copied in its own context (depth + 1, `[index]` or
//! `[key]`, same containing property) and then passed through the transform.
//! Map keys are copied but never transformed.

use std::{
    any::{type_name, Any},
    cmp::Ordering,
    collections::{
        hash_map::{DefaultHasher, RandomState},
        BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque,
    },
    fmt::Debug,
    hash::{BuildHasher, BuildHasherDefault, Hash},
};

use crate::{
    context::Context, copier::Copier, diagnostics::WarningKind, error::CopyError, shape::Shape,
    DeepCopy,
};

impl<T> DeepCopy for Vec<T>
where
    T: DeepCopy,
{
    const SHAPE: Shape = Shape::List;

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        self.iter()
            .enumerate()
            .map(|(index, element)| copier.copy_element(element, &cx.enter_index(index)))
            .collect()
    }
}

impl<T, const N: usize> DeepCopy for [T; N]
where
    T: DeepCopy,
{
    const SHAPE: Shape = Shape::array_of(T::SHAPE);

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        let copied = self
            .iter()
            .enumerate()
            .map(|(index, element)| copier.copy_element(element, &cx.enter_index(index)))
            .collect::<Result<Vec<T>, _>>()?;
        copied
            .try_into()
            .map_err(|copied: Vec<T>| CopyError::Unsupported {
                path: cx.path().to_string(),
                type_name: type_name::<Self>(),
                reason: format!("expected {N} elements, copied {}", copied.len()),
            })
    }
}

impl<T> DeepCopy for Box<[T]>
where
    T: DeepCopy,
{
    const SHAPE: Shape = Shape::array_of(T::SHAPE);

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        self.iter()
            .enumerate()
            .map(|(index, element)| copier.copy_element(element, &cx.enter_index(index)))
            .collect()
    }
}

macro_rules! impl_legacy_list {
    ($($list:ident),+) => {
        $(
            /// Rebuilt through `Default` and `push_back`, in iteration order.
            impl<T> DeepCopy for $list<T>
            where
                T: DeepCopy,
            {
                const SHAPE: Shape = Shape::LegacyList;

                fn deep_copy(
                    &self,
                    copier: &Copier<'_>,
                    cx: &Context<'_>,
                ) -> Result<Self, CopyError> {
                    let mut rebuilt = Self::default();
                    for (index, element) in self.iter().enumerate() {
                        rebuilt.push_back(copier.copy_element(element, &cx.enter_index(index))?);
                    }
                    Ok(rebuilt)
                }
            }
        )+
    };
}

impl_legacy_list!(VecDeque, LinkedList);

/// `HashMap` keeps the source's hasher when it can.
///
/// A `RandomState` is cloned and a zero-sized hasher is rebuilt from
/// `Default`. Any other hasher carries state the copier cannot clone, so the
/// copy uses `S::default()` and a
/// [`ComparerFallback`](WarningKind::ComparerFallback) warning is emitted.
impl<K, V, S> DeepCopy for HashMap<K, V, S>
where
    K: DeepCopy + Eq + Hash + Debug,
    V: DeepCopy,
    S: BuildHasher + Default + 'static,
{
    const SHAPE: Shape = Shape::map_keyed_by(K::SHAPE);

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        let hasher = carry_hasher(self.hasher(), copier, cx);
        let mut rebuilt = HashMap::with_capacity_and_hasher(self.len(), hasher);
        for (key, value) in self {
            let entry_cx = cx.enter_key(key);
            let key = copier.copy_node(key, &entry_cx)?;
            let value = copier.copy_element(value, &entry_cx)?;
            rebuilt.insert(key, value);
        }
        Ok(rebuilt)
    }
}

impl<K, V> DeepCopy for BTreeMap<K, V>
where
    K: DeepCopy + Ord + Debug,
    V: DeepCopy,
{
    const SHAPE: Shape = Shape::map_keyed_by(K::SHAPE);

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        let mut rebuilt = BTreeMap::new();
        for (key, value) in self {
            let entry_cx = cx.enter_key(key);
            let key = copier.copy_node(key, &entry_cx)?;
            let value = copier.copy_element(value, &entry_cx)?;
            rebuilt.insert(key, value);
        }
        Ok(rebuilt)
    }
}

/// Elements that are not immutable run under the set mutation guard (see
/// [`CopyOptions::with_set_mutation_guard`](crate::CopyOptions::with_set_mutation_guard)).
/// Elements the transform maps onto equal values are merged.
impl<T, S> DeepCopy for HashSet<T, S>
where
    T: DeepCopy + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    const SHAPE: Shape = Shape::set_of(T::SHAPE);

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        let hasher = carry_hasher(self.hasher(), copier, cx);
        let mut rebuilt = HashSet::with_capacity_and_hasher(self.len(), hasher);
        for (index, element) in self.iter().enumerate() {
            let element_cx = cx.enter_index(index);
            rebuilt.insert(copy_set_element(element, copier, &element_cx, |before, after| {
                fingerprint(before) == fingerprint(after)
            })?);
        }
        Ok(rebuilt)
    }
}

/// The guard compares elements by ordering, so `T` needs `Ord` but not `Hash`.
impl<T> DeepCopy for BTreeSet<T>
where
    T: DeepCopy + Ord,
{
    const SHAPE: Shape = Shape::set_of(T::SHAPE);

    fn deep_copy(&self, copier: &Copier<'_>, cx: &Context<'_>) -> Result<Self, CopyError> {
        let mut rebuilt = BTreeSet::new();
        for (index, element) in self.iter().enumerate() {
            let element_cx = cx.enter_index(index);
            rebuilt.insert(copy_set_element(element, copier, &element_cx, |before, after| {
                before.cmp(after) == Ordering::Equal
            })?);
        }
        Ok(rebuilt)
    }
}

/// Copies and transforms one set element.
///
/// Under the guard, `same_key(source, transformed)` must hold or the element
/// fails with [`CopyError::UnsafeSetMutation`].
fn copy_set_element<T, F>(
    element: &T,
    copier: &Copier<'_>,
    cx: &Context<'_>,
    same_key: F,
) -> Result<T, CopyError>
where
    T: DeepCopy,
    F: Fn(&T, &T) -> bool,
{
    let copied = copier.copy_node(element, cx)?;
    if T::SHAPE.is_immutable() || !copier.options().set_mutation_guard() {
        return copier.apply(copied, cx);
    }
    let transformed = copier.apply(copied, cx)?;
    if !same_key(element, &transformed) {
        return Err(CopyError::UnsafeSetMutation {
            path: cx.path().to_string(),
            type_name: type_name::<T>(),
        });
    }
    Ok(transformed)
}

/// Deterministic within a process, unlike `RandomState`.
fn fingerprint<T: Hash>(value: &T) -> u64 {
    BuildHasherDefault::<DefaultHasher>::default().hash_one(value)
}

fn carry_hasher<S>(source: &S, copier: &Copier<'_>, cx: &Context<'_>) -> S
where
    S: BuildHasher + Default + 'static,
{
    let source: &dyn Any = source;
    if let Some(state) = source.downcast_ref::<RandomState>() {
        let cloned: Box<dyn Any> = Box::new(state.clone());
        if let Ok(hasher) = cloned.downcast::<S>() {
            return *hasher;
        }
    }
    if std::mem::size_of::<S>() == 0 {
        return S::default();
    }
    copier.warn(
        WarningKind::ComparerFallback,
        cx,
        "collection hasher could not be cloned; the copy uses its default",
        &[("hasher", type_name::<S>())],
    );
    S::default()
}
