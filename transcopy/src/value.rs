//! Type-erased values handed to transform functions.

use std::{any::Any, fmt};

/// An owned, already-copied value passed through a transform.
///
/// The transform receives one `Value` per property value and per collection
/// element and returns the `Value` to embed in the copy. It must return a
/// value of the same concrete type; the copier reports a
/// [`CopyError::TransformType`](crate::CopyError::TransformType) otherwise.
///
/// ```rust
/// use transcopy::Value;
///
/// let value = Value::new("secret".to_string());
/// let value = value.map_text(|text| text.to_uppercase());
/// assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("SECRET"));
/// ```
pub struct Value {
    inner: Box<dyn Any>,
    type_name: &'static str,
}

impl Value {
    /// Wraps `value`.
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.inner.downcast_mut()
    }

    /// Unwraps the value, or returns `self` unchanged if it is not a `T`.
    pub fn into_inner<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.inner
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|inner| Self { inner, type_name })
    }

    /// Applies `f` if the value is a `T`; other values pass through.
    #[must_use]
    pub fn map<T: Any>(self, f: impl FnOnce(T) -> T) -> Self {
        match self.into_inner::<T>() {
            Ok(value) => Self::new(f(value)),
            Err(value) => value,
        }
    }

    /// Fallible [`Value::map`].
    pub fn try_map<T: Any, E>(self, f: impl FnOnce(T) -> Result<T, E>) -> Result<Self, E> {
        match self.into_inner::<T>() {
            Ok(value) => f(value).map(Self::new),
            Err(value) => Ok(value),
        }
    }

    /// Applies `f` to text: a `String`, or the contents of a `Some(String)`.
    ///
    /// Any other value passes through unchanged.
    #[must_use]
    pub fn map_text(self, f: impl FnOnce(String) -> String) -> Self {
        match self.into_inner::<String>() {
            Ok(text) => Self::new(f(text)),
            Err(value) => value.map(|text: Option<String>| text.map(f)),
        }
    }

    /// Fallible [`Value::map_text`].
    pub fn try_map_text<E>(self, f: impl FnOnce(String) -> Result<String, E>) -> Result<Self, E> {
        match self.into_inner::<String>() {
            Ok(text) => f(text).map(Self::new),
            Err(value) => value.try_map(|text: Option<String>| text.map(f).transpose()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_inner_hands_back_the_value_on_mismatch() {
        let value = Value::new(42_u32);
        let value = value.into_inner::<String>().unwrap_err();
        assert_eq!(value.type_name(), "u32");
        assert_eq!(value.into_inner::<u32>().unwrap(), 42);
    }

    #[test]
    fn map_only_touches_matching_types() {
        let doubled = Value::new(21_i64).map(|n: i64| n * 2);
        assert_eq!(doubled.downcast_ref::<i64>(), Some(&42));

        let untouched = Value::new(true).map(|n: i64| n * 2);
        assert_eq!(untouched.downcast_ref::<bool>(), Some(&true));
    }

    #[test]
    fn map_text_handles_optional_strings() {
        let some = Value::new(Some("abc".to_string())).map_text(|t| t.repeat(2));
        assert_eq!(
            some.downcast_ref::<Option<String>>(),
            Some(&Some("abcabc".to_string()))
        );

        let none = Value::new(None::<String>).map_text(|t| t.repeat(2));
        assert_eq!(none.downcast_ref::<Option<String>>(), Some(&None));

        let number = Value::new(7_u8).map_text(|t| t.repeat(2));
        assert!(number.is::<u8>());
    }

    #[test]
    fn try_map_text_propagates_errors() {
        let result = Value::new("secret".to_string()).try_map_text(|_| Err("no key"));
        assert_eq!(result.unwrap_err(), "no key");

        let result = Value::new(Some("x".to_string())).try_map_text(|t| Ok::<_, ()>(t + "y"));
        assert_eq!(
            result.unwrap().into_inner::<Option<String>>().unwrap(),
            Some("xy".to_string())
        );
    }

    #[test]
    fn downcast_mut_edits_in_place() {
        let mut value = Value::new(vec![1, 2]);
        value.downcast_mut::<Vec<i32>>().unwrap().push(3);
        assert_eq!(value.into_inner::<Vec<i32>>().unwrap(), vec![1, 2, 3]);
    }
}
