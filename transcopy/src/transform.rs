//! Ready-made transform functions.
//!
//! Transforms are plain closures; these helpers cover the common case of
//! rewriting text stored in tagged properties, such as encrypting every
//! `#[sensitive]` string before a model is persisted.
//!
//! ```rust
//! use transcopy::{deep_copy_and_apply, transform::on_sensitive, BoxError};
//!
//! fn shout(text: String) -> Result<String, BoxError> {
//!     Ok(text.to_uppercase())
//! }
//!
//! // Root-level collections have no containing property, so nothing is tagged.
//! let copy = deep_copy_and_apply(&vec!["quiet".to_string()], on_sensitive(shout)).unwrap();
//! assert_eq!(copy, ["quiet"]);
//! ```

use crate::{
    composite::{Property, SENSITIVE},
    error::BoxError,
    value::Value,
};

/// Returns every value unchanged.
pub fn identity(_property: Option<&Property>, value: Value) -> Result<Value, BoxError> {
    Ok(value)
}

/// Applies `f` to text values inside properties tagged `tag`.
///
/// Matches `String` and `Option<String>` values, including the elements of
/// tagged collections (elements inherit their collection's property). All
/// other values pass through.
pub fn on_tag<F>(
    tag: &'static str,
    f: F,
) -> impl Fn(Option<&Property>, Value) -> Result<Value, BoxError>
where
    F: Fn(String) -> Result<String, BoxError>,
{
    move |property, value| match property {
        Some(property) if property.has_tag(tag) => value.try_map_text(&f),
        _ => Ok(value),
    }
}

/// [`on_tag`] for properties marked `#[sensitive]`.
pub fn on_sensitive<F>(f: F) -> impl Fn(Option<&Property>, Value) -> Result<Value, BoxError>
where
    F: Fn(String) -> Result<String, BoxError>,
{
    on_tag(SENSITIVE, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::Access;

    const TOKEN: Property = Property {
        name: "token",
        type_name: "String",
        tags: &[SENSITIVE],
        access: Access::ReadWrite,
    };

    const NOTE: Property = Property {
        name: "note",
        type_name: "Option<String>",
        tags: &["audit"],
        access: Access::ReadWrite,
    };

    fn reverse(text: String) -> Result<String, BoxError> {
        Ok(text.chars().rev().collect())
    }

    #[test]
    fn identity_returns_its_input() {
        let value = identity(Some(&TOKEN), Value::new(3_u8)).unwrap();
        assert_eq!(value.into_inner::<u8>().unwrap(), 3);
    }

    #[test]
    fn on_sensitive_only_touches_tagged_text() {
        let transform = on_sensitive(reverse);

        let tagged = transform(Some(&TOKEN), Value::new("abc".to_string())).unwrap();
        assert_eq!(tagged.into_inner::<String>().unwrap(), "cba");

        let untagged = transform(Some(&NOTE), Value::new(Some("abc".to_string()))).unwrap();
        assert_eq!(
            untagged.into_inner::<Option<String>>().unwrap().as_deref(),
            Some("abc")
        );

        let rootless = transform(None, Value::new("abc".to_string())).unwrap();
        assert_eq!(rootless.into_inner::<String>().unwrap(), "abc");
    }

    #[test]
    fn on_tag_matches_custom_tags() {
        let transform = on_tag("audit", reverse);
        let value = transform(Some(&NOTE), Value::new(Some("xy".to_string()))).unwrap();
        assert_eq!(
            value.into_inner::<Option<String>>().unwrap().as_deref(),
            Some("yx")
        );
    }

    #[test]
    fn errors_from_the_mapping_propagate() {
        let transform = on_sensitive(|_| Err("key unavailable".into()));
        let err = transform(Some(&TOKEN), Value::new("abc".to_string())).unwrap_err();
        assert_eq!(err.to_string(), "key unavailable");
    }
}
