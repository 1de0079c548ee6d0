//! Attribute presence rules.
//!
//! An attribute counts as supplied only when it exists and is non-empty after
//! trimming. A blank attribute is the same as a missing one, never an explicit
//! empty override.

use crate::element::{Element, ElementPath};
use crate::error::{ConfigError, ConfigResult};

/// Trimmed attribute value, or `None` when missing or blank.
///
/// # Example
///
/// ```
/// use sharding_config::{presence, Element};
///
/// let rule = Element::new("tableRule")
///     .with_attribute("logicTable", " t_order ")
///     .with_attribute("logicIndex", "   ");
///
/// assert_eq!(presence::resolve(&rule, "logicTable"), Some("t_order"));
/// assert_eq!(presence::resolve(&rule, "logicIndex"), None);
/// assert_eq!(presence::resolve(&rule, "actualDataNodes"), None);
/// ```
pub fn resolve<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element.attribute(name).and_then(normalize)
}

/// Apply the presence rule to a raw value: trimmed, or `None` when blank.
pub fn normalize(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Like [`resolve`], but absence is a `MissingRequiredAttribute` error.
pub fn require<'a>(element: &'a Element, name: &str, path: &ElementPath) -> ConfigResult<&'a str> {
    resolve(element, name).ok_or_else(|| ConfigError::missing_attribute(name, path))
}
