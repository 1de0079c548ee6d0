//! Comma-separated list attributes.

use crate::element::{Element, ElementPath};
use crate::error::{ConfigError, ConfigResult};

/// Split a comma-separated value into trimmed tokens.
///
/// Empty tokens, from doubled delimiters or a blank input, are dropped.
///
/// # Example
///
/// ```
/// use sharding_config::list::split_list;
///
/// assert_eq!(split_list(" ds1 , ds2 ,ds3 "), vec!["ds1", "ds2", "ds3"]);
/// assert_eq!(split_list("a,,b"), vec!["a", "b"]);
/// assert!(split_list("").is_empty());
/// ```
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokens of a required list attribute.
///
/// A missing attribute is `MissingRequiredAttribute`; a present attribute
/// that yields no tokens is `InvalidListFormat`.
pub fn require_list(element: &Element, name: &str, path: &ElementPath) -> ConfigResult<Vec<String>> {
    let raw = element
        .attribute(name)
        .ok_or_else(|| ConfigError::missing_attribute(name, path))?;
    let tokens = split_list(raw);
    if tokens.is_empty() {
        return Err(ConfigError::invalid_list(name, path, raw));
    }
    Ok(tokens)
}
