//! Deferred named references.
//!
//! The compiler never dereferences a name. It records a [`NamedReference`]
//! and leaves resolution against the full set of declarations to the host,
//! which can use [`Declarations`] with
//! [`RootConfiguration::check_references`](crate::RootConfiguration::check_references).

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::BuildHasher;

use indexmap::IndexSet;
use serde::Serialize;

use crate::element::Element;
use crate::presence;

/// Pointer to another declared configuration fragment, by name only.
///
/// A required reference must resolve when the consumer wires the
/// configuration up; an optional one may be left unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamedReference {
    name: String,
    required: bool,
}

impl NamedReference {
    /// A reference the consumer must be able to resolve.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// A reference the consumer may leave unresolved.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }

    /// The referenced name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether resolution is mandatory at consumption time.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl fmt::Display for NamedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref({})", self.name)?;
        if !self.required {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Turn a possibly-blank name into a required reference.
///
/// # Example
///
/// ```
/// use sharding_config::reference::as_reference;
///
/// assert_eq!(as_reference(Some(" orderKeyGen ")).unwrap().name(), "orderKeyGen");
/// assert!(as_reference(Some("")).is_none());
/// assert!(as_reference(None).is_none());
/// ```
pub fn as_reference(name: Option<&str>) -> Option<NamedReference> {
    name.and_then(presence::normalize).map(NamedReference::new)
}

/// Read a reference attribute under the presence rules.
pub fn resolve_reference(element: &Element, attribute: &str) -> Option<NamedReference> {
    as_reference(presence::resolve(element, attribute))
}

/// The set of fragment names a consumer has declared.
pub trait Declarations {
    /// Whether a fragment with this name exists.
    fn is_declared(&self, name: &str) -> bool;
}

impl<S: BuildHasher> Declarations for HashSet<String, S> {
    fn is_declared(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl Declarations for BTreeSet<String> {
    fn is_declared(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<S: BuildHasher> Declarations for IndexSet<String, S> {
    fn is_declared(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl Declarations for [&str] {
    fn is_declared(&self, name: &str) -> bool {
        self.contains(&name)
    }
}

/// One recorded reference together with the field it was recorded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite<'a> {
    /// Field location, e.g. `tableRule[t_order].keyGeneratorRef`.
    pub site: String,
    /// The reference itself.
    pub reference: &'a NamedReference,
}
