//! Generic element tree consumed by the compiler.
//!
//! An [`Element`] is what an external tree-reader hands over: a tag name, an
//! ordered attribute map and ordered children. The tree is also
//! (de)serializable so a host can store it as JSON or TOML:
//!
//! ```json
//! {
//!   "tag": "shardingRuleConfig",
//!   "attributes": { "defaultDataSource": "ds_0" },
//!   "children": [
//!     { "tag": "tableRules", "children": [
//!       { "tag": "tableRule", "attributes": { "logicTable": "t_order" } }
//!     ] }
//!   ]
//! }
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of the input tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Element {
    tag: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    attributes: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Element>,
}

impl Element {
    /// Create an element with no attributes and no children.
    ///
    /// # Example
    ///
    /// ```
    /// use sharding_config::Element;
    ///
    /// let rule = Element::new("tableRule").with_attribute("logicTable", "t_order");
    /// assert_eq!(rule.attribute("logicTable"), Some("t_order"));
    /// ```
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Add (or replace) an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child elements in order.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// The tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Raw attribute value, untrimmed. `None` only when the attribute is missing.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All children in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Children with the given tag, in document order. Other tags are skipped.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }
}

/// Location of an element inside the document.
///
/// Rendered as tag names from the root down, joined with `/`. Repeated
/// children carry their position among same-tag siblings, e.g.
/// `shardingRuleConfig/tableRules/tableRule[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ElementPath {
    segments: Vec<String>,
}

impl ElementPath {
    /// Path consisting of the root tag only.
    pub fn root(tag: &str) -> Self {
        Self {
            segments: vec![tag.to_string()],
        }
    }

    /// Path of a singular child section.
    #[must_use]
    pub fn child(&self, tag: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(tag.to_string());
        Self { segments }
    }

    /// Path of the `index`-th (zero-based) child with this tag.
    #[must_use]
    pub fn indexed(&self, tag: &str, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("{tag}[{index}]"));
        Self { segments }
    }

    /// The individual segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<document>");
        }
        f.write_str(&self.segments.join("/"))
    }
}
