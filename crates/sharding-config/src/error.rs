//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::element::ElementPath;
use crate::tags;

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or compiling a rule document.
///
/// Compilation errors carry the [`ElementPath`] of the element that failed so
/// the caller can report a precise location.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A mandatory section is absent.
    #[error("missing required element <{element}> under {path}")]
    MissingRequiredElement {
        /// Tag name of the missing element.
        element: String,
        /// Path of the element that should have contained it.
        path: ElementPath,
    },

    /// A mandatory attribute is absent or blank.
    #[error("missing required attribute '{attribute}' on {path}")]
    MissingRequiredAttribute {
        /// The attribute name.
        attribute: String,
        /// Path of the element carrying the attribute.
        path: ElementPath,
    },

    /// Two table rules declare the same logic table.
    #[error("duplicate logic table '{logic_table}' in attribute '{attribute}' on {path}")]
    DuplicateLogicTable {
        /// The repeated logic table name.
        logic_table: String,
        /// The attribute declaring it.
        attribute: String,
        /// Path of the second declaration.
        path: ElementPath,
    },

    /// A required comma-list attribute yields no usable tokens.
    #[error("attribute '{attribute}' on {path} must list at least one value, got {raw:?}")]
    InvalidListFormat {
        /// The attribute name.
        attribute: String,
        /// Path of the element carrying the attribute.
        path: ElementPath,
        /// The raw attribute value.
        raw: String,
    },

    /// A recorded reference has no matching declaration.
    #[error("unresolved reference '{name}' from {site}")]
    UnresolvedReference {
        /// The referenced name.
        name: String,
        /// Where the reference was recorded.
        site: String,
        /// Element path of the referring element, when raised during compilation.
        path: Option<ElementPath>,
    },

    /// Document file not found.
    #[error("document file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read document file.
    #[error("failed to read document file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document format is not one the loader understands.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// TOML parsing error.
    #[error("failed to parse TOML document: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON document: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Discriminant of a [`ConfigError`], for matching on the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    /// See [`ConfigError::MissingRequiredElement`].
    MissingRequiredElement,
    /// See [`ConfigError::MissingRequiredAttribute`].
    MissingRequiredAttribute,
    /// See [`ConfigError::DuplicateLogicTable`].
    DuplicateLogicTable,
    /// See [`ConfigError::InvalidListFormat`].
    InvalidListFormat,
    /// See [`ConfigError::UnresolvedReference`].
    UnresolvedReference,
    /// Loading failed before compilation started.
    Load,
}

impl ConfigError {
    /// Create a new missing element error.
    pub fn missing_element(element: impl Into<String>, path: &ElementPath) -> Self {
        Self::MissingRequiredElement {
            element: element.into(),
            path: path.clone(),
        }
    }

    /// Create a new missing attribute error.
    pub fn missing_attribute(attribute: impl Into<String>, path: &ElementPath) -> Self {
        Self::MissingRequiredAttribute {
            attribute: attribute.into(),
            path: path.clone(),
        }
    }

    /// Create a new duplicate logic table error.
    pub fn duplicate_logic_table(logic_table: impl Into<String>, path: &ElementPath) -> Self {
        Self::DuplicateLogicTable {
            logic_table: logic_table.into(),
            attribute: tags::LOGIC_TABLE.to_string(),
            path: path.clone(),
        }
    }

    /// Create a new invalid list error.
    pub fn invalid_list(
        attribute: impl Into<String>,
        path: &ElementPath,
        raw: impl Into<String>,
    ) -> Self {
        Self::InvalidListFormat {
            attribute: attribute.into(),
            path: path.clone(),
            raw: raw.into(),
        }
    }

    /// Create a new unresolved reference error for a consumer-side site.
    pub fn unresolved_reference(name: impl Into<String>, site: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            name: name.into(),
            site: site.into(),
            path: None,
        }
    }

    /// Create a new unresolved reference error raised on a document element.
    pub fn unresolved_reference_at(name: impl Into<String>, path: &ElementPath) -> Self {
        Self::UnresolvedReference {
            name: name.into(),
            site: path.to_string(),
            path: Some(path.clone()),
        }
    }

    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// The taxonomy bucket this error falls in.
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            Self::MissingRequiredElement { .. } => ConfigErrorKind::MissingRequiredElement,
            Self::MissingRequiredAttribute { .. } => ConfigErrorKind::MissingRequiredAttribute,
            Self::DuplicateLogicTable { .. } => ConfigErrorKind::DuplicateLogicTable,
            Self::InvalidListFormat { .. } => ConfigErrorKind::InvalidListFormat,
            Self::UnresolvedReference { .. } => ConfigErrorKind::UnresolvedReference,
            Self::FileNotFound { .. }
            | Self::ReadError { .. }
            | Self::UnsupportedFormat(_)
            | Self::TomlError(_)
            | Self::JsonError(_) => ConfigErrorKind::Load,
        }
    }

    /// Path of the element the error was raised on, for compilation errors.
    pub fn path(&self) -> Option<&ElementPath> {
        match self {
            Self::MissingRequiredElement { path, .. }
            | Self::MissingRequiredAttribute { path, .. }
            | Self::DuplicateLogicTable { path, .. }
            | Self::InvalidListFormat { path, .. } => Some(path),
            Self::UnresolvedReference { path, .. } => path.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_rule_path() -> ElementPath {
        ElementPath::root("shardingRuleConfig")
            .child("tableRules")
            .indexed("tableRule", 1)
    }

    #[test]
    fn test_missing_element_error() {
        let err = ConfigError::missing_element("tableRules", &ElementPath::root("shardingRuleConfig"));
        assert_eq!(
            err.to_string(),
            "missing required element <tableRules> under shardingRuleConfig"
        );
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredElement);
    }

    #[test]
    fn test_missing_attribute_error() {
        let err = ConfigError::missing_attribute("logicTable", &table_rule_path());
        assert!(err.to_string().contains("logicTable"));
        assert!(err
            .to_string()
            .contains("shardingRuleConfig/tableRules/tableRule[1]"));
    }

    #[test]
    fn test_duplicate_logic_table_error() {
        let err = ConfigError::duplicate_logic_table("orders", &table_rule_path());
        assert_eq!(
            err.to_string(),
            "duplicate logic table 'orders' in attribute 'logicTable' on \
             shardingRuleConfig/tableRules/tableRule[1]"
        );
        assert_eq!(err.kind(), ConfigErrorKind::DuplicateLogicTable);
    }

    #[test]
    fn test_invalid_list_error() {
        let err = ConfigError::invalid_list("slaveDataSourceNames", &table_rule_path(), " , ");
        assert!(err.to_string().contains("slaveDataSourceNames"));
        assert!(err.to_string().contains("\" , \""));
    }

    #[test]
    fn test_unresolved_reference_error() {
        let err = ConfigError::unresolved_reference("dbStrategy", "defaultDatabaseStrategyRef");
        assert!(err.to_string().contains("dbStrategy"));
        assert!(err.path().is_none());
    }

    #[test]
    fn test_unresolved_reference_at_element() {
        let path = ElementPath::root("shardingRuleConfig")
            .child("bindingTableRules")
            .indexed("bindingTableRule", 0);
        let err = ConfigError::unresolved_reference_at("t_x", &path);
        assert_eq!(err.path(), Some(&path));
        assert!(err
            .to_string()
            .contains("shardingRuleConfig/bindingTableRules/bindingTableRule[0]"));
    }

    #[test]
    fn test_path_accessor() {
        let err = ConfigError::missing_attribute("id", &table_rule_path());
        assert_eq!(err.path(), Some(&table_rule_path()));
    }

    #[test]
    fn test_file_not_found_error() {
        let err = ConfigError::file_not_found("/path/to/rules.json");
        assert!(err.to_string().contains("/path/to/rules.json"));
        assert_eq!(err.kind(), ConfigErrorKind::Load);
    }
}
