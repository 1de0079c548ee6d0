//! Loading serialized element trees.
//!
//! This module provides the [`DocumentLoader`] for reading an [`Element`]
//! tree stored as JSON or TOML and handing it to the [`ConfigCompiler`].

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::compiler::ConfigCompiler;
use crate::element::Element;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{DataSourceConfiguration, RootConfiguration};
use crate::options::CompileOptions;

/// Serialization format of a stored element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON document.
    Json,
    /// TOML document; children are written as `[[children]]` tables.
    Toml,
}

impl DocumentFormat {
    /// Format implied by a file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for DocumentFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Reads stored element trees and compiles them.
///
/// # Example
///
/// ```
/// use sharding_config::{DocumentFormat, DocumentLoader};
///
/// let json = r#"{
///     "tag": "shardingRuleConfig",
///     "children": [
///         { "tag": "tableRules", "children": [
///             { "tag": "tableRule", "attributes": { "logicTable": "t_order" } }
///         ] }
///     ]
/// }"#;
///
/// let config = DocumentLoader::new()
///     .compile_str(json, DocumentFormat::Json)
///     .unwrap();
///
/// assert_eq!(config.table_rules()[0].logic_table(), "t_order");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    compiler: ConfigCompiler,
}

impl DocumentLoader {
    /// Loader with default compile options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these compile options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.compiler = ConfigCompiler::with_options(options);
        self
    }

    /// Read an element tree from a file.
    ///
    /// The format is determined by the file extension (`.json` or `.toml`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The extension is not a supported format
    /// - The content is not a valid element tree
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Element> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        debug!(path = %path.display(), ?format, bytes = content.len(), "read document");

        Self::read_str(&content, format)
    }

    /// Read an element tree from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    pub fn read_str(content: &str, format: DocumentFormat) -> ConfigResult<Element> {
        let element = match format {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Toml => toml::from_str(content)?,
        };
        Ok(element)
    }

    /// Read and compile a `shardingRuleConfig` document from a file.
    pub fn compile_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<RootConfiguration> {
        let root = self.read_file(path)?;
        self.compiler.compile(&root)
    }

    /// Read and compile a `shardingRuleConfig` document from a string.
    pub fn compile_str(
        &self,
        content: &str,
        format: DocumentFormat,
    ) -> ConfigResult<RootConfiguration> {
        let root = Self::read_str(content, format)?;
        self.compiler.compile(&root)
    }

    /// Read and compile an `encryptDataSource` document from a file.
    pub fn compile_data_source_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> ConfigResult<DataSourceConfiguration> {
        let root = self.read_file(path)?;
        self.compiler.compile_data_source(&root)
    }
}
