//! Compiler options.

use serde::{Deserialize, Serialize};

/// Opt-in extensions to the compiler's default behavior.
///
/// Both switches are off by default, which keeps compilation equivalent to
/// the plain rule semantics.
///
/// # Example
///
/// ```
/// use sharding_config::CompileOptions;
///
/// let options: CompileOptions = toml::from_str("validate_binding_tables = true").unwrap();
/// assert!(options.validate_binding_tables);
/// assert!(!options.resolve_load_balance_refs);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct CompileOptions {
    /// Record `masterSlaveRule.loadBalanceAlgorithmRef` as a reference.
    ///
    /// When off the attribute is ignored. No default algorithm is substituted
    /// either way.
    #[serde(default)]
    pub resolve_load_balance_refs: bool,

    /// Require every binding group table to be a declared logic table.
    #[serde(default)]
    pub validate_binding_tables: bool,
}

impl CompileOptions {
    /// Options with every extension off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the load balance reference hook.
    #[must_use]
    pub fn resolve_load_balance_refs(mut self, enabled: bool) -> Self {
        self.resolve_load_balance_refs = enabled;
        self
    }

    /// Toggle binding table cross-validation.
    #[must_use]
    pub fn validate_binding_tables(mut self, enabled: bool) -> Self {
        self.validate_binding_tables = enabled;
        self
    }
}
