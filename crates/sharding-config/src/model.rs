//! Compiled configuration types.
//!
//! This module provides the root [`RootConfiguration`] and the fragment types
//! it is assembled from. All of them are immutable once built and can be
//! shared freely across threads.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::element::ElementPath;
use crate::error::{ConfigError, ConfigResult};
use crate::presence;
use crate::reference::{Declarations, NamedReference, ReferenceSite};
use crate::tags;

/// Compiled sharding rule configuration.
///
/// Produced by [`ConfigCompiler`](crate::ConfigCompiler); fields are exposed
/// read-only.
///
/// # Example
///
/// ```
/// use sharding_config::{RootConfiguration, TableRuleConfig};
///
/// # fn main() -> Result<(), sharding_config::ConfigError> {
/// let config = RootConfiguration::builder()
///     .default_data_source("ds_0")
///     .table_rule(TableRuleConfig::new("t_order"))
///     .build_validated()?;
///
/// assert_eq!(config.default_data_source(), Some("ds_0"));
/// assert_eq!(config.table_rules().len(), 1);
///
/// let duplicated = RootConfiguration::builder()
///     .table_rule(TableRuleConfig::new("t_order"))
///     .table_rule(TableRuleConfig::new("t_order"))
///     .build_validated();
/// assert!(duplicated.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RootConfiguration {
    default_data_source: Option<String>,
    default_database_strategy: Option<NamedReference>,
    default_table_strategy: Option<NamedReference>,
    table_rules: Vec<TableRuleConfig>,
    master_slave_rules: Vec<MasterSlaveRuleConfig>,
    binding_table_groups: Vec<BindingTableGroup>,
    broadcast_tables: IndexSet<BroadcastTableName>,
    default_key_generator: Option<NamedReference>,
}

impl RootConfiguration {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> RootConfigurationBuilder {
        RootConfigurationBuilder::new()
    }

    /// Data source used when no table rule matches.
    pub fn default_data_source(&self) -> Option<&str> {
        self.default_data_source.as_deref()
    }

    /// Database sharding strategy applied when a table rule names none.
    pub fn default_database_strategy(&self) -> Option<&NamedReference> {
        self.default_database_strategy.as_ref()
    }

    /// Table sharding strategy applied when a table rule names none.
    pub fn default_table_strategy(&self) -> Option<&NamedReference> {
        self.default_table_strategy.as_ref()
    }

    /// Table rules in document order.
    pub fn table_rules(&self) -> &[TableRuleConfig] {
        &self.table_rules
    }

    /// Table rule for a logic table, if declared.
    pub fn table_rule(&self, logic_table: &str) -> Option<&TableRuleConfig> {
        self.table_rules
            .iter()
            .find(|rule| rule.logic_table == logic_table)
    }

    /// Master-slave rules in document order.
    pub fn master_slave_rules(&self) -> &[MasterSlaveRuleConfig] {
        &self.master_slave_rules
    }

    /// Binding table groups in document order.
    pub fn binding_table_groups(&self) -> &[BindingTableGroup] {
        &self.binding_table_groups
    }

    /// Broadcast tables in first-declared order.
    pub fn broadcast_tables(&self) -> &IndexSet<BroadcastTableName> {
        &self.broadcast_tables
    }

    /// Key generator applied when a table rule names none.
    pub fn default_key_generator(&self) -> Option<&NamedReference> {
        self.default_key_generator.as_ref()
    }

    /// Every recorded reference with the field it sits in, in dump order.
    pub fn references(&self) -> Vec<ReferenceSite<'_>> {
        let mut candidates: Vec<(String, Option<&NamedReference>)> = vec![
            (
                "defaultDatabaseStrategyRef".to_string(),
                self.default_database_strategy.as_ref(),
            ),
            (
                "defaultTableStrategyRef".to_string(),
                self.default_table_strategy.as_ref(),
            ),
        ];
        for rule in &self.table_rules {
            let table = &rule.logic_table;
            candidates.extend([
                (
                    format!("tableRule[{table}].databaseStrategyRef"),
                    rule.database_strategy.as_ref(),
                ),
                (
                    format!("tableRule[{table}].tableStrategyRef"),
                    rule.table_strategy.as_ref(),
                ),
                (
                    format!("tableRule[{table}].keyGeneratorRef"),
                    rule.key_generator.as_ref(),
                ),
                (
                    format!("tableRule[{table}].encryptorRef"),
                    rule.encryptor.as_ref(),
                ),
            ]);
        }
        for rule in &self.master_slave_rules {
            candidates.push((
                format!("masterSlaveRule[{}].loadBalanceAlgorithmRef", rule.name),
                rule.load_balance_algorithm.as_ref(),
            ));
        }
        candidates.push((
            "defaultKeyGeneratorRef".to_string(),
            self.default_key_generator.as_ref(),
        ));

        candidates
            .into_iter()
            .filter_map(|(site, reference)| {
                reference.map(|reference| ReferenceSite { site, reference })
            })
            .collect()
    }

    /// Check the invariants every compiled configuration holds.
    ///
    /// Errors carry the document path the offending value corresponds to,
    /// e.g. `shardingRuleConfig/tableRules/tableRule[1]`.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredAttribute` for a blank logic table, rule id, master
    ///   data source, broadcast table or reference name
    /// - `DuplicateLogicTable` if two table rules share a logic table
    /// - `InvalidListFormat` for an empty or blank-entry slave list or
    ///   binding group
    pub fn validate(&self) -> ConfigResult<()> {
        let root = ElementPath::root(tags::SHARDING_RULE_CONFIG);
        check_reference(
            self.default_database_strategy.as_ref(),
            tags::DEFAULT_DATABASE_STRATEGY_REF,
            &root,
        )?;
        check_reference(
            self.default_table_strategy.as_ref(),
            tags::DEFAULT_TABLE_STRATEGY_REF,
            &root,
        )?;
        check_reference(
            self.default_key_generator.as_ref(),
            tags::DEFAULT_KEY_GENERATOR_REF,
            &root,
        )?;

        let section = root.child(tags::TABLE_RULES);
        let mut logic_tables = HashSet::new();
        for (index, rule) in self.table_rules.iter().enumerate() {
            let path = section.indexed(tags::TABLE_RULE, index);
            rule.validate(&path)?;
            if !logic_tables.insert(rule.logic_table.as_str()) {
                return Err(ConfigError::duplicate_logic_table(&rule.logic_table, &path));
            }
        }

        let section = root.child(tags::MASTER_SLAVE_RULES);
        for (index, rule) in self.master_slave_rules.iter().enumerate() {
            rule.validate(&section.indexed(tags::MASTER_SLAVE_RULE, index))?;
        }

        let section = root.child(tags::BINDING_TABLE_RULES);
        for (index, group) in self.binding_table_groups.iter().enumerate() {
            let path = section.indexed(tags::BINDING_TABLE_RULE, index);
            check_list(&group.tables, tags::LOGIC_TABLES, &path)?;
        }

        let section = root.child(tags::BROADCAST_TABLE_RULES);
        for (index, table) in self.broadcast_tables.iter().enumerate() {
            if is_blank(table.as_str()) {
                return Err(ConfigError::missing_attribute(
                    tags::TABLE,
                    &section.indexed(tags::BROADCAST_TABLE_RULE, index),
                ));
            }
        }
        Ok(())
    }

    /// Resolve every required reference against the consumer's declarations.
    ///
    /// The compiler never calls this; it is the consuming side's check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnresolvedReference` for the first required
    /// reference whose name is not declared.
    pub fn check_references<D>(&self, declarations: &D) -> ConfigResult<()>
    where
        D: Declarations + ?Sized,
    {
        for ReferenceSite { site, reference } in self.references() {
            if reference.is_required() && !declarations.is_declared(reference.name()) {
                return Err(ConfigError::unresolved_reference(reference.name(), site));
            }
        }
        Ok(())
    }
}

/// Builder for [`RootConfiguration`].
#[derive(Debug, Default)]
pub struct RootConfigurationBuilder {
    config: RootConfiguration,
}

impl RootConfigurationBuilder {
    /// Create a new builder with every field absent or empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default data source name. A blank name leaves it absent.
    #[must_use]
    pub fn default_data_source(mut self, name: impl Into<String>) -> Self {
        self.config.default_data_source = present(name);
        self
    }

    /// Set the default database sharding strategy.
    #[must_use]
    pub fn default_database_strategy(mut self, reference: NamedReference) -> Self {
        self.config.default_database_strategy = Some(reference);
        self
    }

    /// Set the default table sharding strategy.
    #[must_use]
    pub fn default_table_strategy(mut self, reference: NamedReference) -> Self {
        self.config.default_table_strategy = Some(reference);
        self
    }

    /// Append a table rule.
    #[must_use]
    pub fn table_rule(mut self, rule: TableRuleConfig) -> Self {
        self.config.table_rules.push(rule);
        self
    }

    /// Append a master-slave rule.
    #[must_use]
    pub fn master_slave_rule(mut self, rule: MasterSlaveRuleConfig) -> Self {
        self.config.master_slave_rules.push(rule);
        self
    }

    /// Append a binding table group.
    #[must_use]
    pub fn binding_table_group(mut self, group: BindingTableGroup) -> Self {
        self.config.binding_table_groups.push(group);
        self
    }

    /// Add a broadcast table. Repeats collapse onto the first declaration.
    #[must_use]
    pub fn broadcast_table(mut self, table: BroadcastTableName) -> Self {
        self.config.broadcast_tables.insert(table);
        self
    }

    /// Set the default key generator.
    #[must_use]
    pub fn default_key_generator(mut self, reference: NamedReference) -> Self {
        self.config.default_key_generator = Some(reference);
        self
    }

    /// Build the configuration without checking its invariants.
    #[must_use]
    pub fn build(self) -> RootConfiguration {
        self.config
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if [`RootConfiguration::validate`] fails.
    pub fn build_validated(self) -> ConfigResult<RootConfiguration> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

/// Per-logic-table routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRuleConfig {
    logic_table: String,
    actual_data_nodes: Option<String>,
    database_strategy: Option<NamedReference>,
    table_strategy: Option<NamedReference>,
    key_generator: Option<NamedReference>,
    encryptor: Option<NamedReference>,
    logic_index: Option<String>,
}

impl TableRuleConfig {
    /// Rule for a logic table with every override absent.
    pub fn new(logic_table: impl Into<String>) -> Self {
        Self {
            logic_table: logic_table.into(),
            actual_data_nodes: None,
            database_strategy: None,
            table_strategy: None,
            key_generator: None,
            encryptor: None,
            logic_index: None,
        }
    }

    /// Set the actual data nodes expression. A blank expression leaves it absent.
    #[must_use]
    pub fn with_actual_data_nodes(mut self, nodes: impl Into<String>) -> Self {
        self.actual_data_nodes = present(nodes);
        self
    }

    /// Set the database sharding strategy.
    #[must_use]
    pub fn with_database_strategy(mut self, reference: NamedReference) -> Self {
        self.database_strategy = Some(reference);
        self
    }

    /// Set the table sharding strategy.
    #[must_use]
    pub fn with_table_strategy(mut self, reference: NamedReference) -> Self {
        self.table_strategy = Some(reference);
        self
    }

    /// Set the key generator.
    #[must_use]
    pub fn with_key_generator(mut self, reference: NamedReference) -> Self {
        self.key_generator = Some(reference);
        self
    }

    /// Set the encryptor.
    #[must_use]
    pub fn with_encryptor(mut self, reference: NamedReference) -> Self {
        self.encryptor = Some(reference);
        self
    }

    /// Set the logic index name. A blank name leaves it absent.
    #[must_use]
    pub fn with_logic_index(mut self, index: impl Into<String>) -> Self {
        self.logic_index = present(index);
        self
    }

    fn validate(&self, path: &ElementPath) -> ConfigResult<()> {
        if is_blank(&self.logic_table) {
            return Err(ConfigError::missing_attribute(tags::LOGIC_TABLE, path));
        }
        check_reference(self.database_strategy.as_ref(), tags::DATABASE_STRATEGY_REF, path)?;
        check_reference(self.table_strategy.as_ref(), tags::TABLE_STRATEGY_REF, path)?;
        check_reference(self.key_generator.as_ref(), tags::KEY_GENERATOR_REF, path)?;
        check_reference(self.encryptor.as_ref(), tags::ENCRYPTOR_REF, path)
    }

    /// The logic table name.
    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    /// Raw actual data nodes expression, e.g. `ds_${0..1}.t_order_${0..1}`.
    pub fn actual_data_nodes(&self) -> Option<&str> {
        self.actual_data_nodes.as_deref()
    }

    /// Database sharding strategy override.
    pub fn database_strategy(&self) -> Option<&NamedReference> {
        self.database_strategy.as_ref()
    }

    /// Table sharding strategy override.
    pub fn table_strategy(&self) -> Option<&NamedReference> {
        self.table_strategy.as_ref()
    }

    /// Key generator override.
    pub fn key_generator(&self) -> Option<&NamedReference> {
        self.key_generator.as_ref()
    }

    /// Column encryptor.
    pub fn encryptor(&self) -> Option<&NamedReference> {
        self.encryptor.as_ref()
    }

    /// Logic index name.
    pub fn logic_index(&self) -> Option<&str> {
        self.logic_index.as_deref()
    }
}

/// Read/write splitting group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterSlaveRuleConfig {
    name: String,
    master_data_source: String,
    slave_data_sources: Vec<String>,
    load_balance_algorithm: Option<NamedReference>,
}

impl MasterSlaveRuleConfig {
    /// Create a rule.
    ///
    /// [`RootConfiguration::validate`] rejects a rule with no slaves.
    pub fn new(
        name: impl Into<String>,
        master_data_source: impl Into<String>,
        slave_data_sources: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            master_data_source: master_data_source.into(),
            slave_data_sources,
            load_balance_algorithm: None,
        }
    }

    /// Set the load balance algorithm.
    #[must_use]
    pub fn with_load_balance_algorithm(mut self, reference: NamedReference) -> Self {
        self.load_balance_algorithm = Some(reference);
        self
    }

    fn validate(&self, path: &ElementPath) -> ConfigResult<()> {
        if is_blank(&self.name) {
            return Err(ConfigError::missing_attribute(tags::ID, path));
        }
        if is_blank(&self.master_data_source) {
            return Err(ConfigError::missing_attribute(tags::MASTER_DATA_SOURCE_NAME, path));
        }
        check_list(&self.slave_data_sources, tags::SLAVE_DATA_SOURCE_NAMES, path)?;
        check_reference(
            self.load_balance_algorithm.as_ref(),
            tags::LOAD_BALANCE_ALGORITHM_REF,
            path,
        )
    }

    /// Rule identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write master data source.
    pub fn master_data_source(&self) -> &str {
        &self.master_data_source
    }

    /// Read replicas in declared order.
    pub fn slave_data_sources(&self) -> &[String] {
        &self.slave_data_sources
    }

    /// Load balance algorithm, absent unless the hook recorded one.
    pub fn load_balance_algorithm(&self) -> Option<&NamedReference> {
        self.load_balance_algorithm.as_ref()
    }
}

/// Logic tables whose shard selection must stay aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BindingTableGroup {
    tables: Vec<String>,
}

impl BindingTableGroup {
    /// Create a group from its logic tables, in order.
    pub fn new(tables: Vec<String>) -> Self {
        Self { tables }
    }

    /// Logic tables in declared order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Whether the group lists this logic table.
    pub fn contains(&self, logic_table: &str) -> bool {
        self.tables.iter().any(|t| t == logic_table)
    }
}

/// Logic table replicated to every shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BroadcastTableName(String);

impl BroadcastTableName {
    /// Wrap a table name.
    pub fn new(table: impl Into<String>) -> Self {
        Self(table.into())
    }

    /// The table name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rule configuration bound to the data source it wraps, plus free-form props.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfiguration {
    data_source: NamedReference,
    rule: RootConfiguration,
    props: IndexMap<String, String>,
}

impl DataSourceConfiguration {
    /// Bind a rule configuration to a data source.
    pub fn new(
        data_source: NamedReference,
        rule: RootConfiguration,
        props: IndexMap<String, String>,
    ) -> Self {
        Self {
            data_source,
            rule,
            props,
        }
    }

    /// Backing data source.
    pub fn data_source(&self) -> &NamedReference {
        &self.data_source
    }

    /// The compiled rule configuration.
    pub fn rule(&self) -> &RootConfiguration {
        &self.rule
    }

    /// Properties in document order.
    pub fn props(&self) -> &IndexMap<String, String> {
        &self.props
    }

    /// Property value by key.
    pub fn prop(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }
}

fn present(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    presence::normalize(&value).map(str::to_string)
}

fn is_blank(value: &str) -> bool {
    presence::normalize(value).is_none()
}

fn check_reference(
    reference: Option<&NamedReference>,
    attribute: &str,
    path: &ElementPath,
) -> ConfigResult<()> {
    match reference {
        Some(reference) if is_blank(reference.name()) => {
            Err(ConfigError::missing_attribute(attribute, path))
        }
        _ => Ok(()),
    }
}

fn check_list(tokens: &[String], attribute: &str, path: &ElementPath) -> ConfigResult<()> {
    if tokens.is_empty() || tokens.iter().any(|token| is_blank(token)) {
        return Err(ConfigError::invalid_list(attribute, path, tokens.join(",")));
    }
    Ok(())
}
