//! Configuration compiler.
//!
//! Walks a `shardingRuleConfig` element in a fixed order:
//!
//! 1. `tableRules` (required section, may be empty)
//! 2. `masterSlaveRules` (optional)
//! 3. `bindingTableRules` (optional)
//! 4. `broadcastTableRules` (optional)
//! 5. root-level defaults
//!
//! Any failure aborts the whole pass; a partial configuration is never
//! returned.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info, info_span, warn};

use crate::builders;
use crate::element::{Element, ElementPath};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{DataSourceConfiguration, RootConfiguration, RootConfigurationBuilder};
use crate::options::CompileOptions;
use crate::presence;
use crate::reference::{resolve_reference, NamedReference};
use crate::tags;

/// Compiles element trees into [`RootConfiguration`] values.
///
/// # Example
///
/// ```
/// use sharding_config::{ConfigCompiler, Element};
///
/// let root = Element::new("shardingRuleConfig").with_child(
///     Element::new("tableRules").with_child(
///         Element::new("tableRule")
///             .with_attribute("logicTable", "t_order")
///             .with_attribute("actualDataNodes", "ds_${0..1}.t_order_${0..1}"),
///     ),
/// );
///
/// let config = ConfigCompiler::new().compile(&root).unwrap();
/// assert_eq!(config.table_rules()[0].logic_table(), "t_order");
/// assert!(config.master_slave_rules().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigCompiler {
    options: CompileOptions,
}

impl ConfigCompiler {
    /// Compiler with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler with explicit options.
    #[must_use]
    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    /// The options in effect.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a `shardingRuleConfig` element.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredElement` if `root` is not a `shardingRuleConfig`
    ///   element or has no `tableRules` section
    /// - `MissingRequiredAttribute` / `InvalidListFormat` from the fragment builders
    /// - `DuplicateLogicTable` if two table rules share a logic table
    /// - `UnresolvedReference` if binding validation is enabled and a group
    ///   names an undeclared logic table
    pub fn compile(&self, root: &Element) -> ConfigResult<RootConfiguration> {
        let _span = info_span!("compile", root = root.tag()).entered();

        if root.tag() != tags::SHARDING_RULE_CONFIG {
            return Err(ConfigError::missing_element(
                tags::SHARDING_RULE_CONFIG,
                &ElementPath::root(root.tag()),
            ));
        }
        self.compile_at(root, &ElementPath::root(root.tag()))
    }

    /// Compile an `encryptDataSource` wrapper.
    ///
    /// The wrapper pairs a `shardingRuleConfig` child with the data source
    /// named by its `encryptRuleConfig` child and an optional `props` section
    /// of `prop` elements (`key`, `value`).
    ///
    /// # Errors
    ///
    /// Everything [`compile`](Self::compile) returns, plus
    /// `MissingRequiredElement` if `element` is not an `encryptDataSource`
    /// element or lacks its `shardingRuleConfig` or `encryptRuleConfig` child and `MissingRequiredAttribute` for a blank
    /// `dataSourceName` or prop `key`.
    pub fn compile_data_source(&self, element: &Element) -> ConfigResult<DataSourceConfiguration> {
        let _span = info_span!("compile_data_source", root = element.tag()).entered();
        let path = ElementPath::root(element.tag());

        if element.tag() != tags::ENCRYPT_DATA_SOURCE {
            return Err(ConfigError::missing_element(tags::ENCRYPT_DATA_SOURCE, &path));
        }

        let rule_element = element
            .child(tags::SHARDING_RULE_CONFIG)
            .ok_or_else(|| ConfigError::missing_element(tags::SHARDING_RULE_CONFIG, &path))?;
        let rule = self.compile_at(rule_element, &path.child(tags::SHARDING_RULE_CONFIG))?;

        let encrypt_element = element
            .child(tags::ENCRYPT_RULE_CONFIG)
            .ok_or_else(|| ConfigError::missing_element(tags::ENCRYPT_RULE_CONFIG, &path))?;
        let encrypt_path = path.child(tags::ENCRYPT_RULE_CONFIG);
        let data_source = presence::require(encrypt_element, tags::DATA_SOURCE_NAME, &encrypt_path)
            .map(NamedReference::new)?;

        let props = compile_props(element, &path)?;
        debug!(data_source = data_source.name(), props = props.len(), "compiled data source");

        Ok(DataSourceConfiguration::new(data_source, rule, props))
    }

    fn compile_at(&self, root: &Element, path: &ElementPath) -> ConfigResult<RootConfiguration> {
        let mut builder = RootConfiguration::builder();

        // Declared logic tables, for duplicate detection and binding validation.
        let mut logic_tables = HashSet::new();
        builder = compile_table_rules(root, path, builder, &mut logic_tables)?;
        builder = self.compile_master_slave_rules(root, path, builder)?;
        builder = self.compile_binding_tables(root, path, builder, &logic_tables)?;
        builder = compile_broadcast_tables(root, path, builder)?;
        builder = compile_defaults(root, builder);

        let config = builder.build_validated()?;
        info!(
            table_rules = config.table_rules().len(),
            master_slave_rules = config.master_slave_rules().len(),
            binding_table_groups = config.binding_table_groups().len(),
            broadcast_tables = config.broadcast_tables().len(),
            "compiled sharding rule configuration"
        );
        Ok(config)
    }

    fn compile_master_slave_rules(
        &self,
        root: &Element,
        path: &ElementPath,
        mut builder: RootConfigurationBuilder,
    ) -> ConfigResult<RootConfigurationBuilder> {
        let Some(section) = root.child(tags::MASTER_SLAVE_RULES) else {
            return Ok(builder);
        };
        let section_path = path.child(tags::MASTER_SLAVE_RULES);

        for (index, element) in section_children(section, &section_path, tags::MASTER_SLAVE_RULE) {
            let rule_path = section_path.indexed(tags::MASTER_SLAVE_RULE, index);
            let rule = builders::build_master_slave_rule(element, &rule_path, &self.options)?;
            builder = builder.master_slave_rule(rule);
        }
        Ok(builder)
    }

    fn compile_binding_tables(
        &self,
        root: &Element,
        path: &ElementPath,
        mut builder: RootConfigurationBuilder,
        logic_tables: &HashSet<String>,
    ) -> ConfigResult<RootConfigurationBuilder> {
        let Some(section) = root.child(tags::BINDING_TABLE_RULES) else {
            return Ok(builder);
        };
        let section_path = path.child(tags::BINDING_TABLE_RULES);

        for (index, element) in section_children(section, &section_path, tags::BINDING_TABLE_RULE) {
            let rule_path = section_path.indexed(tags::BINDING_TABLE_RULE, index);
            let group = builders::build_binding_table_group(element, &rule_path)?;
            if self.options.validate_binding_tables {
                if let Some(unknown) = group.tables().iter().find(|t| !logic_tables.contains(*t)) {
                    return Err(ConfigError::unresolved_reference_at(unknown.as_str(), &rule_path));
                }
            }
            builder = builder.binding_table_group(group);
        }
        Ok(builder)
    }
}

/// Compile a `shardingRuleConfig` element with default options.
pub fn compile(root: &Element) -> ConfigResult<RootConfiguration> {
    ConfigCompiler::new().compile(root)
}

fn compile_table_rules(
    root: &Element,
    path: &ElementPath,
    mut builder: RootConfigurationBuilder,
    logic_tables: &mut HashSet<String>,
) -> ConfigResult<RootConfigurationBuilder> {
    let section = root
        .child(tags::TABLE_RULES)
        .ok_or_else(|| ConfigError::missing_element(tags::TABLE_RULES, path))?;
    let section_path = path.child(tags::TABLE_RULES);

    for (index, element) in section_children(section, &section_path, tags::TABLE_RULE) {
        let rule_path = section_path.indexed(tags::TABLE_RULE, index);
        let rule = builders::build_table_rule(element, &rule_path)?;
        if !logic_tables.insert(rule.logic_table().to_string()) {
            return Err(ConfigError::duplicate_logic_table(
                rule.logic_table(),
                &rule_path,
            ));
        }
        builder = builder.table_rule(rule);
    }
    Ok(builder)
}

fn compile_broadcast_tables(
    root: &Element,
    path: &ElementPath,
    mut builder: RootConfigurationBuilder,
) -> ConfigResult<RootConfigurationBuilder> {
    let Some(section) = root.child(tags::BROADCAST_TABLE_RULES) else {
        return Ok(builder);
    };
    let section_path = path.child(tags::BROADCAST_TABLE_RULES);

    for (index, element) in section_children(section, &section_path, tags::BROADCAST_TABLE_RULE) {
        let rule_path = section_path.indexed(tags::BROADCAST_TABLE_RULE, index);
        builder = builder.broadcast_table(builders::build_broadcast_table(element, &rule_path)?);
    }
    Ok(builder)
}

fn compile_defaults(root: &Element, mut builder: RootConfigurationBuilder) -> RootConfigurationBuilder {
    if let Some(name) = presence::resolve(root, tags::DEFAULT_DATA_SOURCE) {
        builder = builder.default_data_source(name);
    }
    if let Some(reference) = resolve_reference(root, tags::DEFAULT_DATABASE_STRATEGY_REF) {
        builder = builder.default_database_strategy(reference);
    }
    if let Some(reference) = resolve_reference(root, tags::DEFAULT_TABLE_STRATEGY_REF) {
        builder = builder.default_table_strategy(reference);
    }
    if let Some(reference) = resolve_reference(root, tags::DEFAULT_KEY_GENERATOR_REF) {
        builder = builder.default_key_generator(reference);
    }
    builder
}

fn compile_props(element: &Element, path: &ElementPath) -> ConfigResult<IndexMap<String, String>> {
    let mut props = IndexMap::new();
    let Some(section) = element.child(tags::PROPS) else {
        return Ok(props);
    };
    let section_path = path.child(tags::PROPS);

    for (index, prop) in section_children(section, &section_path, tags::PROP) {
        let prop_path = section_path.indexed(tags::PROP, index);
        let key = presence::require(prop, tags::KEY, &prop_path)?;
        let value = prop.attribute(tags::VALUE).map(str::trim).unwrap_or_default();
        props.insert(key.to_string(), value.to_string());
    }
    Ok(props)
}

/// Children of `section` tagged `tag`, numbered among themselves.
///
/// Other tags are skipped with a warning.
fn section_children<'a>(
    section: &'a Element,
    section_path: &ElementPath,
    tag: &'a str,
) -> impl Iterator<Item = (usize, &'a Element)> + 'a {
    for other in section.children().iter().filter(|c| c.tag() != tag) {
        warn!(
            path = %section_path,
            tag = other.tag(),
            expected = tag,
            "ignoring unexpected element"
        );
    }
    section.children_named(tag).enumerate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigErrorKind;

    fn table_rule(logic_table: &str) -> Element {
        Element::new("tableRule").with_attribute("logicTable", logic_table)
    }

    fn root_with_tables(tables: &[&str]) -> Element {
        Element::new("shardingRuleConfig").with_child(
            Element::new("tableRules").with_children(tables.iter().map(|t| table_rule(t))),
        )
    }

    #[test]
    fn test_empty_table_rules_section() {
        let config = compile(&root_with_tables(&[])).unwrap();
        assert!(config.table_rules().is_empty());
    }

    #[test]
    fn test_missing_table_rules_section() {
        let err = compile(&Element::new("shardingRuleConfig")).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredElement);
        assert!(err.to_string().contains("tableRules"));
    }

    #[test]
    fn test_wrong_root_tag() {
        let err = compile(&Element::new("beans")).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredElement);
        assert!(err.to_string().contains("shardingRuleConfig"));
    }

    #[test]
    fn test_duplicate_logic_table_reports_second_path() {
        let err = compile(&root_with_tables(&["orders", "users", "orders"])).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::DuplicateLogicTable);
        assert_eq!(
            err.path().unwrap().to_string(),
            "shardingRuleConfig/tableRules/tableRule[2]"
        );
    }

    #[test]
    fn test_table_rules_keep_document_order() {
        let config = compile(&root_with_tables(&["t_b", "t_a", "t_c"])).unwrap();
        let names: Vec<_> = config.table_rules().iter().map(|r| r.logic_table()).collect();
        assert_eq!(names, vec!["t_b", "t_a", "t_c"]);
    }

    #[test]
    fn test_unexpected_children_are_skipped() {
        let root = Element::new("shardingRuleConfig").with_child(
            Element::new("tableRules")
                .with_child(table_rule("t_order"))
                .with_child(Element::new("description"))
                .with_child(table_rule("t_order_item")),
        );
        let config = compile(&root).unwrap();
        assert_eq!(config.table_rules().len(), 2);
    }

    #[test]
    fn test_error_path_counts_same_tag_siblings_only() {
        let root = Element::new("shardingRuleConfig").with_child(
            Element::new("tableRules")
                .with_child(Element::new("description"))
                .with_child(table_rule("t_order"))
                .with_child(Element::new("tableRule")),
        );
        let err = compile(&root).unwrap_err();
        assert_eq!(
            err.path().unwrap().to_string(),
            "shardingRuleConfig/tableRules/tableRule[1]"
        );
    }

    #[test]
    fn test_defaults_from_root_attributes() {
        let root = root_with_tables(&[])
            .with_attribute("defaultDataSource", "ds_0")
            .with_attribute("defaultDatabaseStrategyRef", "dbStrategy")
            .with_attribute("defaultTableStrategyRef", "")
            .with_attribute("defaultKeyGeneratorRef", "keyGen");
        let config = compile(&root).unwrap();
        assert_eq!(config.default_data_source(), Some("ds_0"));
        assert_eq!(config.default_database_strategy().unwrap().name(), "dbStrategy");
        assert!(config.default_table_strategy().is_none());
        assert_eq!(config.default_key_generator().unwrap().name(), "keyGen");
    }

    #[test]
    fn test_failure_in_later_section_aborts() {
        let root = root_with_tables(&["t_order"]).with_child(
            Element::new("masterSlaveRules").with_child(
                Element::new("masterSlaveRule")
                    .with_attribute("id", "ms")
                    .with_attribute("masterDataSourceName", "master")
                    .with_attribute("slaveDataSourceNames", " , "),
            ),
        );
        let err = compile(&root).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::InvalidListFormat);
        assert_eq!(
            err.path().unwrap().to_string(),
            "shardingRuleConfig/masterSlaveRules/masterSlaveRule[0]"
        );
    }

    #[test]
    fn test_binding_validation_is_opt_in() {
        let root = root_with_tables(&["t_order"]).with_child(
            Element::new("bindingTableRules").with_child(
                Element::new("bindingTableRule").with_attribute("logicTables", "t_order,t_item"),
            ),
        );

        assert!(compile(&root).is_ok());

        let compiler = ConfigCompiler::with_options(CompileOptions::new().validate_binding_tables(true));
        let err = compiler.compile(&root).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::UnresolvedReference);
        assert!(err.to_string().contains("t_item"));
        assert_eq!(
            err.path().unwrap().to_string(),
            "shardingRuleConfig/bindingTableRules/bindingTableRule[0]"
        );
    }

    #[test]
    fn test_binding_validation_accepts_declared_tables() {
        let root = root_with_tables(&["t_order", "t_item"]).with_child(
            Element::new("bindingTableRules").with_child(
                Element::new("bindingTableRule").with_attribute("logicTables", "t_order, t_item"),
            ),
        );
        let compiler = ConfigCompiler::with_options(CompileOptions::new().validate_binding_tables(true));
        assert_eq!(compiler.compile(&root).unwrap().binding_table_groups().len(), 1);
    }

    #[test]
    fn test_blank_binding_logic_tables() {
        let root = root_with_tables(&[]).with_child(
            Element::new("bindingTableRules")
                .with_child(Element::new("bindingTableRule").with_attribute("logicTables", " , ")),
        );
        let err = compile(&root).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::InvalidListFormat);
        assert_eq!(
            err.path().unwrap().to_string(),
            "shardingRuleConfig/bindingTableRules/bindingTableRule[0]"
        );
    }

    #[test]
    fn test_missing_binding_logic_tables() {
        let root = root_with_tables(&[]).with_child(
            Element::new("bindingTableRules").with_child(Element::new("bindingTableRule")),
        );
        let err = compile(&root).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredAttribute);
        assert!(err.to_string().contains("logicTables"));
    }

    #[test]
    fn test_missing_or_blank_master_data_source() {
        let rule = |master: Option<&str>| {
            let mut element = Element::new("masterSlaveRule")
                .with_attribute("id", "ms")
                .with_attribute("slaveDataSourceNames", "slave_0");
            if let Some(master) = master {
                element = element.with_attribute("masterDataSourceName", master);
            }
            root_with_tables(&[]).with_child(Element::new("masterSlaveRules").with_child(element))
        };

        for root in [rule(None), rule(Some("  "))] {
            let err = compile(&root).unwrap_err();
            assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredAttribute);
            assert!(err.to_string().contains("masterDataSourceName"));
            assert_eq!(
                err.path().unwrap().to_string(),
                "shardingRuleConfig/masterSlaveRules/masterSlaveRule[0]"
            );
        }
    }

    #[test]
    fn test_duplicate_logic_table_after_trimming() {
        let err = compile(&root_with_tables(&["orders", " orders "])).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::DuplicateLogicTable);
        assert!(err.to_string().contains("'orders'"));
        assert!(err.to_string().contains("logicTable"));
    }

    #[test]
    fn test_duplicate_broadcast_tables_collapse() {
        let broadcast = |table: &str| Element::new("broadcastTableRule").with_attribute("table", table);
        let root = root_with_tables(&[]).with_child(
            Element::new("broadcastTableRules")
                .with_child(broadcast("t_config"))
                .with_child(broadcast("t_dict"))
                .with_child(broadcast(" t_config ")),
        );
        let config = compile(&root).unwrap();
        let names: Vec<_> = config.broadcast_tables().iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["t_config", "t_dict"]);
    }

    #[test]
    fn test_data_source_wrapper_tag_is_checked() {
        let wrapper = Element::new("dataSource")
            .with_child(root_with_tables(&[]))
            .with_child(Element::new("encryptRuleConfig").with_attribute("dataSourceName", "ds"));
        let err = ConfigCompiler::new().compile_data_source(&wrapper).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredElement);
        assert!(err.to_string().contains("encryptDataSource"));
    }

    #[test]
    fn test_data_source_wrapper() {
        let wrapper = Element::new("encryptDataSource")
            .with_child(root_with_tables(&["t_user"]))
            .with_child(Element::new("encryptRuleConfig").with_attribute("dataSourceName", "ds"))
            .with_child(
                Element::new("props")
                    .with_child(
                        Element::new("prop")
                            .with_attribute("key", "sql.show")
                            .with_attribute("value", "true"),
                    )
                    .with_child(Element::new("prop").with_attribute("key", "query.with.cipher.column")),
            );

        let config = ConfigCompiler::new().compile_data_source(&wrapper).unwrap();
        assert_eq!(config.data_source(), &NamedReference::new("ds"));
        assert_eq!(config.rule().table_rules()[0].logic_table(), "t_user");
        assert_eq!(config.prop("sql.show"), Some("true"));
        assert_eq!(config.prop("query.with.cipher.column"), Some(""));
    }

    #[test]
    fn test_data_source_wrapper_requires_encrypt_rule() {
        let wrapper = Element::new("encryptDataSource").with_child(root_with_tables(&[]));
        let err = ConfigCompiler::new().compile_data_source(&wrapper).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredElement);
        assert!(err.to_string().contains("encryptRuleConfig"));
    }

    #[test]
    fn test_data_source_wrapper_blank_prop_key() {
        let wrapper = Element::new("encryptDataSource")
            .with_child(root_with_tables(&[]))
            .with_child(Element::new("encryptRuleConfig").with_attribute("dataSourceName", "ds"))
            .with_child(Element::new("props").with_child(Element::new("prop").with_attribute("key", "")));
        let err = ConfigCompiler::new().compile_data_source(&wrapper).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredAttribute);
        assert_eq!(
            err.path().unwrap().to_string(),
            "encryptDataSource/props/prop[0]"
        );
    }
}
