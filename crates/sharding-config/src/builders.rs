//! One builder per rule fragment kind.
//!
//! Each builder turns a single element into a fragment value. Builders are
//! pure: they read the element, never the rest of the document.

use tracing::debug;

use crate::element::{Element, ElementPath};
use crate::error::ConfigResult;
use crate::list;
use crate::model::{BindingTableGroup, BroadcastTableName, MasterSlaveRuleConfig, TableRuleConfig};
use crate::options::CompileOptions;
use crate::presence;
use crate::reference::{resolve_reference, NamedReference};
use crate::tags;

/// Build a table rule from a `tableRule` element.
///
/// `logicTable` is required; every other attribute is independently optional.
pub fn build_table_rule(element: &Element, path: &ElementPath) -> ConfigResult<TableRuleConfig> {
    let logic_table = presence::require(element, tags::LOGIC_TABLE, path)?;
    let mut rule = TableRuleConfig::new(logic_table);

    if let Some(nodes) = presence::resolve(element, tags::ACTUAL_DATA_NODES) {
        rule = rule.with_actual_data_nodes(nodes);
    }
    if let Some(reference) = resolve_reference(element, tags::DATABASE_STRATEGY_REF) {
        rule = rule.with_database_strategy(reference);
    }
    if let Some(reference) = resolve_reference(element, tags::TABLE_STRATEGY_REF) {
        rule = rule.with_table_strategy(reference);
    }
    if let Some(reference) = resolve_reference(element, tags::KEY_GENERATOR_REF) {
        rule = rule.with_key_generator(reference);
    }
    if let Some(reference) = resolve_reference(element, tags::ENCRYPTOR_REF) {
        rule = rule.with_encryptor(reference);
    }
    if let Some(index) = presence::resolve(element, tags::LOGIC_INDEX) {
        rule = rule.with_logic_index(index);
    }

    debug!(path = %path, logic_table, "compiled table rule");
    Ok(rule)
}

/// Build a master-slave rule from a `masterSlaveRule` element.
///
/// `loadBalanceAlgorithmRef` is only read when
/// [`CompileOptions::resolve_load_balance_refs`] is set, and is recorded as an
/// optional reference. There is no default algorithm.
pub fn build_master_slave_rule(
    element: &Element,
    path: &ElementPath,
    options: &CompileOptions,
) -> ConfigResult<MasterSlaveRuleConfig> {
    let id = presence::require(element, tags::ID, path)?;
    let master = presence::require(element, tags::MASTER_DATA_SOURCE_NAME, path)?;
    let slaves = list::require_list(element, tags::SLAVE_DATA_SOURCE_NAMES, path)?;

    let mut rule = MasterSlaveRuleConfig::new(id, master, slaves);
    if options.resolve_load_balance_refs {
        if let Some(name) = presence::resolve(element, tags::LOAD_BALANCE_ALGORITHM_REF) {
            rule = rule.with_load_balance_algorithm(NamedReference::optional(name));
        }
    }

    debug!(
        path = %path,
        id,
        master,
        slaves = rule.slave_data_sources().len(),
        "compiled master-slave rule"
    );
    Ok(rule)
}

/// Build a binding group from a `bindingTableRule` element's `logicTables` list.
pub fn build_binding_table_group(
    element: &Element,
    path: &ElementPath,
) -> ConfigResult<BindingTableGroup> {
    let tables = list::require_list(element, tags::LOGIC_TABLES, path)?;
    debug!(path = %path, tables = ?tables, "compiled binding table group");
    Ok(BindingTableGroup::new(tables))
}

/// Build a broadcast table from a `broadcastTableRule` element's `table` attribute.
pub fn build_broadcast_table(
    element: &Element,
    path: &ElementPath,
) -> ConfigResult<BroadcastTableName> {
    let table = presence::require(element, tags::TABLE, path)?;
    debug!(path = %path, table, "compiled broadcast table");
    Ok(BroadcastTableName::new(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigErrorKind;

    fn path(tag: &str) -> ElementPath {
        ElementPath::root("shardingRuleConfig").indexed(tag, 0)
    }

    #[test]
    fn test_table_rule_all_attributes() {
        let element = Element::new("tableRule")
            .with_attribute("logicTable", "t_order")
            .with_attribute("actualDataNodes", "ds_${0..1}.t_order_${0..1}")
            .with_attribute("databaseStrategyRef", "dbStrategy")
            .with_attribute("tableStrategyRef", "orderTableStrategy")
            .with_attribute("keyGeneratorRef", "orderKeyGenerator")
            .with_attribute("encryptorRef", "orderEncryptor")
            .with_attribute("logicIndex", "idx_order");

        let rule = build_table_rule(&element, &path("tableRule")).unwrap();
        assert_eq!(rule.logic_table(), "t_order");
        assert_eq!(rule.actual_data_nodes(), Some("ds_${0..1}.t_order_${0..1}"));
        assert_eq!(
            rule.database_strategy(),
            Some(&NamedReference::new("dbStrategy"))
        );
        assert_eq!(rule.table_strategy().unwrap().name(), "orderTableStrategy");
        assert_eq!(rule.key_generator().unwrap().name(), "orderKeyGenerator");
        assert_eq!(rule.encryptor().unwrap().name(), "orderEncryptor");
        assert_eq!(rule.logic_index(), Some("idx_order"));
    }

    #[test]
    fn test_table_rule_blank_optionals_are_absent() {
        let element = Element::new("tableRule")
            .with_attribute("logicTable", "t_order")
            .with_attribute("logicIndex", "")
            .with_attribute("keyGeneratorRef", "  ");

        let rule = build_table_rule(&element, &path("tableRule")).unwrap();
        assert_eq!(rule, TableRuleConfig::new("t_order"));
    }

    #[test]
    fn test_table_rule_requires_logic_table() {
        let element = Element::new("tableRule").with_attribute("actualDataNodes", "ds.t");
        let err = build_table_rule(&element, &path("tableRule")).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredAttribute);
        assert!(err.to_string().contains("logicTable"));
    }

    #[test]
    fn test_master_slave_rule() {
        let element = Element::new("masterSlaveRule")
            .with_attribute("id", "ms_ds")
            .with_attribute("masterDataSourceName", "master")
            .with_attribute("slaveDataSourceNames", " ds1 , ds2 ,ds3 ");

        let rule =
            build_master_slave_rule(&element, &path("masterSlaveRule"), &CompileOptions::default())
                .unwrap();
        assert_eq!(rule.name(), "ms_ds");
        assert_eq!(rule.master_data_source(), "master");
        assert_eq!(rule.slave_data_sources(), ["ds1", "ds2", "ds3"]);
        assert!(rule.load_balance_algorithm().is_none());
    }

    #[test]
    fn test_master_slave_rule_blank_slaves() {
        let element = Element::new("masterSlaveRule")
            .with_attribute("id", "ms_ds")
            .with_attribute("masterDataSourceName", "master")
            .with_attribute("slaveDataSourceNames", "");

        let err =
            build_master_slave_rule(&element, &path("masterSlaveRule"), &CompileOptions::default())
                .unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::InvalidListFormat);
    }

    #[test]
    fn test_master_slave_rule_missing_id() {
        let element = Element::new("masterSlaveRule")
            .with_attribute("masterDataSourceName", "master")
            .with_attribute("slaveDataSourceNames", "slave");

        let err =
            build_master_slave_rule(&element, &path("masterSlaveRule"), &CompileOptions::default())
                .unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredAttribute);
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn test_load_balance_ignored_by_default() {
        let element = Element::new("masterSlaveRule")
            .with_attribute("id", "ms_ds")
            .with_attribute("masterDataSourceName", "master")
            .with_attribute("slaveDataSourceNames", "slave")
            .with_attribute("loadBalanceAlgorithmRef", "randomStrategy");

        let rule =
            build_master_slave_rule(&element, &path("masterSlaveRule"), &CompileOptions::default())
                .unwrap();
        assert!(rule.load_balance_algorithm().is_none());

        let options = CompileOptions::new().resolve_load_balance_refs(true);
        let rule = build_master_slave_rule(&element, &path("masterSlaveRule"), &options).unwrap();
        assert_eq!(
            rule.load_balance_algorithm(),
            Some(&NamedReference::optional("randomStrategy"))
        );
    }

    #[test]
    fn test_binding_table_group() {
        let element =
            Element::new("bindingTableRule").with_attribute("logicTables", "t_order, t_order_item");
        let group = build_binding_table_group(&element, &path("bindingTableRule")).unwrap();
        assert_eq!(group.tables(), ["t_order", "t_order_item"]);
    }

    #[test]
    fn test_broadcast_table_requires_table() {
        let element = Element::new("broadcastTableRule").with_attribute("table", " ");
        let err = build_broadcast_table(&element, &path("broadcastTableRule")).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::MissingRequiredAttribute);
    }
}
