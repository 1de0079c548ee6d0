//! Deterministic textual rendering of compiled configurations.
//!
//! Fields are written in declaration order, absent values as `<absent>`, so
//! the output is stable enough for snapshot comparisons:
//!
//! ```text
//! RootConfiguration
//!   defaultDataSource: <absent>
//!   defaultDatabaseStrategyRef: <absent>
//!   defaultTableStrategyRef: <absent>
//!   tableRules: 1
//!     - logicTable: t_order
//!       actualDataNodes: ds_${0..1}.t_order_${0..1}
//!       databaseStrategyRef: <absent>
//!       tableStrategyRef: <absent>
//!       keyGeneratorRef: <absent>
//!       encryptorRef: <absent>
//!       logicIndex: <absent>
//!   masterSlaveRules: 0
//!   bindingTableGroups: 0
//!   broadcastTables: 0
//!   defaultKeyGeneratorRef: <absent>
//! ```

use std::fmt::{self, Display, Formatter};

use crate::model::{
    BindingTableGroup, BroadcastTableName, DataSourceConfiguration, MasterSlaveRuleConfig,
    RootConfiguration, TableRuleConfig,
};

const ABSENT: &str = "<absent>";

fn field(
    f: &mut Formatter<'_>,
    indent: usize,
    name: &str,
    value: Option<impl Display>,
) -> fmt::Result {
    match value {
        Some(value) => writeln!(f, "{:indent$}{name}: {value}", ""),
        None => writeln!(f, "{:indent$}{name}: {}", "", ABSENT),
    }
}

impl Display for RootConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "RootConfiguration")?;
        self.write_body(f, 2)
    }
}

impl RootConfiguration {
    fn write_body(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        field(f, indent, "defaultDataSource", self.default_data_source())?;
        field(f, indent, "defaultDatabaseStrategyRef", self.default_database_strategy())?;
        field(f, indent, "defaultTableStrategyRef", self.default_table_strategy())?;

        writeln!(f, "{:indent$}tableRules: {}", "", self.table_rules().len())?;
        for rule in self.table_rules() {
            rule.write_entry(f, indent + 2)?;
        }

        writeln!(f, "{:indent$}masterSlaveRules: {}", "", self.master_slave_rules().len())?;
        for rule in self.master_slave_rules() {
            rule.write_entry(f, indent + 2)?;
        }

        writeln!(f, "{:indent$}bindingTableGroups: {}", "", self.binding_table_groups().len())?;
        for group in self.binding_table_groups() {
            writeln!(f, "{:width$}- {group}", "", width = indent + 2)?;
        }

        writeln!(f, "{:indent$}broadcastTables: {}", "", self.broadcast_tables().len())?;
        for table in self.broadcast_tables() {
            writeln!(f, "{:width$}- {table}", "", width = indent + 2)?;
        }

        field(f, indent, "defaultKeyGeneratorRef", self.default_key_generator())
    }
}

impl TableRuleConfig {
    fn write_entry(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(f, "{:indent$}- logicTable: {}", "", self.logic_table())?;
        let indent = indent + 2;
        field(f, indent, "actualDataNodes", self.actual_data_nodes())?;
        field(f, indent, "databaseStrategyRef", self.database_strategy())?;
        field(f, indent, "tableStrategyRef", self.table_strategy())?;
        field(f, indent, "keyGeneratorRef", self.key_generator())?;
        field(f, indent, "encryptorRef", self.encryptor())?;
        field(f, indent, "logicIndex", self.logic_index())
    }
}

impl MasterSlaveRuleConfig {
    fn write_entry(&self, f: &mut Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(f, "{:indent$}- id: {}", "", self.name())?;
        let indent = indent + 2;
        writeln!(f, "{:indent$}masterDataSourceName: {}", "", self.master_data_source())?;
        writeln!(
            f,
            "{:indent$}slaveDataSourceNames: [{}]",
            "",
            self.slave_data_sources().join(", ")
        )?;
        field(f, indent, "loadBalanceAlgorithmRef", self.load_balance_algorithm())
    }
}

impl Display for BindingTableGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.tables().join(", "))
    }
}

impl Display for BroadcastTableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for DataSourceConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "DataSourceConfiguration")?;
        writeln!(f, "  dataSource: {}", self.data_source())?;
        writeln!(f, "  rule:")?;
        self.rule().write_body(f, 4)?;
        writeln!(f, "  props: {}", self.props().len())?;
        for (key, value) in self.props() {
            writeln!(f, "    {key} = {value}")?;
        }
        Ok(())
    }
}
