//! Tag and attribute names recognized by the compiler.

/// Root element of one compilation unit.
pub const SHARDING_RULE_CONFIG: &str = "shardingRuleConfig";

/// Root-level default data source name.
pub const DEFAULT_DATA_SOURCE: &str = "defaultDataSource";
/// Root-level default database sharding strategy reference.
pub const DEFAULT_DATABASE_STRATEGY_REF: &str = "defaultDatabaseStrategyRef";
/// Root-level default table sharding strategy reference.
pub const DEFAULT_TABLE_STRATEGY_REF: &str = "defaultTableStrategyRef";
/// Root-level default key generator reference.
pub const DEFAULT_KEY_GENERATOR_REF: &str = "defaultKeyGeneratorRef";

/// Required section holding table rules.
pub const TABLE_RULES: &str = "tableRules";
/// One table rule.
pub const TABLE_RULE: &str = "tableRule";
/// Logic table name of a table rule.
pub const LOGIC_TABLE: &str = "logicTable";
/// Actual data nodes expression of a table rule.
pub const ACTUAL_DATA_NODES: &str = "actualDataNodes";
/// Database sharding strategy reference of a table rule.
pub const DATABASE_STRATEGY_REF: &str = "databaseStrategyRef";
/// Table sharding strategy reference of a table rule.
pub const TABLE_STRATEGY_REF: &str = "tableStrategyRef";
/// Key generator reference of a table rule.
pub const KEY_GENERATOR_REF: &str = "keyGeneratorRef";
/// Encryptor reference of a table rule.
pub const ENCRYPTOR_REF: &str = "encryptorRef";
/// Logic index name of a table rule.
pub const LOGIC_INDEX: &str = "logicIndex";

/// Optional section holding master-slave rules.
pub const MASTER_SLAVE_RULES: &str = "masterSlaveRules";
/// One master-slave rule.
pub const MASTER_SLAVE_RULE: &str = "masterSlaveRule";
/// Identifier of a master-slave rule.
pub const ID: &str = "id";
/// Master data source name.
pub const MASTER_DATA_SOURCE_NAME: &str = "masterDataSourceName";
/// Comma-separated slave data source names.
pub const SLAVE_DATA_SOURCE_NAMES: &str = "slaveDataSourceNames";
/// Load balance algorithm reference, only read when the hook is enabled.
pub const LOAD_BALANCE_ALGORITHM_REF: &str = "loadBalanceAlgorithmRef";

/// Optional section holding binding table groups.
pub const BINDING_TABLE_RULES: &str = "bindingTableRules";
/// One binding table group.
pub const BINDING_TABLE_RULE: &str = "bindingTableRule";
/// Comma-separated logic tables of a binding group.
pub const LOGIC_TABLES: &str = "logicTables";

/// Optional section holding broadcast tables.
pub const BROADCAST_TABLE_RULES: &str = "broadcastTableRules";
/// One broadcast table.
pub const BROADCAST_TABLE_RULE: &str = "broadcastTableRule";
/// Table name of a broadcast rule.
pub const TABLE: &str = "table";

/// Wrapper pairing a rule configuration with its backing data source.
pub const ENCRYPT_DATA_SOURCE: &str = "encryptDataSource";
/// Element naming the backing data source.
pub const ENCRYPT_RULE_CONFIG: &str = "encryptRuleConfig";
/// Backing data source reference.
pub const DATA_SOURCE_NAME: &str = "dataSourceName";
/// Optional properties section.
pub const PROPS: &str = "props";
/// One property.
pub const PROP: &str = "prop";
/// Property key.
pub const KEY: &str = "key";
/// Property value.
pub const VALUE: &str = "value";
