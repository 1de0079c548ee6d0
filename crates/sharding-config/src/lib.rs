//! Sharding rule configuration compiler.
//!
//! This crate compiles a declarative rule document (database sharding,
//! master-slave replication, binding and broadcast tables, column encryptor
//! references) into an immutable, strongly-typed [`RootConfiguration`] for a
//! data-routing middleware.
//!
//! # Overview
//!
//! The input is a generic [`Element`] tree supplied by an external reader.
//! Compilation is a single synchronous pass:
//!
//! - [`presence`] - an attribute is supplied only if non-blank after trimming
//! - [`list`] - comma-separated attributes become ordered token lists
//! - [`reference`] - names of other fragments are recorded as [`NamedReference`]s,
//!   never dereferenced
//! - [`builders`] - one builder per rule fragment kind
//! - [`ConfigCompiler`] - walks the root in a fixed order and assembles the result
//!
//! Any error aborts the pass and carries the [`ElementPath`] of the failing
//! element.
//!
//! # Example
//!
//! ```
//! use sharding_config::{ConfigCompiler, Element};
//!
//! # fn main() -> Result<(), sharding_config::ConfigError> {
//! let root = Element::new("shardingRuleConfig")
//!     .with_attribute("defaultDataSource", "ds_0")
//!     .with_child(
//!         Element::new("tableRules").with_child(
//!             Element::new("tableRule")
//!                 .with_attribute("logicTable", "t_order")
//!                 .with_attribute("tableStrategyRef", "orderTableStrategy"),
//!         ),
//!     )
//!     .with_child(
//!         Element::new("masterSlaveRules").with_child(
//!             Element::new("masterSlaveRule")
//!                 .with_attribute("id", "ds_0")
//!                 .with_attribute("masterDataSourceName", "ds_master")
//!                 .with_attribute("slaveDataSourceNames", "ds_slave_0, ds_slave_1"),
//!         ),
//!     );
//!
//! let config = ConfigCompiler::new().compile(&root)?;
//!
//! assert_eq!(config.default_data_source(), Some("ds_0"));
//! assert_eq!(config.master_slave_rules()[0].slave_data_sources().len(), 2);
//! println!("{config}");
//! # Ok(())
//! # }
//! ```
//!
//! # Document Vocabulary
//!
//! | Element | Attributes |
//! |---|---|
//! | `shardingRuleConfig` | `defaultDataSource`, `defaultDatabaseStrategyRef`, `defaultTableStrategyRef`, `defaultKeyGeneratorRef` |
//! | `tableRules/tableRule` | `logicTable` (required), `actualDataNodes`, `databaseStrategyRef`, `tableStrategyRef`, `keyGeneratorRef`, `encryptorRef`, `logicIndex` |
//! | `masterSlaveRules/masterSlaveRule` | `id`, `masterDataSourceName`, `slaveDataSourceNames` (all required) |
//! | `bindingTableRules/bindingTableRule` | `logicTables` |
//! | `broadcastTableRules/broadcastTableRule` | `table` |

#![warn(missing_docs)]

pub mod builders;
mod compiler;
mod dump;
mod element;
mod error;
pub mod list;
mod loader;
mod model;
mod options;
pub mod presence;
pub mod reference;
pub mod tags;

pub use compiler::{compile, ConfigCompiler};
pub use element::{Element, ElementPath};
pub use error::{ConfigError, ConfigErrorKind, ConfigResult};
pub use loader::{DocumentFormat, DocumentLoader};
pub use model::*;
pub use options::CompileOptions;
pub use reference::{Declarations, NamedReference, ReferenceSite};
