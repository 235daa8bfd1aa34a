//! ClickHouse adapter for DBM
//!
//! ClickHouse is a column-oriented database for online analytical processing.
//! It has no conflict clause on insert, no transactions for MergeTree tables
//! and expresses updates and deletes as asynchronous `ALTER TABLE` mutations,
//! all of which shape the SQL this crate generates.
//!
//! The crate contributes one [`ClickHouseMeta`] bundle to the registry. It
//! carries the native type table, the common-type converter, the HTTP
//! connection provider and the factories for [`ClickHouseDialect`] and
//! [`ClickHouseMetadata`].

mod dialect;
mod driver;
mod meta;
mod metadata;
mod sqlgen;
mod types;

#[cfg(test)]
mod dialect_tests;
#[cfg(test)]
mod driver_tests;
#[cfg(test)]
mod metadata_tests;
#[cfg(test)]
mod sqlgen_tests;
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod types_tests;

pub use dialect::*;
pub use driver::*;
pub use meta::*;
pub use metadata::*;
pub use sqlgen::*;
pub use types::*;

/// Engine identifier the adapter registers under
pub const ENGINE: &str = "clickhouse";
