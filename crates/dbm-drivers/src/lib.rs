//! DBM Drivers - engine adapters and the registry that hands them out
//!
//! This crate re-exports the engine crates enabled by cargo features and
//! provides [`DialectRegistry`], which maps engine identifiers to their
//! `DbMeta` bundles.

#[cfg(feature = "clickhouse")]
pub use dbm_driver_clickhouse as clickhouse;

mod registry;

pub use registry::DialectRegistry;

/// Re-export commonly used types from dbm-core
pub use dbm_core::{
    Column, Connection, ConnectionConfig, ConnectionProvider, DbMeta, DbmError, Dialect,
    DuplicateStrategy, MetadataProvider, QueryResult, Result, Row, SqlGenerator, StatementResult,
    Table, Value,
};
