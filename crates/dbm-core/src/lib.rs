//! DBM Core - engine-neutral abstractions for multi-dialect SQL tooling
//!
//! This crate provides the traits and types every engine adapter implements
//! and every consumer programs against. It defines:
//!
//! - `PortableType` / `CommonKind` - the portable type model
//! - `DataTypeTable` / `CommonTypeConverter` - per-engine type mapping
//! - `Dialect` / `SqlGenerator` / `Quoter` - quoting and DDL/DML generation
//! - `MetadataProvider` - live schema introspection
//! - `Connection` / `ConnectionProvider` - the consumed execution capability
//! - `DbMeta` - the per-engine bundle a registry holds

mod config;
mod connection;
mod datatype;
mod dialect;
mod dump;
mod error;
mod meta;
mod parser;
mod portable;
mod schema;
mod types;

#[cfg(test)]
mod datatype_tests;
#[cfg(test)]
mod dialect_tests;

pub use config::*;
pub use connection::*;
pub use datatype::*;
pub use dialect::*;
pub use dump::*;
pub use error::*;
pub use meta::*;
pub use parser::*;
pub use portable::*;
pub use schema::*;
pub use types::*;
