//! Schema descriptors and the metadata introspection trait

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Read-only introspection over one live connection.
///
/// Failures on the primary catalog lookups propagate. Supplementary metadata
/// (server version, index catalog) degrades to a sentinel or an empty list.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Probe the server version; never fails for a missing or empty answer
    async fn get_server(&self) -> Result<DbServer>;

    /// Namespace a fresh connection lands in when none is configured
    fn get_default_db(&self) -> &str;

    /// List schemas, excluding the engine's own system namespaces
    async fn get_schemas(&self) -> Result<Vec<String>>;

    /// List databases, excluding the engine's own system namespaces
    async fn get_db_names(&self) -> Result<Vec<String>>;

    /// List tables of the connection's namespace; all tables when `names` is empty
    async fn get_tables(&self, names: &[&str]) -> Result<Vec<Table>>;

    /// List columns of the first named table only, normalized
    async fn get_columns(&self, names: &[&str]) -> Result<Vec<Column>>;

    /// First column of the declared key.
    ///
    /// Providers may fall back to the first column by ordinal position when the
    /// engine declares no key; that answer is a heuristic, not a schema fact.
    async fn get_primary_key(&self, table: &str) -> Result<Option<String>>;

    /// Index descriptors; empty when the engine has no index catalog
    async fn get_table_index(&self, table: &str) -> Result<Vec<Index>>;

    /// The engine's stored creation statement, or an empty string
    async fn get_table_ddl(&self, table: &str, drop_before_create: bool) -> Result<String>;
}

/// Column descriptor passed between introspection and SQL generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub table_name: String,
    pub column_name: String,
    /// Native type expression, e.g. `Decimal(10, 2)`
    pub data_type: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub auto_increment: bool,
}

impl Column {
    pub fn new(table_name: &str, column_name: &str, data_type: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            data_type: data_type.to_string(),
            ..Default::default()
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Table descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub table_name: String,
    #[serde(default)]
    pub comment: Option<String>,
    /// Storage engine, where the engine reports one
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub total_bytes: Option<u64>,
}

impl Table {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// Index descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub index_name: String,
    pub index_type: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Server descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbServer {
    /// Engine identifier
    pub engine: String,
    /// Version string, or [`DbServer::UNKNOWN_VERSION`]
    pub version: String,
}

impl DbServer {
    pub const UNKNOWN_VERSION: &'static str = "unknown";

    pub fn unknown(engine: &str) -> Self {
        Self {
            engine: engine.to_string(),
            version: Self::UNKNOWN_VERSION.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.version == Self::UNKNOWN_VERSION
    }
}
