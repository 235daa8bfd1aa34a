//! ClickHouse schema introspection through the `system` catalog

use std::sync::Arc;

use async_trait::async_trait;
use dbm_core::{Column, Connection, DbServer, Index, MetadataProvider, Result, Table, Value};

use crate::{CLICKHOUSE_QUOTER, ENGINE};

const DEFAULT_DATABASE: &str = "default";

/// Namespaces ClickHouse creates for itself
const SYSTEM_DATABASES: &[&str] = &["system", "information_schema", "INFORMATION_SCHEMA"];

const NULLABLE_WRAPPER: &str = "Nullable(";
const LOW_CARDINALITY_WRAPPER: &str = "LowCardinality(";

/// Strip `Nullable(..)` and `LowCardinality(..)` wrappers from a native type.
///
/// Wrappers are peeled repeatedly in any nesting order. Returns the inner type
/// and whether a `Nullable` wrapper was seen. Other parameterized types are
/// left as they are.
///
/// ```
/// use dbm_driver_clickhouse::normalize_type;
///
/// assert_eq!(normalize_type("Nullable(Int32)"), ("Int32".to_string(), true));
/// assert_eq!(
///     normalize_type("LowCardinality(Nullable(String))"),
///     ("String".to_string(), true)
/// );
/// assert_eq!(normalize_type("Array(Int8)"), ("Array(Int8)".to_string(), false));
/// ```
pub fn normalize_type(native_type: &str) -> (String, bool) {
    let mut current = native_type.trim();
    let mut nullable = false;
    loop {
        if let Some(inner) = unwrap(current, NULLABLE_WRAPPER) {
            nullable = true;
            current = inner;
        } else if let Some(inner) = unwrap(current, LOW_CARDINALITY_WRAPPER) {
            current = inner;
        } else {
            return (current.to_string(), nullable);
        }
    }
}

fn unwrap<'a>(native_type: &'a str, wrapper: &str) -> Option<&'a str> {
    native_type
        .strip_prefix(wrapper)
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
}

/// Rewrite a column's wrapper types in place; a `Nullable` wrapper forces
/// `nullable`
pub fn normalize_column(column: &mut Column) {
    let (inner, nullable) = normalize_type(&column.data_type);
    if inner != column.data_type {
        tracing::trace!(
            column = %column.column_name,
            from = %column.data_type,
            to = %inner,
            "normalized column type"
        );
        column.data_type = inner;
    }
    column.nullable |= nullable;
}

/// Introspection over one ClickHouse connection.
///
/// Everything is scoped to the database the connection was opened against.
pub struct ClickHouseMetadata {
    conn: Arc<dyn Connection>,
}

impl ClickHouseMetadata {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self { conn }
    }

    fn database(&self) -> Value {
        Value::from(self.conn.database())
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|s| !s.is_empty())
}

#[async_trait]
impl MetadataProvider for ClickHouseMetadata {
    async fn get_server(&self) -> Result<DbServer> {
        let result = match self.conn.query("SELECT version() AS version", &[]).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "version probe failed");
                return Ok(DbServer::unknown(ENGINE));
            }
        };

        let version = result
            .rows
            .first()
            .and_then(|row| row.decode_opt_string("version").ok().flatten())
            .filter(|v| !v.is_empty());
        Ok(match version {
            Some(version) => DbServer {
                engine: ENGINE.to_string(),
                version,
            },
            None => DbServer::unknown(ENGINE),
        })
    }

    fn get_default_db(&self) -> &str {
        DEFAULT_DATABASE
    }

    /// Databases double as schemas
    async fn get_schemas(&self) -> Result<Vec<String>> {
        self.get_db_names().await
    }

    async fn get_db_names(&self) -> Result<Vec<String>> {
        let result = self
            .conn
            .query(
                "SELECT name FROM system.databases \
                 WHERE name NOT IN ('system', 'information_schema', 'INFORMATION_SCHEMA') \
                 ORDER BY name",
                &[],
            )
            .await?;

        let mut names = result
            .rows
            .iter()
            .map(|row| row.decode_string("name"))
            .collect::<Result<Vec<_>>>()?;
        names.retain(|name| !SYSTEM_DATABASES.contains(&name.as_str()));
        names.sort();
        Ok(names)
    }

    #[tracing::instrument(skip(self))]
    async fn get_tables(&self, names: &[&str]) -> Result<Vec<Table>> {
        let mut sql = String::from(
            "SELECT name, comment, engine, total_rows, total_bytes FROM system.tables \
             WHERE database = ? AND is_temporary = 0",
        );
        let mut params = vec![self.database()];
        if !names.is_empty() {
            let placeholders = vec!["?"; names.len()].join(", ");
            sql.push_str(&format!(" AND name IN ({})", placeholders));
            params.extend(names.iter().map(|name| Value::from(*name)));
        }
        sql.push_str(" ORDER BY name");

        let result = self.conn.query(&sql, &params).await?;
        let tables = result
            .rows
            .iter()
            .map(|row| {
                Ok(Table {
                    table_name: row.decode_string("name")?,
                    comment: non_empty(row.decode_opt_string("comment")?),
                    engine: non_empty(row.decode_opt_string("engine")?),
                    total_rows: row.decode_opt_u64("total_rows")?,
                    total_bytes: row.decode_opt_u64("total_bytes")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = tables.len(), "listed tables");
        Ok(tables)
    }

    #[tracing::instrument(skip(self))]
    async fn get_columns(&self, names: &[&str]) -> Result<Vec<Column>> {
        let Some(&table) = names.first() else {
            return Ok(Vec::new());
        };
        if names.len() > 1 {
            tracing::debug!(ignored = names.len() - 1, "only the first table is introspected");
        }

        let result = self
            .conn
            .query(
                "SELECT name, type, comment, is_in_primary_key, default_expression \
                 FROM system.columns WHERE database = ? AND table = ? ORDER BY position",
                &[self.database(), Value::from(table)],
            )
            .await?;

        result
            .rows
            .iter()
            .map(|row| {
                let mut column = Column {
                    table_name: table.to_string(),
                    column_name: row.decode_string("name")?,
                    data_type: row.decode_string("type")?,
                    comment: non_empty(row.decode_opt_string("comment")?),
                    nullable: false,
                    is_primary_key: row.decode_flag("is_in_primary_key")?,
                    default_value: non_empty(row.decode_opt_string("default_expression")?),
                    auto_increment: false,
                };
                normalize_column(&mut column);
                Ok(column)
            })
            .collect()
    }

    /// First entry of the table's declared primary key. A table without one
    /// (`ORDER BY tuple()`) answers with its first column, which is only a
    /// best guess at a row identifier.
    #[tracing::instrument(skip(self))]
    async fn get_primary_key(&self, table: &str) -> Result<Option<String>> {
        let result = self
            .conn
            .query(
                "SELECT primary_key FROM system.tables WHERE database = ? AND name = ?",
                &[self.database(), Value::from(table)],
            )
            .await?;

        if let Some(row) = result.rows.first() {
            let declared = row.decode_opt_string("primary_key")?.unwrap_or_default();
            if let Some(first) = declared
                .split(',')
                .map(str::trim)
                .find(|part| !part.is_empty())
            {
                return Ok(Some(first.to_string()));
            }
        }

        tracing::debug!("no declared primary key, falling back to first column");
        let columns = self.get_columns(&[table]).await?;
        Ok(columns.into_iter().next().map(|column| column.column_name))
    }

    async fn get_table_index(&self, table: &str) -> Result<Vec<Index>> {
        let result = self
            .conn
            .query(
                "SELECT name, type, expr FROM system.data_skipping_indices \
                 WHERE database = ? AND table = ? ORDER BY name",
                &[self.database(), Value::from(table)],
            )
            .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "index catalog unavailable");
                return Ok(Vec::new());
            }
        };

        let indexes = result
            .rows
            .iter()
            .map(|row| {
                Ok(Index {
                    index_name: row.decode_string("name")?,
                    index_type: non_empty(row.decode_opt_string("type")?)
                        .unwrap_or_else(|| "INDEX".to_string()),
                    comment: non_empty(row.decode_opt_string("expr")?),
                })
            })
            .collect::<Result<Vec<_>>>();

        match indexes {
            Ok(indexes) => Ok(indexes),
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "unreadable index catalog row");
                Ok(Vec::new())
            }
        }
    }

    async fn get_table_ddl(&self, table: &str, drop_before_create: bool) -> Result<String> {
        let result = self
            .conn
            .query(
                "SELECT create_table_query FROM system.tables WHERE database = ? AND name = ?",
                &[self.database(), Value::from(table)],
            )
            .await?;

        let ddl = match result.rows.first() {
            Some(row) => row.decode_opt_string("create_table_query")?.unwrap_or_default(),
            None => String::new(),
        };
        if drop_before_create && !ddl.is_empty() {
            return Ok(format!(
                "DROP TABLE IF EXISTS {};\n{}",
                CLICKHOUSE_QUOTER.quote_qualified(table),
                ddl
            ));
        }
        Ok(ddl)
    }
}

impl std::fmt::Debug for ClickHouseMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseMetadata")
            .field("database", &self.conn.database())
            .finish()
    }
}
