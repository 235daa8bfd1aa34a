//! Dialect contracts: identifier quoting, SQL generation and engine capabilities
//!
//! A [`Dialect`] is created per live connection. Everything that produces SQL
//! text goes through [`SqlGenerator`], whose methods depend only on their
//! arguments so generators can be shared freely across threads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Column, DataTypeTable, DbmError, DumpHelper, EngineDataType, Index, LiteralStyle, Result,
    SqlParser, Table, Value,
};

/// Which identifiers a [`Quoter`] wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservePolicy {
    /// Quote every identifier unconditionally
    AlwaysReserve,
    /// Quote only reserved words (matched case-insensitively) and identifiers
    /// that are not plain `[A-Za-z_][A-Za-z0-9_]*`
    Keywords(&'static [&'static str]),
}

/// Identifier quoting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoter {
    pub prefix: char,
    pub suffix: char,
    pub reserve: ReservePolicy,
    /// Backslash is an escape character inside quoted identifiers
    pub backslash_escapes: bool,
}

impl Quoter {
    pub const fn new(prefix: char, suffix: char, reserve: ReservePolicy) -> Self {
        Self {
            prefix,
            suffix,
            reserve,
            backslash_escapes: false,
        }
    }

    pub const fn with_backslash_escapes(mut self) -> Self {
        self.backslash_escapes = true;
        self
    }

    /// Quote an identifier.
    ///
    /// An identifier that is already wrapped in this quoter's pair is returned
    /// unchanged, so generators never double-quote. Embedded closing quote
    /// characters are escaped by doubling.
    ///
    /// ```
    /// use dbm_core::{Quoter, ReservePolicy};
    ///
    /// let quoter = Quoter::new('"', '"', ReservePolicy::AlwaysReserve);
    /// assert_eq!(quoter.quote("users"), "\"users\"");
    /// assert_eq!(quoter.quote("\"users\""), "\"users\"");
    /// assert_eq!(quoter.quote("my\"table"), "\"my\"\"table\"");
    /// ```
    pub fn quote(&self, identifier: &str) -> String {
        if self.is_quoted(identifier) || !self.needs_quoting(identifier) {
            return identifier.to_string();
        }
        let mut out = String::with_capacity(identifier.len() + 2);
        out.push(self.prefix);
        for ch in identifier.chars() {
            if ch == self.suffix {
                out.push(ch);
            } else if ch == '\\' && self.backslash_escapes {
                out.push('\\');
            }
            out.push(ch);
        }
        out.push(self.suffix);
        out
    }

    /// Quote each segment of a dotted name (`db.table`). Dots inside an
    /// already-quoted segment do not split it.
    pub fn quote_qualified(&self, name: &str) -> String {
        if self.is_quoted(name) {
            return name.to_string();
        }
        self.split_segments(name)
            .into_iter()
            .map(|part| self.quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn split_segments<'a>(&self, name: &'a str) -> Vec<&'a str> {
        let mut segments = Vec::new();
        let mut start = 0;
        let mut in_quote = false;
        let mut chars = name.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            if in_quote {
                if ch == '\\' && self.backslash_escapes {
                    chars.next();
                } else if ch == self.suffix {
                    if chars.peek().is_some_and(|&(_, next)| next == self.suffix) {
                        chars.next();
                    } else {
                        in_quote = false;
                    }
                }
            } else if ch == self.prefix {
                in_quote = true;
            } else if ch == '.' {
                segments.push(&name[start..idx]);
                start = idx + 1;
            }
        }
        segments.push(&name[start..]);
        segments
    }

    /// Whether `identifier` is already a complete quoted identifier
    pub fn is_quoted(&self, identifier: &str) -> bool {
        let Some(inner) = identifier
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_suffix(self.suffix))
        else {
            return false;
        };
        // Every inner closing char must be part of a doubled escape
        let doubled: String = [self.suffix, self.suffix].iter().collect();
        !inner.replace(&doubled, "").contains(self.suffix)
    }

    pub fn needs_quoting(&self, identifier: &str) -> bool {
        match self.reserve {
            ReservePolicy::AlwaysReserve => true,
            ReservePolicy::Keywords(words) => {
                let plain = identifier
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                    && identifier
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_');
                !plain || words.iter().any(|w| w.eq_ignore_ascii_case(identifier))
            }
        }
    }
}

/// How an insert treats rows whose key already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStrategy {
    /// Plain insert; duplicates pass or fail per engine default
    #[default]
    None,
    /// Conflicting rows are silently dropped
    Ignore,
    /// Conflicting rows are overwritten
    Update,
}

/// Produces SQL text for one engine
pub trait SqlGenerator: Send + Sync {
    fn quoter(&self) -> &Quoter;

    fn literal_style(&self) -> &LiteralStyle;

    /// The engine's native types, used to pick each column's literal rule
    fn data_types(&self) -> &DataTypeTable;

    /// Resolve the native type a column's values are rendered with
    fn resolve_type(&self, column: &Column) -> Result<&'static EngineDataType> {
        self.data_types().resolve(&column.data_type)
    }

    /// Render one value for `column`
    fn literal(&self, column: &Column, value: &Value) -> Result<String> {
        let data_type = self.resolve_type(column)?;
        Ok(data_type.portable.literal(value, self.literal_style()))
    }

    /// Optional drop-if-exists followed by exactly one create statement
    fn gen_table_ddl(
        &self,
        table: &Table,
        columns: &[Column],
        drop_before_create: bool,
    ) -> Vec<String>;

    /// Separate index statements; may be empty when indexes live in the create clause
    fn gen_index_ddl(&self, table: &Table, indexes: &[Index]) -> Vec<String>;

    /// Statements inserting `rows` under `strategy`, in execution order.
    ///
    /// Returns an empty list when `rows` is empty. Fails when a column type is
    /// unknown to the engine or a row's width differs from `columns`.
    fn gen_insert(
        &self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<Value>],
        strategy: DuplicateStrategy,
    ) -> Result<Vec<String>>;

    /// Update the given columns on rows matching every `filter` pair
    fn gen_update(
        &self,
        table: &str,
        columns: &[Column],
        values: &[Value],
        filter: &[(Column, Value)],
    ) -> Result<String> {
        let assignments = render_assignments(self, columns, values)?;
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.quoter().quote_qualified(table),
            assignments
        );
        if let Some(condition) = render_filter(self, filter)? {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }
        Ok(sql)
    }

    /// Delete rows matching every `filter` pair; all rows when `filter` is empty
    fn gen_delete(&self, table: &str, filter: &[(Column, Value)]) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", self.quoter().quote_qualified(table));
        if let Some(condition) = render_filter(self, filter)? {
            sql.push_str(" WHERE ");
            sql.push_str(&condition);
        }
        Ok(sql)
    }

    fn gen_create_database(&self, name: &str) -> String {
        format!("CREATE DATABASE {}", self.quoter().quote(name))
    }

    fn gen_drop_database(&self, name: &str) -> String {
        format!("DROP DATABASE {}", self.quoter().quote(name))
    }
}

/// `q1 = v1, q2 = v2` for an update statement
pub fn render_assignments<G: SqlGenerator + ?Sized>(
    generator: &G,
    columns: &[Column],
    values: &[Value],
) -> Result<String> {
    if columns.len() != values.len() {
        return Err(DbmError::Other(format!(
            "{} columns but {} values",
            columns.len(),
            values.len()
        )));
    }
    let parts = columns
        .iter()
        .zip(values)
        .map(|(column, value)| {
            Ok(format!(
                "{} = {}",
                generator.quoter().quote(&column.column_name),
                generator.literal(column, value)?
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(", "))
}

/// `q1 = v1 AND q2 IS NULL`, or `None` for an empty filter
pub fn render_filter<G: SqlGenerator + ?Sized>(
    generator: &G,
    filter: &[(Column, Value)],
) -> Result<Option<String>> {
    if filter.is_empty() {
        return Ok(None);
    }
    let parts = filter
        .iter()
        .map(|(column, value)| {
            let name = generator.quoter().quote(&column.column_name);
            if value.is_null() {
                Ok(format!("{} IS NULL", name))
            } else {
                Ok(format!("{} = {}", name, generator.literal(column, value)?))
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(parts.join(" AND ")))
}

/// Request to duplicate a table inside the connection's namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyTable {
    pub table_name: String,
    pub new_table_name: String,
    /// Copy rows as well as structure
    #[serde(default)]
    pub copy_data: bool,
}

/// Engine bundle of quoting, generation and capability rules, bound to one connection
#[async_trait]
pub trait Dialect: Send + Sync {
    fn engine(&self) -> &'static str;

    fn quoter(&self) -> &Quoter;

    fn sql_generator(&self) -> &dyn SqlGenerator;

    fn dump_helper(&self) -> &dyn DumpHelper;

    fn sql_parser(&self) -> &SqlParser;

    /// Duplicate a table on the bound connection
    async fn copy_table(&self, copy: &CopyTable) -> Result<()> {
        Err(DbmError::NotSupported(format!(
            "{} cannot copy table '{}'",
            self.engine(),
            copy.table_name
        )))
    }

    /// Rows per generated insert when bulk-loading into this engine
    fn recommended_batch_size(&self) -> usize {
        1000
    }

    /// Statements to run once a bulk load into `table` has finished
    fn post_transfer_sql(&self, _table: &str) -> Vec<String> {
        Vec::new()
    }
}
