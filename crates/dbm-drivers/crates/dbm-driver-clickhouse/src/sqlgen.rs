//! ClickHouse DDL and DML generation

use std::collections::HashSet;
use std::sync::LazyLock;

use dbm_core::{
    Column, DataTypeTable, DbmError, DuplicateStrategy, EngineDataType, Index, LiteralStyle, Quoter,
    Result, SqlGenerator, SqlParser, Table, Value, render_assignments, render_filter,
};
use sqlparser::dialect::ClickHouseDialect as ClickHouseGrammar;

use crate::{CLICKHOUSE_LITERALS, CLICKHOUSE_QUOTER, CLICKHOUSE_TYPES, normalize_type};

/// Storage clause for generated tables; `tuple()` means unsorted
const DEFAULT_ENGINE_CLAUSE: &str = "ENGINE = MergeTree() ORDER BY tuple()";

/// Types that ClickHouse refuses to wrap in `Nullable`
const NON_NULLABLE_TYPES: &[&str] = &[
    "Array(",
    "Map(",
    "Tuple(",
    "Nested(",
    "AggregateFunction(",
    "SimpleAggregateFunction(",
];

static EXPRESSION_PARSER: LazyLock<SqlParser> =
    LazyLock::new(|| SqlParser::new(ClickHouseGrammar {}));

/// SQL generator for ClickHouse.
///
/// Stateless; one instance can serve any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickHouseSqlGenerator;

impl ClickHouseSqlGenerator {
    pub fn new() -> Self {
        Self
    }

    /// `ALTER TABLE q MODIFY COMMENT '…'`
    pub fn gen_table_comment(&self, table: &str, comment: &str) -> String {
        format!(
            "ALTER TABLE {} MODIFY COMMENT {}",
            CLICKHOUSE_QUOTER.quote_qualified(table),
            CLICKHOUSE_LITERALS.quote_string(comment)
        )
    }

    /// `ALTER TABLE q COMMENT COLUMN c '…'`
    pub fn gen_column_comment(&self, table: &str, column: &str, comment: &str) -> String {
        format!(
            "ALTER TABLE {} COMMENT COLUMN {} {}",
            CLICKHOUSE_QUOTER.quote_qualified(table),
            CLICKHOUSE_QUOTER.quote(column),
            CLICKHOUSE_LITERALS.quote_string(comment)
        )
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut definition = format!(
            "  {} {}",
            CLICKHOUSE_QUOTER.quote(&column.column_name),
            ddl_type(column)
        );
        if let Some(default) = column.default_value.as_deref().filter(|d| !d.is_empty()) {
            match EXPRESSION_PARSER.parse_expression(default) {
                Ok(expr) => {
                    definition.push_str(" DEFAULT ");
                    definition.push_str(&expr.to_string());
                }
                Err(e) => tracing::warn!(
                    column = %column.column_name,
                    error = %e,
                    "skipping default that is not a single expression"
                ),
            }
        }
        if let Some(comment) = column.comment.as_deref().filter(|c| !c.is_empty()) {
            definition.push_str(" COMMENT ");
            definition.push_str(&CLICKHOUSE_LITERALS.quote_string(comment));
        }
        definition
    }
}

/// Column type as it appears in a create statement. Primary key columns are
/// never wrapped in `Nullable`; `LowCardinality` takes the wrapper inside it.
fn ddl_type(column: &Column) -> String {
    let data_type = column.data_type.as_str();
    if !column.nullable
        || column.is_primary_key
        || data_type.starts_with("Nullable(")
        || NON_NULLABLE_TYPES.iter().any(|prefix| data_type.starts_with(prefix))
    {
        return data_type.to_string();
    }
    match data_type
        .strip_prefix("LowCardinality(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) if inner.starts_with("Nullable(") => data_type.to_string(),
        Some(inner) => format!("LowCardinality(Nullable({}))", inner),
        None => format!("Nullable({})", data_type),
    }
}

impl SqlGenerator for ClickHouseSqlGenerator {
    fn quoter(&self) -> &Quoter {
        &CLICKHOUSE_QUOTER
    }

    fn literal_style(&self) -> &LiteralStyle {
        &CLICKHOUSE_LITERALS
    }

    fn data_types(&self) -> &DataTypeTable {
        &CLICKHOUSE_TYPES
    }

    /// Wrapper types render their inner type's literals
    fn resolve_type(&self, column: &Column) -> Result<&'static EngineDataType> {
        let (inner, _) = normalize_type(&column.data_type);
        CLICKHOUSE_TYPES.resolve(&inner)
    }

    fn gen_table_ddl(
        &self,
        table: &Table,
        columns: &[Column],
        drop_before_create: bool,
    ) -> Vec<String> {
        if columns.is_empty() {
            tracing::warn!(table = %table.table_name, "no columns to create a table from");
            return Vec::new();
        }
        let name = CLICKHOUSE_QUOTER.quote_qualified(&table.table_name);
        let mut statements = Vec::with_capacity(2);
        if drop_before_create {
            statements.push(format!("DROP TABLE IF EXISTS {}", name));
        }

        let definitions: Vec<String> = columns
            .iter()
            .map(|column| self.column_definition(column))
            .collect();
        let mut create = format!(
            "CREATE TABLE {} (\n{}\n) {}",
            name,
            definitions.join(",\n"),
            DEFAULT_ENGINE_CLAUSE
        );
        if let Some(comment) = table.comment.as_deref().filter(|c| !c.is_empty()) {
            create.push_str(" COMMENT ");
            create.push_str(&CLICKHOUSE_LITERALS.quote_string(comment));
        }
        statements.push(create);
        statements
    }

    /// Data-skipping indexes are declared inside the create statement
    fn gen_index_ddl(&self, _table: &Table, _indexes: &[Index]) -> Vec<String> {
        Vec::new()
    }

    fn gen_insert(
        &self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<Value>],
        strategy: DuplicateStrategy,
    ) -> Result<Vec<String>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        if columns.is_empty() {
            return Err(DbmError::Other(format!(
                "cannot insert into {} without columns",
                table
            )));
        }

        let types = columns
            .iter()
            .map(|column| self.resolve_type(column))
            .collect::<Result<Vec<_>>>()?;

        let mut tuples = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(DbmError::Other(format!(
                    "row {} has {} values but {} columns",
                    idx,
                    row.len(),
                    columns.len()
                )));
            }
            let literals: Vec<String> = row
                .iter()
                .zip(&types)
                .map(|(value, ty)| ty.portable.literal(value, &CLICKHOUSE_LITERALS))
                .collect();
            tuples.push(format!("({})", literals.join(", ")));
        }

        let name = CLICKHOUSE_QUOTER.quote_qualified(table);
        let column_list: Vec<String> = columns
            .iter()
            .map(|column| CLICKHOUSE_QUOTER.quote(&column.column_name))
            .collect();
        let insert = format!(
            "INSERT INTO {} ({}) VALUES {}",
            name,
            column_list.join(", "),
            tuples.join(", ")
        );

        match strategy {
            // No conflict clause exists; duplicates collapse only under a
            // Replacing engine
            DuplicateStrategy::None | DuplicateStrategy::Ignore => Ok(vec![insert]),
            DuplicateStrategy::Update => {
                let key_idx = columns
                    .iter()
                    .position(|column| column.is_primary_key)
                    .unwrap_or(0);
                let key_type = types[key_idx];

                let mut seen = HashSet::new();
                let mut keys = Vec::new();
                for row in rows {
                    let value = &row[key_idx];
                    if value.is_null() {
                        continue;
                    }
                    let literal = key_type.portable.literal(value, &CLICKHOUSE_LITERALS);
                    if seen.insert(literal.clone()) {
                        keys.push(literal);
                    }
                }

                if keys.is_empty() {
                    tracing::debug!(table = %table, "no non-null keys, skipping pre-delete");
                    return Ok(vec![insert]);
                }

                tracing::debug!(
                    table = %table,
                    key = %columns[key_idx].column_name,
                    keys = keys.len(),
                    "generating delete-then-insert"
                );
                let delete = format!(
                    "ALTER TABLE {} DELETE WHERE {} IN ({})",
                    name,
                    CLICKHOUSE_QUOTER.quote(&columns[key_idx].column_name),
                    keys.join(", ")
                );
                Ok(vec![delete, insert])
            }
        }
    }

    fn gen_update(
        &self,
        table: &str,
        columns: &[Column],
        values: &[Value],
        filter: &[(Column, Value)],
    ) -> Result<String> {
        let assignments = render_assignments(self, columns, values)?;
        let condition = render_filter(self, filter)?.unwrap_or_else(|| "1 = 1".to_string());
        Ok(format!(
            "ALTER TABLE {} UPDATE {} WHERE {}",
            CLICKHOUSE_QUOTER.quote_qualified(table),
            assignments,
            condition
        ))
    }

    fn gen_delete(&self, table: &str, filter: &[(Column, Value)]) -> Result<String> {
        let condition = render_filter(self, filter)?.unwrap_or_else(|| "1 = 1".to_string());
        Ok(format!(
            "ALTER TABLE {} DELETE WHERE {}",
            CLICKHOUSE_QUOTER.quote_qualified(table),
            condition
        ))
    }

    fn gen_create_database(&self, name: &str) -> String {
        format!("CREATE DATABASE IF NOT EXISTS {}", CLICKHOUSE_QUOTER.quote(name))
    }

    fn gen_drop_database(&self, name: &str) -> String {
        format!("DROP DATABASE IF EXISTS {}", CLICKHOUSE_QUOTER.quote(name))
    }
}
