//! ClickHouse dialect bound to a live connection

use std::sync::Arc;

use async_trait::async_trait;
use dbm_core::{
    Connection, CopyTable, DefaultDumpHelper, Dialect, DumpHelper, LiteralStyle, Quoter,
    ReservePolicy, Result, SqlGenerator, SqlParser,
};
use sqlparser::dialect::ClickHouseDialect as ClickHouseGrammar;

use crate::{ClickHouseSqlGenerator, ENGINE};

/// Backtick quoting on every identifier; backslash escapes inside quotes
pub const CLICKHOUSE_QUOTER: Quoter =
    Quoter::new('`', '`', ReservePolicy::AlwaysReserve).with_backslash_escapes();

pub const CLICKHOUSE_LITERALS: LiteralStyle = LiteralStyle {
    bool_true: "1",
    bool_false: "0",
    backslash_escapes: true,
    nan: "nan",
    infinity: "inf",
    neg_infinity: "-inf",
};

/// Rows per generated insert during bulk loads. ClickHouse prefers few large
/// inserts over many small ones.
const TRANSFER_BATCH_SIZE: usize = 10_000;

pub struct ClickHouseDialect {
    conn: Arc<dyn Connection>,
    generator: ClickHouseSqlGenerator,
    dump_helper: DefaultDumpHelper,
    parser: SqlParser,
}

impl ClickHouseDialect {
    pub fn new(conn: Arc<dyn Connection>) -> Self {
        Self {
            conn,
            generator: ClickHouseSqlGenerator::new(),
            dump_helper: DefaultDumpHelper,
            parser: SqlParser::new(ClickHouseGrammar {}),
        }
    }

    /// The concrete generator, for the ClickHouse-only statements it offers
    pub fn generator(&self) -> &ClickHouseSqlGenerator {
        &self.generator
    }
}

#[async_trait]
impl Dialect for ClickHouseDialect {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    fn quoter(&self) -> &Quoter {
        &CLICKHOUSE_QUOTER
    }

    fn sql_generator(&self) -> &dyn SqlGenerator {
        &self.generator
    }

    fn dump_helper(&self) -> &dyn DumpHelper {
        &self.dump_helper
    }

    fn sql_parser(&self) -> &SqlParser {
        &self.parser
    }

    #[tracing::instrument(skip(self, copy), fields(table = %copy.table_name, new_table = %copy.new_table_name))]
    async fn copy_table(&self, copy: &CopyTable) -> Result<()> {
        let source = CLICKHOUSE_QUOTER.quote_qualified(&copy.table_name);
        let target = CLICKHOUSE_QUOTER.quote_qualified(&copy.new_table_name);

        let mut statements = vec![format!("CREATE TABLE {} AS {}", target, source)];
        if copy.copy_data {
            statements.push(format!("INSERT INTO {} SELECT * FROM {}", target, source));
        }

        self.conn.execute_batch(&statements).await?;
        tracing::debug!(copy_data = copy.copy_data, "table copied");
        Ok(())
    }

    fn recommended_batch_size(&self) -> usize {
        TRANSFER_BATCH_SIZE
    }

    /// Merge the freshly loaded parts so duplicates collapse immediately
    fn post_transfer_sql(&self, table: &str) -> Vec<String> {
        vec![format!(
            "OPTIMIZE TABLE {} FINAL",
            CLICKHOUSE_QUOTER.quote_qualified(table)
        )]
    }
}

impl std::fmt::Debug for ClickHouseDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseDialect")
            .field("database", &self.conn.database())
            .finish()
    }
}
