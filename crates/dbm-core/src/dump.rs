//! Table dump/export framing

use std::io::Write;

use crate::{Column, DuplicateStrategy, Result, SqlGenerator, Table, Value};

/// Engine-specific framing around the insert section of a dump
pub trait DumpHelper: Send + Sync {
    /// Text written before the inserts for `table`
    fn before_insert(&self, _table: &str) -> String {
        String::new()
    }

    /// Text written after the inserts for `table`
    fn after_insert(&self, _table: &str) -> String {
        String::new()
    }

    fn statement_terminator(&self) -> &str {
        ";"
    }
}

/// No framing, `;` terminated statements
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDumpHelper;

impl DumpHelper for DefaultDumpHelper {}

/// Write one table's structure and rows as an executable SQL script
#[allow(clippy::too_many_arguments)]
pub fn write_table_dump<W: Write>(
    writer: &mut W,
    generator: &dyn SqlGenerator,
    helper: &dyn DumpHelper,
    table: &Table,
    columns: &[Column],
    rows: &[Vec<Value>],
    drop_before_create: bool,
    batch_size: usize,
) -> Result<()> {
    let terminator = helper.statement_terminator();

    writeln!(writer, "-- Table structure for {}", table.table_name)?;
    for statement in generator.gen_table_ddl(table, columns, drop_before_create) {
        writeln!(writer, "{}{}", statement, terminator)?;
    }

    if rows.is_empty() {
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "-- Records of {}", table.table_name)?;
    let before = helper.before_insert(&table.table_name);
    if !before.is_empty() {
        writeln!(writer, "{}", before)?;
    }
    for chunk in rows.chunks(batch_size.max(1)) {
        for statement in
            generator.gen_insert(&table.table_name, columns, chunk, DuplicateStrategy::None)?
        {
            writeln!(writer, "{}{}", statement, terminator)?;
        }
    }
    let after = helper.after_insert(&table.table_name);
    if !after.is_empty() {
        writeln!(writer, "{}", after)?;
    }
    Ok(())
}
