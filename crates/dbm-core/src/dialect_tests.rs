//! Unit tests for quoting, default generator statements, parsing and dumps

use super::*;
use indoc::indoc;

static INT: EngineDataType = EngineDataType::new("INT", PortableType::Int4, CommonKind::Int4);
static TEXT: EngineDataType = EngineDataType::new("TEXT", PortableType::String, CommonKind::Text);

const ANSI_QUOTER: Quoter = Quoter::new('"', '"', ReservePolicy::AlwaysReserve);

/// Minimal generator that relies on every provided default
struct AnsiGenerator {
    types: DataTypeTable,
}

impl AnsiGenerator {
    fn new() -> Self {
        Self {
            types: DataTypeTable::new("ansi", &[&INT, &TEXT]),
        }
    }
}

impl SqlGenerator for AnsiGenerator {
    fn quoter(&self) -> &Quoter {
        &ANSI_QUOTER
    }

    fn literal_style(&self) -> &LiteralStyle {
        &LiteralStyle::ANSI
    }

    fn data_types(&self) -> &DataTypeTable {
        &self.types
    }

    fn gen_table_ddl(&self, table: &Table, columns: &[Column], _drop: bool) -> Vec<String> {
        let defs: Vec<String> = columns
            .iter()
            .map(|c| format!("{} {}", self.quoter().quote(&c.column_name), c.data_type))
            .collect();
        vec![format!(
            "CREATE TABLE {} ({})",
            self.quoter().quote(&table.table_name),
            defs.join(", ")
        )]
    }

    fn gen_index_ddl(&self, _table: &Table, _indexes: &[Index]) -> Vec<String> {
        Vec::new()
    }

    fn gen_insert(
        &self,
        table: &str,
        columns: &[Column],
        rows: &[Vec<Value>],
        _strategy: DuplicateStrategy,
    ) -> Result<Vec<String>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let mut tuples = Vec::new();
        for row in rows {
            let values = columns
                .iter()
                .zip(row)
                .map(|(c, v)| self.literal(c, v))
                .collect::<Result<Vec<_>>>()?;
            tuples.push(format!("({})", values.join(", ")));
        }
        Ok(vec![format!(
            "INSERT INTO {} VALUES {}",
            self.quoter().quote(table),
            tuples.join(", ")
        )])
    }
}

fn columns() -> Vec<Column> {
    vec![
        Column::new("t", "id", "INT").primary_key(),
        Column::new("t", "name", "TEXT"),
    ]
}

mod quoter_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_always_reserve_quotes_everything() {
        let quoter = Quoter::new('`', '`', ReservePolicy::AlwaysReserve);
        assert_eq!(quoter.quote("id"), "`id`");
        assert_eq!(quoter.quote("select"), "`select`");
    }

    #[test]
    fn test_quote_is_idempotent() {
        let quoter = Quoter::new('`', '`', ReservePolicy::AlwaysReserve);
        let once = quoter.quote("events");
        assert_eq!(quoter.quote(&once), once);

        let escaped = quoter.quote("a`b");
        assert_eq!(escaped, "`a``b`");
        assert_eq!(quoter.quote(&escaped), escaped);
    }

    #[test]
    fn test_partially_wrapped_identifier_is_escaped() {
        let quoter = Quoter::new('`', '`', ReservePolicy::AlwaysReserve);
        assert!(!quoter.is_quoted("`a`b`"));
        assert_eq!(quoter.quote("`a`b`"), "```a``b```");
    }

    #[test]
    fn test_bracket_pair_escapes_closing_char() {
        let quoter = Quoter::new('[', ']', ReservePolicy::AlwaysReserve);
        assert_eq!(quoter.quote("my]table"), "[my]]table]");
        assert_eq!(quoter.quote("[users]"), "[users]");
    }

    #[test]
    fn test_backslash_escapes() {
        let quoter = Quoter::new('`', '`', ReservePolicy::AlwaysReserve).with_backslash_escapes();
        assert_eq!(quoter.quote("a\\b"), "`a\\\\b`");
        let plain = Quoter::new('`', '`', ReservePolicy::AlwaysReserve);
        assert_eq!(plain.quote("a\\b"), "`a\\b`");
    }

    #[test]
    fn test_keyword_policy() {
        let quoter = Quoter::new('"', '"', ReservePolicy::Keywords(&["SELECT", "ORDER"]));
        assert_eq!(quoter.quote("users"), "users");
        assert_eq!(quoter.quote("order"), "\"order\"");
        assert_eq!(quoter.quote("first name"), "\"first name\"");
        assert_eq!(quoter.quote("1col"), "\"1col\"");
        assert_eq!(quoter.quote(""), "\"\"");
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(ANSI_QUOTER.quote_qualified("db.users"), "\"db\".\"users\"");
        assert_eq!(ANSI_QUOTER.quote_qualified("\"a.b\""), "\"a.b\"");
    }

    #[test]
    fn test_quote_qualified_keeps_dots_inside_quoted_segments() {
        let backtick = Quoter::new('`', '`', ReservePolicy::AlwaysReserve).with_backslash_escapes();
        assert_eq!(backtick.quote_qualified("`db`.`a.b`"), "`db`.`a.b`");
        assert_eq!(backtick.quote_qualified("db.`a.b`"), "`db`.`a.b`");
        assert_eq!(backtick.quote_qualified("`x``.y`.t"), "`x``.y`.`t`");
        assert_eq!(
            ANSI_QUOTER.quote_qualified("\"s.1\".\"t.2\""),
            "\"s.1\".\"t.2\""
        );
    }
}

mod duplicate_strategy_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_none() {
        assert_eq!(DuplicateStrategy::default(), DuplicateStrategy::None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&DuplicateStrategy::Update).unwrap(),
            "\"update\""
        );
        let parsed: DuplicateStrategy = serde_json::from_str("\"ignore\"").unwrap();
        assert_eq!(parsed, DuplicateStrategy::Ignore);
    }
}

mod default_generator_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_gen_update_with_filter() {
        let generator = AnsiGenerator::new();
        let cols = columns();
        let sql = generator
            .gen_update(
                "t",
                &cols[1..],
                &[Value::from("it's")],
                &[(cols[0].clone(), Value::Int32(7))],
            )
            .unwrap();
        assert_eq!(sql, "UPDATE \"t\" SET \"name\" = 'it''s' WHERE \"id\" = 7");
    }

    #[test]
    fn test_gen_update_width_mismatch() {
        let generator = AnsiGenerator::new();
        let result = generator.gen_update("t", &columns(), &[Value::Int32(1)], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_gen_delete_null_filter_and_all_rows() {
        let generator = AnsiGenerator::new();
        let cols = columns();
        assert_eq!(
            generator
                .gen_delete("t", &[(cols[1].clone(), Value::Null)])
                .unwrap(),
            "DELETE FROM \"t\" WHERE \"name\" IS NULL"
        );
        assert_eq!(generator.gen_delete("t", &[]).unwrap(), "DELETE FROM \"t\"");
    }

    #[test]
    fn test_literal_unknown_type_is_mapping_gap() {
        let generator = AnsiGenerator::new();
        let column = Column::new("t", "g", "GEOMETRY");
        assert!(matches!(
            generator.literal(&column, &Value::Int32(1)),
            Err(DbmError::UnknownDataType { .. })
        ));
    }

    #[test]
    fn test_database_statements() {
        let generator = AnsiGenerator::new();
        assert_eq!(generator.gen_create_database("app"), "CREATE DATABASE \"app\"");
        assert_eq!(generator.gen_drop_database("app"), "DROP DATABASE \"app\"");
    }
}

mod parser_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_statements() {
        let parser = SqlParser::generic();
        let statements = parser
            .split_statements("SELECT 1; INSERT INTO t (a) VALUES (2);")
            .unwrap();
        assert_eq!(statements, vec!["SELECT 1", "INSERT INTO t (a) VALUES (2)"]);
    }

    #[test]
    fn test_is_read_only() {
        let parser = SqlParser::generic();
        assert!(parser.is_read_only("SELECT * FROM t; SELECT 2").unwrap());
        assert!(!parser.is_read_only("SELECT 1; DELETE FROM t").unwrap());
        assert!(!parser.is_read_only("").unwrap());
    }

    #[test]
    fn test_parse_error_is_query_error() {
        let parser = SqlParser::generic();
        assert!(matches!(parser.parse("SELEC 1"), Err(DbmError::Query(_))));
    }

    #[test]
    fn test_parse_expression_accepts_one_expression() {
        let parser = SqlParser::generic();
        assert_eq!(parser.parse_expression("now()").unwrap().to_string(), "now()");
        assert_eq!(parser.parse_expression("1 + 2").unwrap().to_string(), "1 + 2");
    }

    #[test]
    fn test_parse_expression_rejects_trailing_sql() {
        let parser = SqlParser::generic();
        assert!(matches!(
            parser.parse_expression("'x'); DROP TABLE t; --"),
            Err(DbmError::Query(_))
        ));
        assert!(parser.parse_expression("1; SELECT 2").is_err());
        assert!(parser.parse_expression("").is_err());
    }
}

mod dump_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_table_dump_batches_inserts() {
        let generator = AnsiGenerator::new();
        let rows = vec![
            vec![Value::Int32(1), Value::from("a")],
            vec![Value::Int32(2), Value::Null],
            vec![Value::Int32(3), Value::from("c")],
        ];
        let mut out = Vec::new();
        write_table_dump(
            &mut out,
            &generator,
            &DefaultDumpHelper,
            &Table::new("t"),
            &columns(),
            &rows,
            false,
            2,
        )
        .unwrap();

        let expected = indoc! {r#"
            -- Table structure for t
            CREATE TABLE "t" ("id" INT, "name" TEXT);

            -- Records of t
            INSERT INTO "t" VALUES (1, 'a'), (2, NULL);
            INSERT INTO "t" VALUES (3, 'c');
        "#};
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_write_table_dump_without_rows() {
        let generator = AnsiGenerator::new();
        let mut out = Vec::new();
        write_table_dump(
            &mut out,
            &generator,
            &DefaultDumpHelper,
            &Table::new("t"),
            &columns(),
            &[],
            false,
            100,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-- Table structure for t\nCREATE TABLE \"t\" (\"id\" INT, \"name\" TEXT);\n"
        );
    }
}
