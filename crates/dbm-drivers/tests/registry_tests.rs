//! Dialect registry tests
//!
//! Exercise the registry and the engines it hands out against an in-memory
//! connection; no database server is needed.

mod common;

use std::sync::Arc;

use common::{MockConnection, init_tracing};
use dbm_core::{CommonKind, QueryResult};
use dbm_drivers::{
    Column, Connection, DbmError, DialectRegistry, DuplicateStrategy, Table, Value,
};

fn mock_connection() -> Arc<dyn Connection> {
    Arc::new(MockConnection::new("clickhouse"))
}

mod registration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fresh_registry_is_empty() {
        let registry = DialectRegistry::new();
        assert!(registry.engines().is_empty());
        assert!(!registry.has("clickhouse"));
        assert!(matches!(
            registry.lookup("clickhouse"),
            Err(DbmError::NotFound(_))
        ));
    }

    #[test]
    fn test_defaults_register_clickhouse() {
        init_tracing();
        let registry = DialectRegistry::with_defaults().unwrap();
        assert_eq!(registry.engines(), vec!["clickhouse"]);
        assert!(registry.has("clickhouse"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = DialectRegistry::with_defaults().unwrap();

        let err = registry
            .register(Arc::new(dbm_drivers::clickhouse::ClickHouseMeta::new()))
            .unwrap_err();

        match err {
            DbmError::DuplicateRegistration(engine) => assert_eq!(engine, "clickhouse"),
            other => panic!("expected DuplicateRegistration, got {:?}", other),
        }
        assert_eq!(registry.engines().len(), 1);
    }

    #[test]
    fn test_unknown_engine_is_not_found() {
        let registry = DialectRegistry::with_defaults().unwrap();
        assert!(matches!(
            registry.get_dialect("oracle", mock_connection()),
            Err(DbmError::NotFound(_))
        ));
        assert!(matches!(
            registry.get_metadata("oracle", mock_connection()),
            Err(DbmError::NotFound(_))
        ));
    }

    #[test]
    fn test_debug_lists_engines() {
        let registry = DialectRegistry::with_defaults().unwrap();
        assert!(format!("{:?}", registry).contains("clickhouse"));
    }
}

mod round_trip_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_engine_yields_its_capabilities() {
        let registry = DialectRegistry::with_defaults().unwrap();
        for engine in registry.engines() {
            let meta = registry.lookup(engine).unwrap();
            assert_eq!(meta.engine(), engine);
            assert_eq!(meta.connection_provider().engine(), engine);

            let dialect = registry.get_dialect(engine, mock_connection()).unwrap();
            assert_eq!(dialect.engine(), engine);

            let metadata = registry.get_metadata(engine, mock_connection()).unwrap();
            assert!(!metadata.get_default_db().is_empty());
        }
    }

    #[test]
    fn test_every_converter_is_total() {
        let registry = DialectRegistry::with_defaults().unwrap();
        for engine in registry.engines() {
            let meta = registry.lookup(engine).unwrap();
            for kind in CommonKind::ALL {
                let native = meta.common_type_converter().native_type(kind);
                assert!(
                    meta.data_types().get(native.native_name).is_some(),
                    "{}: {:?} maps outside the type table",
                    engine,
                    kind
                );
            }
        }
    }

    #[tokio::test]
    async fn test_registry_is_shareable_across_tasks() {
        let registry = Arc::new(DialectRegistry::with_defaults().unwrap());

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let dialect = registry.get_dialect("clickhouse", mock_connection())?;
                    dialect.sql_generator().gen_insert(
                        &format!("t{}", i),
                        &[Column::new("t", "id", "UInt8")],
                        &[vec![Value::Int32(i)]],
                        DuplicateStrategy::None,
                    )
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let statements = handle.await.unwrap().unwrap();
            assert_eq!(
                statements,
                vec![format!("INSERT INTO `t{}` (`id`) VALUES ({})", i, i)]
            );
        }
    }
}

mod end_to_end_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ddl_through_registry() {
        let registry = DialectRegistry::with_defaults().unwrap();
        let dialect = registry.get_dialect("clickhouse", mock_connection()).unwrap();
        let columns = vec![
            Column::new("t1", "id", "Int32").primary_key(),
            Column::new("t1", "name", "String").nullable(),
        ];

        let statements = dialect
            .sql_generator()
            .gen_table_ddl(&Table::new("t1"), &columns, true);

        assert_eq!(
            statements,
            vec![
                "DROP TABLE IF EXISTS `t1`".to_string(),
                "CREATE TABLE `t1` (\n  `id` Int32,\n  `name` Nullable(String)\n) ENGINE = MergeTree() ORDER BY tuple()"
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_introspect_then_regenerate() {
        init_tracing();
        let mock = MockConnection::new("clickhouse").with_query_response(
            "FROM system.columns",
            QueryResult::from_rows(
                &["name", "type", "comment", "is_in_primary_key", "default_expression"],
                vec![
                    vec![
                        Value::from("id"),
                        Value::from("UInt64"),
                        Value::Null,
                        Value::from("1"),
                        Value::Null,
                    ],
                    vec![
                        Value::from("label"),
                        Value::from("LowCardinality(Nullable(String))"),
                        Value::from("it's"),
                        Value::from("0"),
                        Value::Null,
                    ],
                ],
            ),
        );
        let conn: Arc<dyn Connection> = Arc::new(mock);
        let registry = DialectRegistry::with_defaults().unwrap();
        let metadata = registry.get_metadata("clickhouse", Arc::clone(&conn)).unwrap();
        let dialect = registry.get_dialect("clickhouse", conn).unwrap();

        let columns = metadata.get_columns(&["labels"]).await.unwrap();
        let statements =
            dialect
                .sql_generator()
                .gen_table_ddl(&Table::new("labels_copy"), &columns, false);

        assert_eq!(
            statements,
            vec![
                "CREATE TABLE `labels_copy` (\n  `id` UInt64,\n  `label` Nullable(String) COMMENT 'it''s'\n) ENGINE = MergeTree() ORDER BY tuple()"
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_index_catalog_failure_through_registry() {
        let mock = MockConnection::new("clickhouse").with_failure("data_skipping_indices");
        let log = Arc::clone(&mock.query_log);
        let registry = DialectRegistry::with_defaults().unwrap();
        let metadata = registry.get_metadata("clickhouse", Arc::new(mock)).unwrap();

        let indexes = metadata.get_table_index("events").await.unwrap();

        assert!(indexes.is_empty());
        assert_eq!(log.lock().len(), 1);
    }
}
