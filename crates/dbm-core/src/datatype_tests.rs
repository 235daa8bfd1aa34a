//! Unit tests for data type tables and column conversion

use super::*;

static SRC_INT: EngineDataType = EngineDataType::new("INT", PortableType::Int4, CommonKind::Int4);
static SRC_VARCHAR: EngineDataType =
    EngineDataType::new("VARCHAR", PortableType::String, CommonKind::Varchar);
static SRC_DECIMAL: EngineDataType =
    EngineDataType::new("DECIMAL", PortableType::Decimal, CommonKind::Decimal);
static SRC_DUPLICATE: EngineDataType =
    EngineDataType::new("INT", PortableType::Int8, CommonKind::Int8);

static DST_INT32: EngineDataType = EngineDataType::new("Int32", PortableType::Int4, CommonKind::Int4);
static DST_STRING: EngineDataType =
    EngineDataType::new("String", PortableType::String, CommonKind::Varchar);
static DST_DECIMAL: EngineDataType =
    EngineDataType::new("Decimal", PortableType::Decimal, CommonKind::Decimal);

fn source_table() -> DataTypeTable {
    DataTypeTable::new("src", &[&SRC_INT, &SRC_VARCHAR, &SRC_DECIMAL, &SRC_DUPLICATE])
}

struct TargetConverter;

impl CommonTypeConverter for TargetConverter {
    fn native_type(&self, kind: CommonKind) -> &'static EngineDataType {
        match kind {
            CommonKind::Int1 | CommonKind::Int2 | CommonKind::Int4 | CommonKind::Int8 => &DST_INT32,
            CommonKind::Decimal => &DST_DECIMAL,
            _ => &DST_STRING,
        }
    }
}

mod table_lookup_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_is_exact_and_case_sensitive() {
        let table = source_table();
        assert_eq!(table.get("INT"), Some(&SRC_INT));
        assert_eq!(table.get("int"), None);
        assert_eq!(table.get("INT "), None);
    }

    #[test]
    fn test_duplicate_names_keep_first_entry() {
        let table = source_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("INT").map(|t| t.portable), Some(PortableType::Int4));
    }

    #[test]
    fn test_duplicate_names_agree_across_accessors() {
        let table = source_table();
        let listed = table.iter().find(|t| t.native_name == "INT");
        assert_eq!(listed, table.get("INT"));
        assert_eq!(table.lookup("INT").unwrap(), &SRC_INT);
        assert_eq!(table.by_portable(PortableType::Int8), Vec::<&EngineDataType>::new());
    }

    #[test]
    fn test_lookup_miss_is_mapping_gap() {
        let table = source_table();
        match table.lookup("GEOMETRY") {
            Err(DbmError::UnknownDataType { engine, name }) => {
                assert_eq!(engine, "src");
                assert_eq!(name, "GEOMETRY");
            }
            other => panic!("expected UnknownDataType, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_strips_parameters() {
        let table = source_table();
        assert_eq!(table.resolve("DECIMAL(10, 2)").unwrap(), &SRC_DECIMAL);
        assert_eq!(table.resolve("VARCHAR(255)").unwrap(), &SRC_VARCHAR);
        assert_eq!(table.resolve("INT").unwrap(), &SRC_INT);
        assert!(table.resolve("BLOB(16)").is_err());
    }

    #[test]
    fn test_by_portable_and_iter() {
        let table = source_table();
        assert_eq!(table.by_portable(PortableType::String), vec![&SRC_VARCHAR]);
        assert!(table.by_portable(PortableType::Bool).is_empty());
        let names: Vec<_> = table.iter().map(|t| t.native_name).collect();
        assert_eq!(names, vec!["INT", "VARCHAR", "DECIMAL"]);
        assert!(!table.is_empty());
        assert_eq!(table.engine(), "src");
    }
}

mod convert_columns_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_columns_retypes_and_keeps_flags() {
        let columns = vec![
            Column::new("users", "id", "INT").primary_key(),
            Column::new("users", "name", "VARCHAR(64)")
                .nullable()
                .with_comment("display name"),
            Column::new("users", "balance", "DECIMAL(12,2)"),
        ];

        let converted = convert_columns(&source_table(), &TargetConverter, &columns).unwrap();

        let types: Vec<_> = converted.iter().map(|c| c.data_type.as_str()).collect();
        assert_eq!(types, vec!["Int32", "String", "Decimal(12,2)"]);
        assert!(converted[0].is_primary_key);
        assert!(converted[1].nullable);
        assert_eq!(converted[1].comment.as_deref(), Some("display name"));
    }

    #[test]
    fn test_convert_columns_unknown_source_type_fails() {
        let columns = vec![Column::new("users", "shape", "GEOMETRY")];
        let err = convert_columns(&source_table(), &TargetConverter, &columns).unwrap_err();
        assert!(matches!(err, DbmError::UnknownDataType { .. }));
    }
}
