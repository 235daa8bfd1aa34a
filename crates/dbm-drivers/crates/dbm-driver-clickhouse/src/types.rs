//! ClickHouse native types and common-type conversion rules

use std::sync::LazyLock;

use dbm_core::{CommonKind, CommonTypeConverter, DataTypeTable, EngineDataType, PortableType};

use crate::ENGINE;

// Integers
pub static UINT8: EngineDataType = EngineDataType::new("UInt8", PortableType::Int1, CommonKind::UnsignedInt1);
pub static UINT16: EngineDataType = EngineDataType::new("UInt16", PortableType::Int2, CommonKind::UnsignedInt2);
pub static UINT32: EngineDataType = EngineDataType::new("UInt32", PortableType::Int4, CommonKind::UnsignedInt4);
pub static UINT64: EngineDataType = EngineDataType::new("UInt64", PortableType::Int8, CommonKind::UnsignedInt8);
pub static INT8: EngineDataType = EngineDataType::new("Int8", PortableType::Int1, CommonKind::Int1);
pub static INT16: EngineDataType = EngineDataType::new("Int16", PortableType::Int2, CommonKind::Int2);
pub static INT32: EngineDataType = EngineDataType::new("Int32", PortableType::Int4, CommonKind::Int4);
pub static INT64: EngineDataType = EngineDataType::new("Int64", PortableType::Int8, CommonKind::Int8);

pub static FLOAT32: EngineDataType =
    EngineDataType::new("Float32", PortableType::Numeric, CommonKind::Numeric);
pub static FLOAT64: EngineDataType =
    EngineDataType::new("Float64", PortableType::Numeric, CommonKind::Numeric);

// Strings
pub static STRING: EngineDataType =
    EngineDataType::new("String", PortableType::String, CommonKind::Varchar);
pub static FIXED_STRING: EngineDataType =
    EngineDataType::new("FixedString", PortableType::String, CommonKind::Char);

// Date and time
pub static DATE_TIME: EngineDataType =
    EngineDataType::new("DateTime", PortableType::DateTime, CommonKind::Datetime);
pub static DATE_TIME64: EngineDataType =
    EngineDataType::new("DateTime64", PortableType::DateTime, CommonKind::Datetime);
pub static DATE: EngineDataType = EngineDataType::new("Date", PortableType::Date, CommonKind::Date);
pub static DATE32: EngineDataType = EngineDataType::new("Date32", PortableType::Date, CommonKind::Date);

pub static UUID: EngineDataType = EngineDataType::new("UUID", PortableType::String, CommonKind::Varchar);
pub static IPV4: EngineDataType = EngineDataType::new("IPv4", PortableType::String, CommonKind::Varchar);
pub static IPV6: EngineDataType = EngineDataType::new("IPv6", PortableType::String, CommonKind::Varchar);
pub static BOOL: EngineDataType = EngineDataType::new("Bool", PortableType::Bool, CommonKind::Bool);

// Decimals
pub static DECIMAL: EngineDataType =
    EngineDataType::new("Decimal", PortableType::Decimal, CommonKind::Decimal);
pub static DECIMAL32: EngineDataType =
    EngineDataType::new("Decimal32", PortableType::Decimal, CommonKind::Decimal);
pub static DECIMAL64: EngineDataType =
    EngineDataType::new("Decimal64", PortableType::Decimal, CommonKind::Decimal);
pub static DECIMAL128: EngineDataType =
    EngineDataType::new("Decimal128", PortableType::Decimal, CommonKind::Decimal);
pub static DECIMAL256: EngineDataType =
    EngineDataType::new("Decimal256", PortableType::Decimal, CommonKind::Decimal);

pub static ENUM8: EngineDataType = EngineDataType::new("Enum8", PortableType::String, CommonKind::Enum);
pub static ENUM16: EngineDataType = EngineDataType::new("Enum16", PortableType::String, CommonKind::Enum);

// Composite types collapse to String; their structure does not survive a
// cross-engine transfer
pub static ARRAY: EngineDataType = EngineDataType::new("Array", PortableType::String, CommonKind::Varchar);
pub static TUPLE: EngineDataType = EngineDataType::new("Tuple", PortableType::String, CommonKind::Varchar);
pub static MAP: EngineDataType = EngineDataType::new("Map", PortableType::String, CommonKind::Varchar);
pub static NESTED: EngineDataType =
    EngineDataType::new("Nested", PortableType::String, CommonKind::Varchar);
pub static AGGREGATE_FUNCTION: EngineDataType =
    EngineDataType::new("AggregateFunction", PortableType::String, CommonKind::Varchar);
pub static SIMPLE_AGGREGATE_FUNCTION: EngineDataType =
    EngineDataType::new("SimpleAggregateFunction", PortableType::String, CommonKind::Varchar);
pub static LOW_CARDINALITY: EngineDataType =
    EngineDataType::new("LowCardinality", PortableType::String, CommonKind::Varchar);
pub static NULLABLE: EngineDataType =
    EngineDataType::new("Nullable", PortableType::String, CommonKind::Varchar);

/// Every ClickHouse type this adapter knows, by native name
pub static CLICKHOUSE_TYPES: LazyLock<DataTypeTable> = LazyLock::new(|| {
    DataTypeTable::new(
        ENGINE,
        &[
            &UINT8,
            &UINT16,
            &UINT32,
            &UINT64,
            &INT8,
            &INT16,
            &INT32,
            &INT64,
            &FLOAT32,
            &FLOAT64,
            &STRING,
            &FIXED_STRING,
            &DATE_TIME,
            &DATE_TIME64,
            &DATE,
            &DATE32,
            &UUID,
            &IPV4,
            &IPV6,
            &BOOL,
            &DECIMAL,
            &DECIMAL32,
            &DECIMAL64,
            &DECIMAL128,
            &DECIMAL256,
            &ENUM8,
            &ENUM16,
            &ARRAY,
            &TUPLE,
            &MAP,
            &NESTED,
            &AGGREGATE_FUNCTION,
            &SIMPLE_AGGREGATE_FUNCTION,
            &LOW_CARDINALITY,
            &NULLABLE,
        ],
    )
});

/// Places generic logical kinds onto ClickHouse types
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickHouseTypeConverter;

impl CommonTypeConverter for ClickHouseTypeConverter {
    fn native_type(&self, kind: CommonKind) -> &'static EngineDataType {
        match kind {
            CommonKind::Varchar | CommonKind::Text | CommonKind::Mediumtext | CommonKind::Longtext => {
                &STRING
            }
            CommonKind::Char => &FIXED_STRING,
            CommonKind::Int1 => &INT8,
            CommonKind::Int2 => &INT16,
            CommonKind::Int4 => &INT32,
            CommonKind::Int8 => &INT64,
            CommonKind::UnsignedInt1 => &UINT8,
            CommonKind::UnsignedInt2 => &UINT16,
            CommonKind::UnsignedInt4 => &UINT32,
            CommonKind::UnsignedInt8 => &UINT64,
            CommonKind::Decimal => &DECIMAL,
            CommonKind::Numeric => &FLOAT64,
            CommonKind::Bit => &UINT8,
            CommonKind::Bool => &BOOL,
            CommonKind::Date => &DATE,
            CommonKind::Time | CommonKind::Datetime | CommonKind::Timestamp => &DATE_TIME,
            CommonKind::Binary
            | CommonKind::Varbinary
            | CommonKind::Blob
            | CommonKind::Mediumblob
            | CommonKind::Longblob
            | CommonKind::Json => &STRING,
            // Enum8 needs its value list, which a logical kind does not carry
            CommonKind::Enum => &STRING,
        }
    }
}
