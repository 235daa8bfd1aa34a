//! ClickHouse bundle for the dialect registry

use std::sync::Arc;

use dbm_core::{
    CommonTypeConverter, Connection, ConnectionProvider, DataTypeTable, DbMeta, Dialect,
    MetadataProvider,
};

use crate::{
    CLICKHOUSE_TYPES, ClickHouseDialect, ClickHouseDriver, ClickHouseMetadata,
    ClickHouseTypeConverter, ENGINE,
};

#[derive(Debug, Default)]
pub struct ClickHouseMeta {
    driver: ClickHouseDriver,
    converter: ClickHouseTypeConverter,
}

impl ClickHouseMeta {
    pub fn new() -> Self {
        Self {
            driver: ClickHouseDriver::new(),
            converter: ClickHouseTypeConverter,
        }
    }
}

impl DbMeta for ClickHouseMeta {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    fn data_types(&self) -> &DataTypeTable {
        &CLICKHOUSE_TYPES
    }

    fn common_type_converter(&self) -> &dyn CommonTypeConverter {
        &self.converter
    }

    fn connection_provider(&self) -> &dyn ConnectionProvider {
        &self.driver
    }

    fn dialect(&self, conn: Arc<dyn Connection>) -> Box<dyn Dialect> {
        Box::new(ClickHouseDialect::new(conn))
    }

    fn metadata(&self, conn: Arc<dyn Connection>) -> Box<dyn MetadataProvider> {
        Box::new(ClickHouseMetadata::new(conn))
    }
}
