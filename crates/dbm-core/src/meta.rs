//! Per-engine bundle handed to the dialect registry

use std::sync::Arc;

use crate::{CommonTypeConverter, Connection, ConnectionProvider, DataTypeTable, Dialect, MetadataProvider};

/// Everything one engine contributes: its type table, converter, transport and
/// the factories for connection-bound dialects and metadata providers
pub trait DbMeta: Send + Sync {
    /// Engine identifier the bundle registers under (e.g., "clickhouse")
    fn engine(&self) -> &'static str;

    fn data_types(&self) -> &DataTypeTable;

    fn common_type_converter(&self) -> &dyn CommonTypeConverter;

    fn connection_provider(&self) -> &dyn ConnectionProvider;

    fn dialect(&self, conn: Arc<dyn Connection>) -> Box<dyn Dialect>;

    fn metadata(&self, conn: Arc<dyn Connection>) -> Box<dyn MetadataProvider>;
}
