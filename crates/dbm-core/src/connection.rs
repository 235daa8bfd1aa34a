//! Connection traits consumed by dialects and metadata providers

use crate::{ConnectionConfig, QueryResult, Result, StatementResult, Value};
use async_trait::async_trait;
use std::sync::Arc;

/// A query-capable database handle.
///
/// Parameters are positional and bound to `?` placeholders in the SQL text.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "clickhouse")
    fn driver_name(&self) -> &str;

    /// The namespace (database) this handle was opened against
    fn database(&self) -> &str;

    /// Execute a statement that does not return rows (DDL, INSERT, mutations)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Execute generated statements in order on this handle.
    ///
    /// Stops at the first failure; statements after it are not sent.
    /// Returns the sum of reported affected rows.
    async fn execute_batch(&self, statements: &[String]) -> Result<u64> {
        let mut affected = 0;
        for (idx, sql) in statements.iter().enumerate() {
            tracing::debug!(statement = idx, "executing batch statement");
            affected += self.execute(sql, &[]).await?.affected_rows;
        }
        Ok(affected)
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}

/// Opens physical connections for one engine
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Engine identifier this provider connects to
    fn engine(&self) -> &'static str;

    /// Default port, if the engine has one
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Open a connection, failing with [`crate::DbmError::Connection`] when
    /// the engine is unreachable or rejects the credentials
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Open a connection and run a trivial probe against it
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        let conn = self.connect(config).await?;
        conn.query("SELECT 1", &[]).await?;
        conn.close().await
    }

    /// Build the connection string this provider would dial
    fn build_connection_string(&self, config: &ConnectionConfig) -> String;
}
