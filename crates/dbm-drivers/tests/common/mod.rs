//! Common test utilities and mocks

use async_trait::async_trait;
use dbm_core::{Connection, DbmError, QueryResult, Result, StatementResult, Value};
use std::sync::Arc;

/// Mock connection for exercising dialects and metadata providers without a
/// live server.
///
/// Queries whose SQL contains a registered pattern get that pattern's result;
/// patterns registered as failures return a query error instead.
pub struct MockConnection {
    pub driver: String,
    pub database: String,
    /// SQL-pattern-based responses, first match wins
    pub query_responses: Vec<(String, QueryResult)>,
    /// SQL patterns whose queries fail
    pub failing_patterns: Vec<String>,
    /// Log of all SQL sent through `query` and `execute`, with bound params
    pub query_log: Arc<parking_lot::Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockConnection {
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            database: "default".to_string(),
            query_responses: vec![],
            failing_patterns: vec![],
            query_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    /// Register a response for queries containing the given SQL pattern.
    pub fn with_query_response(
        mut self,
        sql_contains: impl Into<String>,
        result: QueryResult,
    ) -> Self {
        self.query_responses.push((sql_contains.into(), result));
        self
    }

    pub fn with_failure(mut self, sql_contains: impl Into<String>) -> Self {
        self.failing_patterns.push(sql_contains.into());
        self
    }

    pub fn query_log(&self) -> Vec<(String, Vec<Value>)> {
        self.query_log.lock().clone()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Result<()> {
        self.query_log.lock().push((sql.to_string(), params.to_vec()));
        if self.failing_patterns.iter().any(|p| sql.contains(p.as_str())) {
            return Err(DbmError::Query(format!("mock failure for: {}", sql)));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.record(sql, params)?;
        Ok(StatementResult::command(0))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.record(sql, params)?;
        for (pattern, result) in &self.query_responses {
            if sql.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }
        Ok(QueryResult::empty())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}

#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
