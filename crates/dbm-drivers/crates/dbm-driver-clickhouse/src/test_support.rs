//! In-memory connection for exercising generated catalog queries

use std::sync::Arc;

use async_trait::async_trait;
use dbm_core::{Connection, DbmError, QueryResult, Result, StatementResult, Value};
use parking_lot::Mutex;

/// Connection double that answers by substring match on the SQL text and
/// records every statement with its bound parameters
pub struct MockConnection {
    responses: Vec<(&'static str, QueryResult)>,
    failing_patterns: Vec<&'static str>,
    log: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            failing_patterns: Vec::new(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer statements containing `pattern` with `rows` under `columns`
    pub fn with_rows(mut self, pattern: &'static str, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        self.responses
            .push((pattern, QueryResult::from_rows(columns, rows)));
        self
    }

    /// Fail statements containing `pattern`
    pub fn with_failure(mut self, pattern: &'static str) -> Self {
        self.failing_patterns.push(pattern);
        self
    }

    /// Handle on the statement log that stays valid after the mock is shared
    pub fn log(&self) -> Arc<Mutex<Vec<(String, Vec<Value>)>>> {
        Arc::clone(&self.log)
    }

    fn record(&self, sql: &str, params: &[Value]) -> Result<()> {
        self.log.lock().push((sql.to_string(), params.to_vec()));
        if let Some(pattern) = self.failing_patterns.iter().find(|p| sql.contains(*p)) {
            return Err(DbmError::Query(format!("mock failure for '{}'", pattern)));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    fn database(&self) -> &str {
        "default"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.record(sql, params)?;
        Ok(StatementResult::command(0))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.record(sql, params)?;
        Ok(self
            .responses
            .iter()
            .find(|(pattern, _)| sql.contains(pattern))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(QueryResult::empty))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }
}
