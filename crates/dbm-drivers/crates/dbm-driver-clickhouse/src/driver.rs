//! ClickHouse connection provider over the HTTP interface

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use clickhouse::query::Query;
use dbm_core::{
    ColumnMeta, Connection, ConnectionConfig, ConnectionProvider, DbmError, QueryResult, Result,
    Row, StatementResult, Value,
};

use crate::ENGINE;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 8123;
const DEFAULT_DATABASE: &str = "default";
const DEFAULT_USER: &str = "default";

/// Config keys consumed by the provider itself rather than sent to the server
/// as settings
const RESERVED_PARAMS: &[&str] = &["host", "ssl", "database", "username", "user", "password"];

/// Opens HTTP connections to a ClickHouse server
#[derive(Debug, Default)]
pub struct ClickHouseDriver;

impl ClickHouseDriver {
    pub fn new() -> Self {
        tracing::debug!("ClickHouse driver initialized");
        Self
    }
}

/// Resolved endpoint and credentials, with defaults applied
struct Endpoint {
    host: String,
    port: u16,
    database: String,
    username: String,
    password: String,
    use_ssl: bool,
}

impl Endpoint {
    fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            host: config
                .get_string("host")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: if config.port > 0 {
                config.port
            } else {
                DEFAULT_PORT
            },
            database: config
                .database
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            username: config
                .username
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: config.password.clone().unwrap_or_default(),
            use_ssl: config.get_flag("ssl"),
        }
    }

    /// Server URL without credentials, as handed to the client
    fn server_url(&self) -> String {
        let protocol = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", protocol, self.host, self.port)
    }
}

#[async_trait]
impl ConnectionProvider for ClickHouseDriver {
    fn engine(&self) -> &'static str {
        ENGINE
    }

    fn default_port(&self) -> Option<u16> {
        Some(DEFAULT_PORT)
    }

    #[tracing::instrument(skip(self, config), fields(host = config.get_string("host").as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        tracing::debug!("connecting to ClickHouse");

        let endpoint = Endpoint::from_config(config);
        let mut client = clickhouse::Client::default()
            .with_url(endpoint.server_url())
            .with_user(endpoint.username.as_str())
            .with_password(endpoint.password.as_str())
            .with_database(endpoint.database.as_str());

        let mut settings: Vec<_> = config
            .params
            .iter()
            .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
            .collect();
        settings.sort();
        for (key, value) in settings {
            tracing::trace!(setting = %key, "applying server setting");
            client = client.with_option(key.as_str(), value.as_str());
        }

        let probe: std::result::Result<u8, clickhouse::error::Error> =
            client.query("SELECT 1").fetch_one().await;
        if let Err(e) = probe {
            return Err(DbmError::Connection(format!(
                "Failed to connect to ClickHouse: {}",
                e
            )));
        }

        tracing::debug!(database = %endpoint.database, "ClickHouse connection established");
        Ok(Arc::new(ClickHouseConnection::new(client, endpoint.database)))
    }

    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        let endpoint = Endpoint::from_config(config);
        build_connection_url(
            &endpoint.host,
            endpoint.port,
            &endpoint.database,
            &endpoint.username,
            &endpoint.password,
            endpoint.use_ssl,
        )
    }
}

/// Build a ClickHouse HTTP connection URL
fn build_connection_url(
    host: &str,
    port: u16,
    database: &str,
    username: &str,
    password: &str,
    use_ssl: bool,
) -> String {
    let protocol = if use_ssl { "https" } else { "http" };

    if password.is_empty() && username == DEFAULT_USER {
        format!("{}://{}:{}/{}", protocol, host, port, database)
    } else if password.is_empty() {
        format!("{}://{}@{}:{}/{}", protocol, username, host, port, database)
    } else {
        format!(
            "{}://{}:{}@{}:{}/{}",
            protocol, username, password, host, port, database
        )
    }
}

/// Escape literal `?` characters so the client does not read them as bind
/// placeholders
pub fn escape_placeholders(sql: &str) -> String {
    sql.replace('?', "??")
}

/// ClickHouse connection wrapper implementing the Connection trait
pub struct ClickHouseConnection {
    client: clickhouse::Client,
    database: String,
    closed: AtomicBool,
}

impl ClickHouseConnection {
    pub fn new(client: clickhouse::Client, database: String) -> Self {
        Self {
            client,
            database,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DbmError::Connection("Connection is closed".to_string()));
        }
        Ok(())
    }

    /// Prepare `sql` with `params` bound to its `?` placeholders
    fn prepare(&self, sql: &str, params: &[Value]) -> Result<Query> {
        if params.is_empty() {
            return Ok(self.client.query(&escape_placeholders(sql)));
        }
        bind_params(self.client.query(sql), params)
    }
}

/// Bind each value to the next `?` placeholder of `query`
pub fn bind_params(query: Query, params: &[Value]) -> Result<Query> {
    params.iter().try_fold(query, |query, value| {
        Ok(match value {
            Value::Null => query.bind(None::<u8>),
            Value::Bool(b) => query.bind(*b),
            Value::Int8(v) => query.bind(*v),
            Value::Int16(v) => query.bind(*v),
            Value::Int32(v) => query.bind(*v),
            Value::Int64(v) => query.bind(*v),
            Value::UInt64(v) => query.bind(*v),
            Value::Float32(v) => query.bind(*v),
            Value::Float64(v) => query.bind(*v),
            Value::Decimal(s) | Value::String(s) => query.bind(s.as_str()),
            Value::Bytes(bytes) => query.bind(String::from_utf8_lossy(bytes).as_ref()),
            Value::Uuid(u) => query.bind(u.to_string()),
            Value::Date(d) => query.bind(d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => query.bind(t.format("%H:%M:%S%.f").to_string()),
            Value::DateTime(dt) => query.bind(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Value::DateTimeUtc(dt) => {
                query.bind(dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            Value::Json(json) => query.bind(json.to_string()),
            Value::Array(_) => {
                return Err(DbmError::NotSupported(
                    "array values cannot be bound as query parameters".to_string(),
                ));
            }
        })
    })
}

#[async_trait]
impl Connection for ClickHouseConnection {
    fn driver_name(&self) -> &str {
        ENGINE
    }

    fn database(&self) -> &str {
        &self.database
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_not_closed()?;
        let start = std::time::Instant::now();

        self.prepare(sql, params)?
            .execute()
            .await
            .map_err(|e| DbmError::Query(format!("Execute failed: {}", e)))?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "execute completed"
        );

        // The HTTP interface does not report affected rows
        Ok(StatementResult::command(0))
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_not_closed()?;
        let start = std::time::Instant::now();

        let mut cursor = self
            .prepare(sql, params)?
            .fetch_bytes("JSONEachRow")
            .map_err(|e| DbmError::Query(format!("Query failed: {}", e)))?;

        let mut all_bytes = Vec::new();
        while let Some(chunk) = cursor
            .next()
            .await
            .map_err(|e| DbmError::Query(format!("Failed to read query result: {}", e)))?
        {
            all_bytes.extend_from_slice(&chunk);
        }

        let mut result = parse_json_each_row(&all_bytes)?;
        result.execution_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = result.rows.len(),
            duration_ms = result.execution_time_ms,
            "query completed"
        );
        Ok(result)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("ClickHouse connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Decode a `JSONEachRow` body, one object per line.
///
/// Column names and order come from the first row. A line that is not a JSON
/// object is a decode failure.
pub fn parse_json_each_row(body: &[u8]) -> Result<QueryResult> {
    let content = String::from_utf8_lossy(body);
    let mut objects = Vec::new();
    for line in content.lines().filter(|line| !line.trim().is_empty()) {
        match serde_json::from_str::<serde_json::Value>(line)? {
            serde_json::Value::Object(object) => objects.push(object),
            other => {
                return Err(DbmError::Decode {
                    column: "<row>".to_string(),
                    expected: "JSON object",
                    found: other.to_string(),
                });
            }
        }
    }

    let column_names: Vec<String> = objects
        .first()
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();

    let columns = column_names
        .iter()
        .enumerate()
        .map(|(ordinal, name)| ColumnMeta {
            name: name.clone(),
            data_type: String::new(),
            nullable: true,
            ordinal,
        })
        .collect();

    let rows = objects
        .iter()
        .map(|object| {
            let values = column_names
                .iter()
                .map(|name| object.get(name).map(json_to_value).unwrap_or(Value::Null))
                .collect();
            Row::new(column_names.clone(), values)
        })
        .collect();

    Ok(QueryResult {
        columns,
        rows,
        ..QueryResult::empty()
    })
}

/// Convert a JSON value to a dbm-core Value.
///
/// 64-bit integers arrive quoted and therefore stay strings; the row decoders
/// parse them on demand.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt64(u)
            } else if let Some(f) = n.as_f64() {
                Value::Float64(f)
            } else {
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(_) => Value::Json(json.clone()),
    }
}

impl std::fmt::Debug for ClickHouseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHouseConnection")
            .field("database", &self.database)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
