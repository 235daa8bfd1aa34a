//! Connection configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{DbmError, Result};

/// Connection configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Engine identifier (e.g., "clickhouse")
    pub driver: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Host address
    #[serde(default)]
    pub host: String,
    /// Port number (0 for the engine default)
    #[serde(default)]
    pub port: u16,
    /// Database name
    #[serde(default)]
    pub database: Option<String>,
    /// Username
    #[serde(default)]
    pub username: Option<String>,
    /// Password
    #[serde(default)]
    pub password: Option<String>,
    /// Additional connection parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create a new configuration with default values
    pub fn new(driver: &str, name: &str) -> Self {
        Self {
            driver: driver.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML text
    ///
    /// ```
    /// use dbm_core::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::from_toml_str(
    ///     "driver = \"clickhouse\"\nhost = \"ch1\"\nport = 8123\n",
    /// ).unwrap();
    /// assert_eq!(config.host, "ch1");
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| DbmError::Configuration(format!("invalid connection config: {}", e)))
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        let val = value.into();
        let str_val = match val {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        self.params.insert(key.to_string(), str_val);
        self
    }

    /// Get a string parameter
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Some(val) = self.params.get(key) {
            return Some(val.clone());
        }
        match key {
            "host" => Some(self.host.clone()),
            "database" => self.database.clone(),
            "username" | "user" => self.username.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }

    /// Get a boolean parameter (`true`/`1` are truthy)
    pub fn get_flag(&self, key: &str) -> bool {
        self.params
            .get(key)
            .map(|s| s == "true" || s == "1")
            .unwrap_or(false)
    }
}
