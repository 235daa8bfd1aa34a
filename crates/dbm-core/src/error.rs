//! Error types for the dialect layer

use thiserror::Error;

/// Core error type for dialect, type mapping and introspection operations
#[derive(Error, Debug)]
pub enum DbmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Engine already registered: {0}")]
    DuplicateRegistration(String),

    #[error("Unknown {engine} data type: {name}")]
    UnknownDataType { engine: String, name: String },

    #[error("Cannot decode column '{column}': expected {expected}, found {found}")]
    Decode {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Other(String),
}

impl DbmError {
    /// Build a mapping-gap error for a native type name the engine does not know
    pub fn unknown_data_type(engine: impl Into<String>, name: impl Into<String>) -> Self {
        Self::UnknownDataType {
            engine: engine.into(),
            name: name.into(),
        }
    }

    /// Whether the failure came from the execution layer rather than this one
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Query(_))
    }
}

/// Result type alias for dialect layer operations
pub type Result<T> = std::result::Result<T, DbmError>;
