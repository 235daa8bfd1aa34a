//! Dialect registry mapping engine identifiers to their bundles

use std::collections::BTreeMap;
use std::sync::Arc;

use dbm_core::{Connection, DbMeta, DbmError, Dialect, MetadataProvider, Result};

/// Registry of engine bundles.
///
/// Build one at startup, then share it (typically behind an `Arc`). It has no
/// interior mutability, so lookups need no locking once it is populated.
pub struct DialectRegistry {
    metas: BTreeMap<&'static str, Arc<dyn DbMeta>>,
}

impl DialectRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            metas: BTreeMap::new(),
        }
    }

    /// Create a registry with every engine compiled into this build, registered
    /// in a fixed order
    pub fn with_defaults() -> Result<Self> {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "clickhouse")]
        registry.register(Arc::new(crate::clickhouse::ClickHouseMeta::new()))?;

        Ok(registry)
    }

    /// Register an engine bundle. Registering the same engine twice is a
    /// build misconfiguration and is rejected.
    pub fn register(&mut self, meta: Arc<dyn DbMeta>) -> Result<()> {
        let engine = meta.engine();
        if self.metas.contains_key(engine) {
            tracing::error!(engine = %engine, "engine registered twice");
            return Err(DbmError::DuplicateRegistration(engine.to_string()));
        }
        tracing::info!(engine = %engine, "registering dialect");
        self.metas.insert(engine, meta);
        Ok(())
    }

    /// Get an engine bundle by identifier
    pub fn lookup(&self, engine: &str) -> Result<Arc<dyn DbMeta>> {
        match self.metas.get(engine) {
            Some(meta) => Ok(Arc::clone(meta)),
            None => {
                tracing::warn!(engine = %engine, "engine not found in registry");
                Err(DbmError::NotFound(format!("engine '{}'", engine)))
            }
        }
    }

    /// Build a dialect bound to `conn` for an engine
    pub fn get_dialect(&self, engine: &str, conn: Arc<dyn Connection>) -> Result<Box<dyn Dialect>> {
        Ok(self.lookup(engine)?.dialect(conn))
    }

    /// Build a metadata provider bound to `conn` for an engine
    pub fn get_metadata(
        &self,
        engine: &str,
        conn: Arc<dyn Connection>,
    ) -> Result<Box<dyn MetadataProvider>> {
        Ok(self.lookup(engine)?.metadata(conn))
    }

    /// Registered engine identifiers, sorted
    pub fn engines(&self) -> Vec<&'static str> {
        self.metas.keys().copied().collect()
    }

    /// Check if an engine is registered
    pub fn has(&self, engine: &str) -> bool {
        self.metas.contains_key(engine)
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("engines", &self.engines())
            .finish()
    }
}
