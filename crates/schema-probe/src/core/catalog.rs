//! Driver catalog for explicit dependency injection.
//!
//! The [`DriverCatalog`] is the registry of engine drivers keyed by a stable
//! engine identifier. It is explicitly constructed and passed to callers
//! rather than living in a global, so tests can register mock providers.
//! Engine selection happens here, by identifier, and never by inspecting a
//! connection.
//!
//! # Example
//!
//! ```rust,ignore
//! let catalog = DriverCatalog::with_builtins();
//! let driver = catalog.require("pg")?;
//! let executor = driver.connect(&config.connection).await?;
//! let snapshot = driver.get_schema_information(executor.as_ref()).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::drivers::{Driver, MssqlCatalog, PostgresCatalog};
use crate::error::{ProbeError, Result};

use super::traits::CatalogProvider;

/// Registry of engine drivers.
#[derive(Default, Clone)]
pub struct DriverCatalog {
    drivers: HashMap<String, Driver>,
    /// Lowercased alias to engine identifier.
    aliases: HashMap<String, String>,
}

impl DriverCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with PostgreSQL and SQL Server registered.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register(PostgresCatalog::new());
        catalog.register(MssqlCatalog::new());
        catalog
    }

    /// Register a provider under its own identifier.
    ///
    /// Registering the same identifier twice replaces the earlier driver.
    pub fn register(&mut self, provider: impl CatalogProvider + 'static) {
        self.register_arc(Arc::new(provider));
    }

    /// Register a shared provider along with the aliases it declares.
    pub fn register_arc(&mut self, provider: Arc<dyn CatalogProvider>) {
        let id = provider.id().to_string();
        for alias in provider.engine_aliases() {
            self.aliases.insert(alias.to_lowercase(), id.clone());
        }
        self.drivers.insert(id, Driver::new(provider));
    }

    /// Look up a driver by identifier or alias.
    pub fn get(&self, engine: &str) -> Option<&Driver> {
        self.resolve(engine).and_then(|id| self.drivers.get(id))
    }

    /// Look up a driver, returning an error if it is not registered.
    pub fn require(&self, engine: &str) -> Result<&Driver> {
        self.get(engine)
            .ok_or_else(|| ProbeError::UnknownEngine(engine.to_string()))
    }

    /// Check if an engine is registered.
    pub fn has_engine(&self, engine: &str) -> bool {
        self.get(engine).is_some()
    }

    /// Registered engine identifiers, sorted.
    pub fn engine_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered drivers, sorted by identifier.
    pub fn drivers(&self) -> Vec<&Driver> {
        let mut drivers: Vec<&Driver> = self.drivers.values().collect();
        drivers.sort_by(|a, b| a.id().cmp(b.id()));
        drivers
    }

    /// Canonical identifier of a registered engine, given its id or alias.
    ///
    /// Matching ignores case and surrounding whitespace.
    pub fn normalize_engine(&self, engine: &str) -> Result<&str> {
        self.resolve(engine)
            .ok_or_else(|| ProbeError::UnknownEngine(engine.to_string()))
    }

    fn resolve(&self, engine: &str) -> Option<&str> {
        let trimmed = engine.trim();
        let key = trimmed.to_lowercase();
        if let Some((id, _)) = self
            .drivers
            .get_key_value(trimmed)
            .or_else(|| self.drivers.get_key_value(key.as_str()))
        {
            return Some(id.as_str());
        }
        self.aliases
            .get(&key)
            .filter(|id| self.drivers.contains_key(id.as_str()))
            .map(String::as_str)
    }
}

impl std::fmt::Debug for DriverCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverCatalog")
            .field("engines", &self.engine_ids())
            .finish()
    }
}
