//! PostgreSQL driver.
//!
//! - [`PostgresCatalog`]: catalog definitions, issued with the fan-out strategy
//! - [`PostgresExecutor`]: pooled simple-query executor

mod catalog;
mod executor;

pub use executor::PostgresExecutor;

use std::sync::Arc;

use async_trait::async_trait;

use crate::compose::CompositionStrategy;
use crate::config::ConnectionConfig;
use crate::core::traits::{CatalogProvider, StatementExecutor};
use crate::definitions::{CatalogQueries, Exclusions, FieldAliases, FieldDefinition};
use crate::error::Result;

/// PostgreSQL catalog provider.
#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    queries: CatalogQueries,
    aliases: FieldAliases,
}

impl PostgresCatalog {
    pub const ID: &'static str = "postgres";
    pub const DEFAULT_PORT: u16 = 5432;

    pub fn new() -> Self {
        Self {
            queries: catalog::queries(),
            aliases: catalog::aliases(),
        }
    }
}

impl Default for PostgresCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogProvider for PostgresCatalog {
    fn id(&self) -> &str {
        Self::ID
    }

    fn display_name(&self) -> &str {
        "Postgres"
    }

    fn engine_aliases(&self) -> &[&str] {
        &["postgresql", "pg"]
    }

    fn fields(&self) -> &[FieldDefinition] {
        catalog::FIELDS
    }

    /// Separate statements keep the constraint joins out of the other
    /// sections' transaction context.
    fn strategy(&self) -> CompositionStrategy {
        CompositionStrategy::FanOut
    }

    fn queries(&self) -> &CatalogQueries {
        &self.queries
    }

    fn aliases(&self) -> &FieldAliases {
        &self.aliases
    }

    fn exclusions(&self) -> &Exclusions {
        &catalog::EXCLUSIONS
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StatementExecutor>> {
        Ok(Arc::new(PostgresExecutor::connect(config).await?))
    }
}
