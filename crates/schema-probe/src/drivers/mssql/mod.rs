//! Microsoft SQL Server driver.
//!
//! - [`MssqlCatalog`]: catalog definitions, issued as a single batch
//! - [`MssqlExecutor`]: bb8-pooled tiberius executor

mod catalog;
mod executor;

pub use executor::{MssqlExecutor, TiberiusConnectionManager};

use std::sync::Arc;

use async_trait::async_trait;

use crate::compose::CompositionStrategy;
use crate::config::ConnectionConfig;
use crate::core::traits::{CatalogProvider, StatementExecutor};
use crate::definitions::{CatalogQueries, Exclusions, FieldAliases, FieldDefinition};
use crate::error::Result;

/// SQL Server catalog provider.
#[derive(Debug, Clone)]
pub struct MssqlCatalog {
    queries: CatalogQueries,
    aliases: FieldAliases,
}

impl MssqlCatalog {
    pub const ID: &'static str = "mssql";
    pub const DEFAULT_PORT: u16 = 1433;

    pub fn new() -> Self {
        Self {
            queries: catalog::queries(),
            aliases: catalog::aliases(),
        }
    }
}

impl Default for MssqlCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogProvider for MssqlCatalog {
    fn id(&self) -> &str {
        Self::ID
    }

    fn display_name(&self) -> &str {
        "SQL Server"
    }

    fn engine_aliases(&self) -> &[&str] {
        &["sqlserver", "sql_server"]
    }

    fn fields(&self) -> &[FieldDefinition] {
        catalog::FIELDS
    }

    fn strategy(&self) -> CompositionStrategy {
        CompositionStrategy::Batch
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
        Ok(Arc::new(MssqlExecutor::connect(config).await?))
    }
}
