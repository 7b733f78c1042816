//! Core traits for engine-agnostic schema discovery.
//!
//! - [`StatementExecutor`]: runs SQL text on one open connection handle
//! - [`CatalogProvider`]: an engine's catalog definition plus its connector
//!
//! The provider is pure data plus a factory; all acquisition logic lives in
//! the driver facade so every engine shares the same composition and
//! normalization path.

use std::sync::Arc;

use async_trait::async_trait;

use crate::compose::CompositionStrategy;
use crate::config::ConnectionConfig;
use crate::definitions::{CatalogQueries, Exclusions, FieldAliases, FieldDefinition};
use crate::error::Result;

use super::value::RowSet;

/// Execute SQL text against an open connection.
///
/// A statement batch yields one [`RowSet`] per result-producing statement,
/// in statement order. Failures are reported as
/// [`ProbeError::Statement`](crate::ProbeError::Statement) when the engine
/// rejected the SQL and as
/// [`ProbeError::Connectivity`](crate::ProbeError::Connectivity) when the
/// engine could not be reached.
///
/// Implementations must be safe to call concurrently; fan-out acquisition
/// issues several statements on the same handle at once.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Run `sql` and collect every result set it produces.
    async fn execute(&self, sql: &str) -> Result<Vec<RowSet>>;

    /// Release pooled connections.
    async fn close(&self) {}
}

/// Catalog definition and connector for one database engine.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Stable engine identifier (e.g. "postgres").
    fn id(&self) -> &str;

    /// Display name for UIs.
    fn display_name(&self) -> &str;

    /// Other names a configuration may use for this engine.
    fn engine_aliases(&self) -> &[&str] {
        &[]
    }

    /// Connection fields a configuration UI should ask for.
    fn fields(&self) -> &[FieldDefinition];

    /// How schema sub-queries are issued.
    fn strategy(&self) -> CompositionStrategy;

    /// SQL for each catalog section.
    fn queries(&self) -> &CatalogQueries;

    /// Projected-name aliases for this engine revision.
    fn aliases(&self) -> &FieldAliases;

    /// System schemas and databases to skip.
    fn exclusions(&self) -> &Exclusions;

    /// Open a connection handle.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn StatementExecutor>>;
}
