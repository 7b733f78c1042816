//! # schema-probe
//!
//! Engine-independent relational schema discovery.
//!
//! Each engine contributes catalog SQL, a field-alias table and a connector.
//! The [`Driver`] facade composes the catalog statements (one batch or a
//! fan-out of independent statements), executes them and normalizes the
//! heterogeneous rows into one canonical [`SchemaSnapshot`]:
//!
//! - **PostgreSQL** via tokio-postgres, issued as a fan-out
//! - **SQL Server** via tiberius, issued as a single batch
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_probe::{Config, DriverCatalog};
//!
//! #[tokio::main]
//! async fn main() -> schema_probe::Result<()> {
//!     let config = Config::load("probe.yaml")?;
//!     let catalog = DriverCatalog::with_builtins();
//!     let driver = catalog.require(&config.connection.engine)?;
//!
//!     let executor = driver.connect(&config.connection).await?;
//!     let snapshot = driver.get_schema_information(executor.as_ref()).await?;
//!     println!("{} tables", snapshot.tables.len());
//!     executor.close().await;
//!     Ok(())
//! }
//! ```

pub mod compose;
pub mod config;
pub mod core;
pub mod definitions;
pub mod drivers;
pub mod error;
pub mod normalize;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use compose::CompositionStrategy;
pub use config::{Config, ConnectionConfig};
pub use core::{
    CatalogProvider, Column, Constraint, Database, DriverCatalog, Index, Row, RowSet,
    SchemaSnapshot, StatementExecutor, Table, Value,
};
pub use definitions::{FieldDefinition, FieldKind};
pub use drivers::Driver;
pub use error::{ProbeError, Result};
